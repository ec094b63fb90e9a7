//! Google Gemini `generateContent` binding.
//!
//! Gemini has no system role: the system message goes into
//! `systemInstruction`, assistant turns use the `model` role, and adjacent
//! turns with the same role are merged into one content entry.

use std::sync::Arc;

use futures::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use freshking_core::{ChatRole, Message};

use super::{CompletionError, CompletionProvider, decode_body};
use crate::config::ChatConfig;

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiProvider {
    inner: Arc<GeminiProviderInner>,
}

struct GeminiProviderInner {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiProvider {
    /// Create a new client from chat configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ChatConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(GeminiProviderInner {
                client,
                api_key: config.api_key.clone(),
                endpoint: format!("{}/models/{}:generateContent", config.base_url, config.model),
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            }),
        })
    }

    #[instrument(skip(self, history), fields(model = %self.inner.model, turns = history.len()))]
    async fn generate(&self, history: &[Message]) -> Result<String, CompletionError> {
        let request = build_request(history, self.inner.temperature, self.inner.max_tokens);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("x-goog-api-key", self.inner.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let body: GenerateContentResponse = decode_body(response).await?;
        extract_reply(body)
    }
}

impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn complete<'a>(
        &'a self,
        history: &'a [Message],
    ) -> BoxFuture<'a, Result<String, CompletionError>> {
        Box::pin(self.generate(history))
    }
}

fn build_request(history: &[Message], temperature: f32, max_tokens: u32) -> GenerateContentRequest<'_> {
    let mut system_parts = Vec::new();
    let mut contents: Vec<Content<'_>> = Vec::new();

    for message in history {
        let role = match message.role {
            ChatRole::System => {
                system_parts.push(Part {
                    text: &message.content,
                });
                continue;
            }
            ChatRole::User => "user",
            ChatRole::Assistant => "model",
        };
        let part = Part {
            text: &message.content,
        };
        match contents.last_mut() {
            Some(last) if last.role == Some(role) => last.parts.push(part),
            _ => contents.push(Content {
                role: Some(role),
                parts: vec![part],
            }),
        }
    }

    GenerateContentRequest {
        system_instruction: (!system_parts.is_empty()).then_some(Content {
            role: None,
            parts: system_parts,
        }),
        contents,
        generation_config: GenerationConfig {
            temperature,
            max_output_tokens: max_tokens,
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_reply(body: GenerateContentResponse) -> Result<String, CompletionError> {
    let candidate = body.candidates.into_iter().next().ok_or_else(|| {
        CompletionError::MalformedResponse("No candidates in Gemini response".to_string())
    })?;

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(CompletionError::MalformedResponse(
            "Gemini candidate has no text".to_string(),
        ));
    }
    Ok(text)
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_maps_roles() {
        let history = [
            Message::system("You are FreshBot"),
            Message::user("hi"),
            Message::assistant("Hello!"),
            Message::assistant("✨ **Added to Cart!**"),
            Message::user("thanks"),
        ];

        let json = serde_json::to_value(build_request(&history, 0.7, 500)).expect("serialize");

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "You are FreshBot");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][1]["parts"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["contents"][2]["parts"][0]["text"], "thanks");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 500);
    }

    #[test]
    fn test_extract_reply_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]}}]}"#,
        )
        .expect("deserialize");
        assert_eq!(extract_reply(body).expect("reply"), "Hello there");
    }

    #[test]
    fn test_extract_reply_without_candidates() {
        let body: GenerateContentResponse = serde_json::from_str("{}").expect("deserialize");
        assert!(matches!(
            extract_reply(body),
            Err(CompletionError::MalformedResponse(_))
        ));

        let body: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
                .expect("deserialize");
        assert!(matches!(
            extract_reply(body),
            Err(CompletionError::MalformedResponse(_))
        ));
    }
}
