//! `OpenAI` chat completions binding.

use std::sync::Arc;

use futures::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use freshking_core::Message;

use super::{CompletionError, CompletionProvider, decode_body};
use crate::config::ChatConfig;

/// `OpenAI` chat completions client.
#[derive(Clone)]
pub struct OpenAiProvider {
    inner: Arc<OpenAiProviderInner>,
}

struct OpenAiProviderInner {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Create a new client from chat configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ChatConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(OpenAiProviderInner {
                client,
                api_key: config.api_key.clone(),
                endpoint: format!("{}/chat/completions", config.base_url),
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            }),
        })
    }

    #[instrument(skip(self, history), fields(model = %self.inner.model, turns = history.len()))]
    async fn chat(&self, history: &[Message]) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: &self.inner.model,
            messages: history
                .iter()
                .map(|m| ChatCompletionMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: self.inner.temperature,
            max_tokens: self.inner.max_tokens,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .bearer_auth(self.inner.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let body: ChatCompletionResponse = decode_body(response).await?;
        extract_reply(body)
    }
}

impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn complete<'a>(
        &'a self,
        history: &'a [Message],
    ) -> BoxFuture<'a, Result<String, CompletionError>> {
        Box::pin(self.chat(history))
    }
}

/// Pull `choices[0].message.content` out of a decoded response.
fn extract_reply(body: ChatCompletionResponse) -> Result<String, CompletionError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            CompletionError::MalformedResponse("Invalid response format from OpenAI".to_string())
        })
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
