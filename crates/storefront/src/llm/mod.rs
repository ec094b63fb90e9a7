//! Remote completion providers for the chat assistant.
//!
//! # Architecture
//!
//! - [`CompletionProvider`] - one trait, object-safe so the state can hold an
//!   `Arc<dyn CompletionProvider>` picked at startup
//! - [`OpenAiProvider`] - `POST {base}/chat/completions`
//! - [`GeminiProvider`] - `POST {base}/models/{model}:generateContent`
//! - [`complete_with_cancel`] - races one call against a cancel signal and a timeout
//!
//! Exactly one request is made per user turn. Nothing here retries.

mod error;
mod gemini;
mod openai;

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use freshking_core::Message;

use crate::config::{ChatConfig, ChatProvider};

pub use error::{ApiErrorResponse, CompletionError, GENERIC_NOTICE, RATE_LIMIT_NOTICE};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// A remote chat-completion API.
///
/// `history` is the full ordered transcript, system message first. The
/// provider returns the assistant's reply as one plain-text block.
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Request one completion for the given history.
    fn complete<'a>(&'a self, history: &'a [Message])
    -> BoxFuture<'a, Result<String, CompletionError>>;
}

/// Build the provider selected in configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_provider(
    config: &ChatConfig,
) -> Result<Arc<dyn CompletionProvider>, CompletionError> {
    let provider: Arc<dyn CompletionProvider> = match config.provider {
        ChatProvider::OpenAi => Arc::new(OpenAiProvider::new(config)?),
        ChatProvider::Gemini => Arc::new(GeminiProvider::new(config)?),
    };
    tracing::info!(provider = provider.name(), model = %config.model, "Chat provider ready");
    Ok(provider)
}

/// Request a completion, giving up when `cancel` fires or `timeout` elapses.
///
/// A dropped cancel sender counts as a cancellation.
///
/// # Errors
///
/// Returns the provider's error, [`CompletionError::Cancelled`], or
/// [`CompletionError::TimedOut`].
pub async fn complete_with_cancel(
    provider: &dyn CompletionProvider,
    history: &[Message],
    cancel: oneshot::Receiver<()>,
    timeout: Duration,
) -> Result<String, CompletionError> {
    tokio::select! {
        result = tokio::time::timeout(timeout, provider.complete(history)) => {
            result.unwrap_or_else(|_| Err(CompletionError::TimedOut(timeout.as_secs())))
        }
        _ = cancel => Err(CompletionError::Cancelled),
    }
}

// =============================================================================
// Shared response handling
// =============================================================================

/// Classify a non-2xx response.
async fn error_for_status(response: reqwest::Response) -> CompletionError {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());
        return CompletionError::RateLimited { retry_after };
    }

    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|api_error| api_error.error.message)
            .unwrap_or(body),
        Err(e) => e.to_string(),
    };

    CompletionError::Transport {
        status: Some(status.as_u16()),
        message,
    }
}

/// Read a 2xx body and decode it, mapping decode failures to `MalformedResponse`.
async fn decode_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CompletionError> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_for_status(response).await);
    }

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| CompletionError::MalformedResponse(format!("Failed to parse response: {e}")))
}

// =============================================================================
// Test support
// =============================================================================


#[cfg(test)]
mod tests {
    use super::testing::{Scripted, ScriptedProvider};
    use super::*;

    #[tokio::test]
    async fn test_complete_with_cancel_passes_reply_through() {
        let provider = ScriptedProvider::new([Scripted::Reply("Hello!")]);
        let (_tx, rx) = oneshot::channel();
        let history = [Message::system("persona"), Message::user("hi")];

        let reply = complete_with_cancel(&provider, &history, rx, Duration::from_secs(5)).await;

        assert_eq!(reply.expect("reply"), "Hello!");
        assert_eq!(provider.last_history_len(), 2);
    }

    #[tokio::test]
    async fn test_complete_with_cancel_cancels() {
        let provider = ScriptedProvider::new([Scripted::Hang]);
        let (tx, rx) = oneshot::channel();
        let history = [Message::user("hi")];

        tx.send(()).expect("receiver alive");
        let result = complete_with_cancel(&provider, &history, rx, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(CompletionError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_with_cancel_times_out() {
        let provider = ScriptedProvider::new([Scripted::Hang]);
        let (_tx, rx) = oneshot::channel();
        let history = [Message::user("hi")];

        let result = complete_with_cancel(&provider, &history, rx, Duration::from_secs(60)).await;

        assert!(matches!(result, Err(CompletionError::TimedOut(60))));
    }

    #[test]
    fn test_provider_trait_is_object_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn CompletionProvider>();
    }
}
