//! Error types for the completion providers.

use thiserror::Error;

/// Shown in the transcript when the provider throttles us.
pub const RATE_LIMIT_NOTICE: &str = "> **Rate Limit Reached**\n\nPlease wait a moment before sending another message. Our AI is taking a short break! 🌟";

/// Shown in the transcript for every other failure.
pub const GENERIC_NOTICE: &str =
    "> **Oops!** Something went wrong. Please try again in a moment.";

/// Errors that can occur when requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Provider returned 429.
    #[error("rate limited{}", .retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    RateLimited {
        /// `Retry-After` in seconds, when the provider sent one.
        retry_after: Option<u64>,
    },

    /// 2xx response that didn't decode or lacked the reply text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Network failure or non-2xx status.
    #[error("transport error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The caller cancelled the turn.
    #[error("cancelled")]
    Cancelled,

    /// The call exceeded the configured timeout.
    #[error("timed out after {0} seconds")]
    TimedOut(u64),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl CompletionError {
    /// Transcript text for this failure.
    #[must_use]
    pub const fn notice(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => RATE_LIMIT_NOTICE,
            _ => GENERIC_NOTICE,
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::MalformedResponse(err.to_string());
        }
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Error body shared by OpenAI and Gemini: `{"error": {"message": "..."}}`.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    pub message: String,
}
