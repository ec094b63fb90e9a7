//! Application state shared across handlers.

use std::sync::Arc;

use crate::chat::{self, ChatSessions};
use crate::config::StorefrontConfig;
use crate::llm::{self, CompletionError, CompletionProvider};
use crate::services::ChatService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the completion provider and live conversations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    provider: Arc<dyn CompletionProvider>,
    chat_sessions: ChatSessions,
}

impl AppState {
    /// Create application state with the provider named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CompletionError> {
        let provider = llm::build_provider(&config.chat)?;
        Ok(Self::with_provider(config, provider))
    }

    /// Create application state around an existing provider.
    #[must_use]
    pub fn with_provider(config: StorefrontConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let chat_sessions = ChatSessions::new(
            chat::system_prompt(),
            config.chat.typing_base,
            config.chat.typing_start,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                provider,
                chat_sessions,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Chat service bound to this state.
    #[must_use]
    pub fn chat(&self) -> ChatService<'_> {
        ChatService::new(
            &self.inner.provider,
            &self.inner.chat_sessions,
            self.inner.config.chat.timeout,
        )
    }
}
