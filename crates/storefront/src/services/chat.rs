//! Chat service for driving assistant conversations.
//!
//! This service handles the complete flow of:
//! 1. Starting a turn on the visitor's transcript
//! 2. Calling the completion provider without holding the session lock
//! 3. Recording the reply (or error notice) and returning its side effects
//!
//! The provider call runs on its own task, so a visitor who closes the page
//! mid-request still gets the reply recorded and the session back to idle.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use freshking_core::{Cart, ChatRole};

use tokio::sync::mpsc;

use crate::chat::{ChatError, ChatSessions, RevealFrame, TurnEffects};
use crate::filters::render_markdown;
use crate::llm::{CompletionProvider, complete_with_cancel};

/// A message as shown to the visitor.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageView {
    /// Position in the transcript.
    pub index: usize,
    pub role: ChatRole,
    pub content: String,
    /// Rendered Markdown for assistant messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Displayable state of a conversation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatSnapshot {
    pub messages: Vec<ChatMessageView>,
    pub busy: bool,
    /// Index of the newest reply the typing effect has already covered.
    pub last_revealed: Option<usize>,
}

/// Chat service for one request.
pub struct ChatService<'a> {
    provider: &'a Arc<dyn CompletionProvider>,
    sessions: &'a ChatSessions,
    timeout: Duration,
}

impl<'a> ChatService<'a> {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(
        provider: &'a Arc<dyn CompletionProvider>,
        sessions: &'a ChatSessions,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            sessions,
            timeout,
        }
    }

    /// Current state of a conversation; empty if it doesn't exist.
    pub async fn snapshot(&self, conversation_id: &str) -> ChatSnapshot {
        let Some(chat) = self.sessions.get(conversation_id).await else {
            return ChatSnapshot::default();
        };
        let chat = chat.lock().await;
        let transcript = chat.transcript();

        ChatSnapshot {
            messages: transcript
                .displayable()
                .map(|(index, message)| ChatMessageView {
                    index,
                    role: message.role,
                    content: message.content.clone(),
                    html: (message.role == ChatRole::Assistant)
                        .then(|| render_markdown(&message.content)),
                })
                .collect(),
            busy: transcript.is_busy(),
            last_revealed: transcript.last_revealed(),
        }
    }

    /// Send a user turn and wait for the reply.
    ///
    /// An add-to-cart directive in the reply is applied to `cart`; a cart
    /// that can't take the item is left unchanged. Returns `Ok(None)` for
    /// blank input. Provider failures are recorded in the transcript as
    /// notices, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Busy`] if a reply is still outstanding.
    #[instrument(skip(self, text, cart), fields(chars = text.len()))]
    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        cart: &mut Cart,
    ) -> Result<Option<TurnEffects>, ChatError> {
        let chat = self.sessions.get_or_create(conversation_id).await;

        let started = chat.lock().await.begin_turn(text)?;
        let Some(started) = started else {
            return Ok(None);
        };
        let turn = started.pending.turn;

        let provider = Arc::clone(self.provider);
        let timeout = self.timeout;
        let task_chat = Arc::clone(&chat);
        let mut task_cart = cart.clone();
        let task = tokio::spawn(async move {
            let result =
                complete_with_cancel(provider.as_ref(), &started.pending.history, started.cancel, timeout)
                    .await;
            match &result {
                Ok(reply) => info!(provider = provider.name(), chars = reply.len(), "Chat reply received"),
                Err(e) => warn!(provider = provider.name(), error = %e, "Chat completion failed"),
            }
            let effects = task_chat
                .lock()
                .await
                .complete_turn(turn, result, &mut task_cart);
            (effects, task_cart)
        });

        match task.await {
            Ok((effects, updated)) => {
                *cart = updated;
                Ok(effects)
            }
            Err(e) => {
                warn!(error = %e, "Chat completion task failed");
                chat.lock().await.abandon_turn(turn);
                Ok(None)
            }
        }
    }

    /// Cancel the outstanding reply, if any.
    ///
    /// Returns whether there was one to cancel.
    pub async fn cancel(&self, conversation_id: &str) -> bool {
        match self.sessions.get(conversation_id).await {
            Some(chat) => chat.lock().await.cancel(),
            None => false,
        }
    }

    /// Start the typing effect for the newest reply not yet revealed.
    ///
    /// Returns `None` when there is nothing new to reveal.
    pub async fn start_reveal(
        &self,
        conversation_id: &str,
    ) -> Option<mpsc::UnboundedReceiver<RevealFrame>> {
        let chat = self.sessions.get(conversation_id).await?;
        let mut chat = chat.lock().await;
        chat.start_reveal()
    }

    /// Clear the conversation back to its initial state.
    pub async fn reset(&self, conversation_id: &str) {
        if let Some(chat) = self.sessions.get(conversation_id).await {
            chat.lock().await.reset();
            info!("Conversation reset");
        }
    }
}
