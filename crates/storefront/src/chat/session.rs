//! Per-visitor chat state.
//!
//! Each conversation gets a [`ChatSession`] behind an async mutex. The store
//! evicts conversations after a period of inactivity.

use std::sync::Arc;
use std::time::Duration;

use freshking_core::Cart;
use moka::future::Cache;
use tokio::sync::{Mutex, mpsc, oneshot};

use super::ChatError;
use super::reveal::{RevealFrame, RevealScheduler};
use super::transcript::{PendingTurn, Transcript, TurnEffects};
use crate::llm::CompletionError;

/// Conversations idle for this long are dropped.
const CONVERSATION_IDLE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound on live conversations.
const MAX_CONVERSATIONS: u64 = 10_000;

/// A turn handed to the caller, with the signal that cancels it.
pub struct StartedTurn {
    pub pending: PendingTurn,
    pub cancel: oneshot::Receiver<()>,
}

/// Transcript, reveal scheduler and in-flight cancel handle for one visitor.
pub struct ChatSession {
    transcript: Transcript,
    reveal: RevealScheduler,
    in_flight: Option<oneshot::Sender<()>>,
}

impl ChatSession {
    #[must_use]
    pub fn new(system_prompt: &str, typing_base: Duration, typing_start: Duration) -> Self {
        Self {
            transcript: Transcript::new(system_prompt),
            reveal: RevealScheduler::new(typing_base, typing_start),
            in_flight: None,
        }
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Start a turn. A typing effect still running is cut short.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Busy`] while a completion is outstanding.
    pub fn begin_turn(&mut self, text: &str) -> Result<Option<StartedTurn>, ChatError> {
        let Some(pending) = self.transcript.begin_turn(text)? else {
            return Ok(None);
        };
        self.reveal.cancel();

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.in_flight = Some(cancel_tx);
        Ok(Some(StartedTurn {
            pending,
            cancel: cancel_rx,
        }))
    }

    /// Record the completion for `turn`, applying any cart directive to
    /// `cart`; `None` if the turn is stale.
    pub fn complete_turn(
        &mut self,
        turn: u64,
        result: Result<String, CompletionError>,
        cart: &mut Cart,
    ) -> Option<TurnEffects> {
        let effects = self.transcript.complete_turn(turn, result, cart)?;
        self.in_flight = None;
        Some(effects)
    }

    /// Give up on `turn` without recording anything.
    pub fn abandon_turn(&mut self, turn: u64) {
        self.transcript.abandon_turn(turn);
        if !self.transcript.is_busy() {
            self.in_flight = None;
        }
    }

    /// Cancel the outstanding completion and any running typing effect.
    ///
    /// Returns whether a completion was outstanding.
    pub fn cancel(&mut self) -> bool {
        self.reveal.cancel();
        self.in_flight
            .take()
            .is_some_and(|cancel| cancel.send(()).is_ok())
    }

    /// Cancel everything and clear the transcript back to the system message.
    pub fn reset(&mut self) {
        self.cancel();
        self.transcript.reset();
    }

    /// Start the typing effect for the newest assistant reply, if it has not
    /// been revealed yet.
    pub fn start_reveal(&mut self) -> Option<mpsc::UnboundedReceiver<RevealFrame>> {
        let (_, message) = self.transcript.take_unrevealed()?;
        let content = message.content.clone();
        Some(self.reveal.start(&content))
    }
}

/// All live conversations, keyed by conversation id.
#[derive(Clone)]
pub struct ChatSessions {
    cache: Cache<String, Arc<Mutex<ChatSession>>>,
    system_prompt: Arc<str>,
    typing_base: Duration,
    typing_start: Duration,
}

impl ChatSessions {
    #[must_use]
    pub fn new(system_prompt: &str, typing_base: Duration, typing_start: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CONVERSATIONS)
            .time_to_idle(CONVERSATION_IDLE_TTL)
            .build();

        Self {
            cache,
            system_prompt: Arc::from(system_prompt),
            typing_base,
            typing_start,
        }
    }

    /// The conversation for `id`, created empty if unknown.
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<ChatSession>> {
        self.cache
            .get_with(id.to_string(), async {
                tracing::debug!(conversation_id = id, "Starting conversation");
                Arc::new(Mutex::new(ChatSession::new(
                    &self.system_prompt,
                    self.typing_base,
                    self.typing_start,
                )))
            })
            .await
    }

    /// The conversation for `id`, if it exists.
    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<ChatSession>>> {
        self.cache.get(id).await
    }
}
