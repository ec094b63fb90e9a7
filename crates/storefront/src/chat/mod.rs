//! Chat assistant engine.
//!
//! # Pipeline
//!
//! 1. [`Transcript::begin_turn`] appends the visitor's message
//! 2. The history goes to a [`CompletionProvider`](crate::llm::CompletionProvider)
//! 3. [`Transcript::complete_turn`] strips [`directive`]s from the reply,
//!    decorates it with [`markup`] rules and appends it
//! 4. [`reveal`] animates the newest reply character by character
//!
//! Nothing in this module talks to the network; see `services::chat` for the
//! orchestration.

pub mod directive;
pub mod markup;
pub mod prompt;
pub mod reveal;
pub mod session;
pub mod transcript;

pub use prompt::system_prompt;
pub use reveal::{Reveal, RevealFrame, RevealScheduler, Tick};
pub use session::{ChatSession, ChatSessions, StartedTurn};
pub use transcript::{PendingTurn, Transcript, TurnEffects, added_to_cart_message};

/// Errors from chat operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A completion for this conversation is still outstanding.
    #[error("a reply is still being written")]
    Busy,
}
