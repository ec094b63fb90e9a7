//! Chat transcript state machine.
//!
//! A turn goes `idle → awaiting completion → idle`. [`Transcript::begin_turn`]
//! appends the user's message and hands back the history to send;
//! [`Transcript::complete_turn`] appends whatever came back (reply or error
//! notice) and reports the side effects the reply asked for. The transcript
//! never performs I/O itself, so callers can release any lock between the
//! two calls.

use freshking_core::{Cart, ChatRole, MenuItem, Message};

use super::ChatError;
use super::directive;
use super::markup;
use crate::llm::CompletionError;

/// A turn that has been started and awaits its completion.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    /// Identifies the turn; stale completions (after a reset) are dropped.
    pub turn: u64,
    /// Full history to send, system message first.
    pub history: Vec<Message>,
}

/// Side effects requested by a completed turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnEffects {
    /// Route the visitor should be taken to.
    pub navigate_to: Option<String>,
    /// Item that was added to the visitor's cart (one unit).
    pub add_to_cart: Option<&'static MenuItem>,
}

/// Ordered chat messages for one visitor.
///
/// Index 0 always holds the system message, which is sent to the provider
/// but never displayed.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    pending: Option<u64>,
    next_turn: u64,
    last_revealed: Option<usize>,
}

impl Transcript {
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            pending: None,
            next_turn: 1,
            last_revealed: None,
        }
    }

    /// All messages including the system message.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages shown to the visitor, with their transcript indices.
    pub fn displayable(&self) -> impl Iterator<Item = (usize, &Message)> {
        self.messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role != ChatRole::System)
    }

    /// Whether a completion is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a turn with the visitor's text.
    ///
    /// Returns `Ok(None)` for empty or whitespace-only input, which changes
    /// nothing. Otherwise the user message is appended immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Busy`] while a previous turn is outstanding.
    pub fn begin_turn(&mut self, text: &str) -> Result<Option<PendingTurn>, ChatError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        if self.is_busy() {
            return Err(ChatError::Busy);
        }

        self.messages.push(Message::user(text));
        let turn = self.next_turn;
        self.next_turn += 1;
        self.pending = Some(turn);

        Ok(Some(PendingTurn {
            turn,
            history: self.messages.clone(),
        }))
    }

    /// Finish a turn with the provider's result.
    ///
    /// On success the reply's directives are stripped and resolved. An
    /// add-to-cart directive inserts one unit into `cart`; only when that
    /// insertion succeeds is an "Added to Cart" confirmation appended ahead
    /// of the decorated reply. On failure the error's notice is appended.
    /// The transcript is idle afterwards either way.
    ///
    /// Returns `None` (and changes nothing) if `turn` is not the outstanding
    /// turn, e.g. because the transcript was reset in the meantime.
    pub fn complete_turn(
        &mut self,
        turn: u64,
        result: Result<String, CompletionError>,
        cart: &mut Cart,
    ) -> Option<TurnEffects> {
        if self.pending != Some(turn) {
            tracing::debug!(turn, "Dropping completion for a stale turn");
            return None;
        }
        self.pending = None;

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                self.messages.push(Message::assistant(err.notice()));
                return Some(TurnEffects::default());
            }
        };

        let directives = directive::extract(&reply);
        let added = directives
            .add_to_cart
            .filter(|item| match cart.add(&item.item_id()) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(item_id = item.id, "Ignoring add-to-cart directive: {e}");
                    false
                }
            });
        if let Some(item) = added {
            self.messages.push(Message::assistant(added_to_cart_message(item)));
        }
        self.messages
            .push(Message::assistant(markup::transform(&directives.text)));

        Some(TurnEffects {
            navigate_to: directives.navigate,
            add_to_cart: added,
        })
    }

    /// Abandon the outstanding turn without a reply.
    ///
    /// Used when the request driving the turn disappears before the
    /// completion arrives.
    pub fn abandon_turn(&mut self, turn: u64) {
        if self.pending == Some(turn) {
            self.pending = None;
        }
    }

    /// Drop everything except the system message.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
        self.pending = None;
        self.last_revealed = None;
    }

    /// The newest message, if it is an assistant reply not yet revealed.
    ///
    /// Marks it revealed, so each reply animates at most once.
    pub fn take_unrevealed(&mut self) -> Option<(usize, &Message)> {
        let message = self.messages.last()?;
        let index = self.messages.len() - 1;
        if message.role != ChatRole::Assistant || self.last_revealed >= Some(index) {
            return None;
        }
        self.last_revealed = Some(index);
        Some((index, message))
    }

    /// Index of the last message handed out by [`Self::take_unrevealed`].
    #[must_use]
    pub const fn last_revealed(&self) -> Option<usize> {
        self.last_revealed
    }
}

/// Confirmation appended when the assistant adds an item to the cart.
#[must_use]
pub fn added_to_cart_message(item: &MenuItem) -> String {
    format!(
        "✨ **Added to Cart!**\n\nI've added `{}` to your cart. Would you like anything else?",
        item.name
    )
}

#[cfg(test)]
mod tests {
    use freshking_core::catalog;

    use super::*;
    use crate::llm::{GENERIC_NOTICE, RATE_LIMIT_NOTICE};

    fn transcript() -> Transcript {
        Transcript::new("You are FreshBot")
    }

    #[test]
    fn test_starts_with_only_system_message() {
        let t = transcript();
        assert_eq!(t.messages().len(), 1);
        assert_eq!(t.messages()[0].role, ChatRole::System);
        assert_eq!(t.displayable().count(), 0);
        assert!(!t.is_busy());
    }

    #[test]
    fn test_empty_input_is_a_no_op() {
        let mut t = transcript();
        assert!(t.begin_turn("").expect("not busy").is_none());
        assert!(t.begin_turn("  \n\t ").expect("not busy").is_none());
        assert_eq!(t.messages().len(), 1);
        assert!(!t.is_busy());
    }

    #[test]
    fn test_begin_turn_appends_user_message_immediately() {
        let mut t = transcript();
        let pending = t.begin_turn("What's vegan?").expect("ok").expect("turn");

        assert_eq!(t.messages().len(), 2);
        assert_eq!(t.messages()[1].role, ChatRole::User);
        assert_eq!(t.messages()[1].content, "What's vegan?");
        assert!(t.is_busy());
        assert_eq!(pending.history.len(), 2);
        assert_eq!(pending.history[0].role, ChatRole::System);
    }

    #[test]
    fn test_second_send_while_awaiting_is_busy() {
        let mut t = transcript();
        t.begin_turn("one").expect("ok");
        assert!(matches!(t.begin_turn("two"), Err(ChatError::Busy)));
        assert_eq!(t.messages().len(), 2);
    }

    #[test]
    fn test_successful_turn_appends_transformed_reply() {
        let mut t = transcript();
        let pending = t.begin_turn("hi").expect("ok").expect("turn");

        let effects = t
            .complete_turn(
                pending.turn,
                Ok("### Welcome\nOnly $7.99".to_string()),
                &mut Cart::new(),
            )
            .expect("current turn");

        assert_eq!(effects, TurnEffects::default());
        assert!(!t.is_busy());
        let last = t.messages().last().expect("reply");
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, "**Welcome**\nOnly **$7.99**");
    }

    #[test]
    fn test_add_to_cart_directive() {
        let mut t = transcript();
        let mut cart = Cart::new();
        let pending = t.begin_turn("add a buddha bowl").expect("ok").expect("turn");

        let effects = t
            .complete_turn(
                pending.turn,
                Ok("Done! [ADD_TO_CART:buddha-bowl]".to_string()),
                &mut cart,
            )
            .expect("current turn");

        let bowl = catalog::find("buddha-bowl").expect("exists");
        assert_eq!(effects.add_to_cart, Some(bowl));
        assert_eq!(cart.quantity(&bowl.item_id()), 1);
        let contents: Vec<_> = t.displayable().map(|(_, m)| m.content.as_str()).collect();
        assert_eq!(
            contents,
            [
                "add a buddha bowl",
                "✨ **Added to Cart!**\n\nI've added `Buddha Bowl` to your cart. Would you like anything else?",
                "Done!",
            ]
        );
        assert!(!contents.iter().any(|c| c.contains("ADD_TO_CART")));
    }

    #[test]
    fn test_full_cart_line_skips_confirmation() {
        let mut t = transcript();
        let bowl = catalog::find("buddha-bowl").expect("exists");
        let mut cart = Cart::new();
        cart.set_quantity(&bowl.item_id(), Cart::MAX_QUANTITY)
            .expect("within limit");
        let pending = t.begin_turn("one more bowl").expect("ok").expect("turn");

        let effects = t
            .complete_turn(
                pending.turn,
                Ok("Added! [ADD_TO_CART:buddha-bowl] [NAVIGATE:/cart]".to_string()),
                &mut cart,
            )
            .expect("current turn");

        assert_eq!(effects.add_to_cart, None);
        assert_eq!(effects.navigate_to.as_deref(), Some("/cart"));
        assert_eq!(cart.quantity(&bowl.item_id()), Cart::MAX_QUANTITY);
        assert!(!t.is_busy());
        let contents: Vec<_> = t.displayable().map(|(_, m)| m.content.as_str()).collect();
        assert_eq!(contents, ["one more bowl", "Added!"]);
    }

    #[test]
    fn test_navigate_directive() {
        let mut t = transcript();
        let pending = t.begin_turn("show rewards").expect("ok").expect("turn");

        let effects = t
            .complete_turn(
                pending.turn,
                Ok("Here you go [NAVIGATE:/rewards]".to_string()),
                &mut Cart::new(),
            )
            .expect("current turn");

        assert_eq!(effects.navigate_to.as_deref(), Some("/rewards"));
        assert_eq!(t.messages().last().expect("reply").content, "Here you go");
    }

    #[test]
    fn test_rate_limited_turn_appends_notice() {
        let mut t = transcript();
        let pending = t.begin_turn("hi").expect("ok").expect("turn");

        let effects = t
            .complete_turn(
                pending.turn,
                Err(CompletionError::RateLimited {
                    retry_after: Some(30),
                }),
                &mut Cart::new(),
            )
            .expect("current turn");

        assert_eq!(effects, TurnEffects::default());
        assert!(!t.is_busy());
        let last = t.messages().last().expect("notice");
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, RATE_LIMIT_NOTICE);
    }

    #[test]
    fn test_other_failures_append_generic_notice() {
        let mut t = transcript();
        let pending = t.begin_turn("hi").expect("ok").expect("turn");
        t.complete_turn(pending.turn, Err(CompletionError::Cancelled), &mut Cart::new());
        assert_eq!(t.messages().last().expect("notice").content, GENERIC_NOTICE);
    }

    #[test]
    fn test_reset_drops_stale_completion() {
        let mut t = transcript();
        let pending = t.begin_turn("hi").expect("ok").expect("turn");
        t.reset();

        assert!(t
            .complete_turn(pending.turn, Ok("late".to_string()), &mut Cart::new())
            .is_none());
        assert_eq!(t.messages().len(), 1);
        assert!(!t.is_busy());
    }

    #[test]
    fn test_abandon_turn_returns_to_idle() {
        let mut t = transcript();
        let pending = t.begin_turn("hi").expect("ok").expect("turn");
        t.abandon_turn(pending.turn);
        assert!(!t.is_busy());
        assert!(t
            .complete_turn(pending.turn, Ok("late".to_string()), &mut Cart::new())
            .is_none());
    }

    #[test]
    fn test_take_unrevealed_hands_out_each_reply_once() {
        let mut t = transcript();
        assert!(t.take_unrevealed().is_none());

        let pending = t.begin_turn("hi").expect("ok").expect("turn");
        assert!(t.take_unrevealed().is_none(), "user message never animates");

        t.complete_turn(pending.turn, Ok("Hello!".to_string()), &mut Cart::new());
        let (index, message) = t.take_unrevealed().expect("new reply");
        assert_eq!(index, 2);
        assert_eq!(message.content, "Hello!");
        assert!(t.take_unrevealed().is_none());
        assert_eq!(t.last_revealed(), Some(2));
    }
}
