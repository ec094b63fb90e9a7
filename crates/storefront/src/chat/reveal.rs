//! Typing effect for the newest assistant reply.
//!
//! [`Reveal`] is a plain state machine: each [`Reveal::tick`] reveals one
//! character and says how long to wait before the next. [`RevealScheduler`]
//! drives a reveal on a spawned task and delivers [`RevealFrame`]s over a
//! channel; it owns at most one reveal at a time.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Messages mentioning any of these get the investor call-to-action.
pub const INVESTOR_KEYWORDS: [&str; 10] = [
    "invest",
    "funding",
    "growth metrics",
    "valuation",
    "equity",
    "series a",
    "seed",
    "strategic",
    "investor",
    "fresenius",
];

/// Whether a message should be followed by the investor call-to-action.
#[must_use]
pub fn wants_investor_cta(content: &str) -> bool {
    let lower = content.to_lowercase();
    INVESTOR_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Result of one [`Reveal::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// `ch` is now visible; wait `delay` before the next tick.
    Char { ch: char, delay: Duration },
    /// Every character is visible.
    Finished { show_investor_cta: bool },
}

/// Cursor over a message's characters.
#[derive(Debug, Clone)]
pub struct Reveal {
    chars: Vec<char>,
    cursor: usize,
    base: Duration,
    show_investor_cta: bool,
}

impl Reveal {
    #[must_use]
    pub fn new(content: &str, base: Duration) -> Self {
        Self {
            chars: content.chars().collect(),
            cursor: 0,
            base,
            show_investor_cta: wants_investor_cta(content),
        }
    }

    /// Reveal the next character.
    pub fn tick(&mut self) -> Tick {
        match self.chars.get(self.cursor) {
            Some(&ch) => {
                self.cursor += 1;
                Tick::Char {
                    ch,
                    delay: self.delay_after(ch),
                }
            }
            None => Tick::Finished {
                show_investor_cta: self.show_investor_cta,
            },
        }
    }

    /// Pause after showing `ch`: long after sentence ends, shorter after
    /// clause breaks, slightly longer between words.
    #[must_use]
    pub fn delay_after(&self, ch: char) -> Duration {
        match ch {
            '.' | '!' | '?' => self.base * 8,
            ',' | ';' | ':' => self.base * 4,
            c if c.is_whitespace() => self.base * 3 / 2,
            _ => self.base,
        }
    }

    /// The whole message.
    #[must_use]
    pub fn content(&self) -> String {
        self.chars.iter().collect()
    }
}

/// What a reveal delivers to its consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RevealFrame {
    Char { ch: char },
    Done { show_investor_cta: bool },
    /// The reveal was cut short; `content` is the complete message.
    Interrupted { content: String },
}

impl RevealFrame {
    /// SSE event name for this frame.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Char { .. } => "char",
            Self::Done { .. } => "done",
            Self::Interrupted { .. } => "interrupted",
        }
    }
}

struct ActiveReveal {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Runs at most one reveal at a time.
///
/// Starting a reveal cancels the previous one, and a cancelled reveal emits
/// [`RevealFrame::Interrupted`] with the full text instead of further
/// characters. Dropping the scheduler cancels the active reveal.
pub struct RevealScheduler {
    base: Duration,
    start_delay: Duration,
    active: Option<ActiveReveal>,
}

impl RevealScheduler {
    #[must_use]
    pub const fn new(base: Duration, start_delay: Duration) -> Self {
        Self {
            base,
            start_delay,
            active: None,
        }
    }

    /// Start revealing `content`, cancelling any reveal in progress.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, content: &str) -> mpsc::UnboundedReceiver<RevealFrame> {
        self.cancel();

        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let reveal = Reveal::new(content, self.base);
        let handle = tokio::spawn(run_reveal(reveal, self.start_delay, frames_tx, cancel_rx));

        self.active = Some(ActiveReveal {
            cancel: cancel_tx,
            handle,
        });
        frames_rx
    }

    /// Cancel the active reveal, if any.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            // The task may have finished already
            let _ = active.cancel.send(());
        }
    }

    /// Whether a reveal task is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }
}

impl Drop for RevealScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_reveal(
    mut reveal: Reveal,
    start_delay: Duration,
    frames: mpsc::UnboundedSender<RevealFrame>,
    mut cancel: oneshot::Receiver<()>,
) {
    tokio::select! {
        () = tokio::time::sleep(start_delay) => {}
        _ = &mut cancel => {
            let _ = frames.send(RevealFrame::Interrupted { content: reveal.content() });
            return;
        }
    }

    loop {
        match reveal.tick() {
            Tick::Char { ch, delay } => {
                if frames.send(RevealFrame::Char { ch }).is_err() {
                    // Nobody is listening any more
                    return;
                }
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    _ = &mut cancel => {
                        let _ = frames.send(RevealFrame::Interrupted { content: reveal.content() });
                        return;
                    }
                }
            }
            Tick::Finished { show_investor_cta } => {
                let _ = frames.send(RevealFrame::Done { show_investor_cta });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(30);

    #[test]
    fn test_one_tick_per_character() {
        let mut reveal = Reveal::new("Hi there", BASE);
        let mut chars = String::new();
        while let Tick::Char { ch, .. } = reveal.tick() {
            chars.push(ch);
        }
        assert_eq!(chars, "Hi there");
        assert_eq!(
            reveal.tick(),
            Tick::Finished {
                show_investor_cta: false
            }
        );
    }

    #[test]
    fn test_plain_characters_use_base_delay() {
        let mut reveal = Reveal::new("abc", BASE);
        for _ in 0..3 {
            assert!(matches!(reveal.tick(), Tick::Char { delay, .. } if delay == BASE));
        }
    }

    #[test]
    fn test_punctuation_delays() {
        let reveal = Reveal::new("", BASE);
        assert_eq!(reveal.delay_after('.'), Duration::from_millis(240));
        assert_eq!(reveal.delay_after('?'), Duration::from_millis(240));
        assert_eq!(reveal.delay_after(','), Duration::from_millis(120));
        assert_eq!(reveal.delay_after(':'), Duration::from_millis(120));
        assert_eq!(reveal.delay_after(' '), Duration::from_millis(45));
        assert_eq!(reveal.delay_after('x'), BASE);
    }

    #[test]
    fn test_multibyte_characters_tick_once() {
        let mut reveal = Reveal::new("✨ü", BASE);
        assert!(matches!(reveal.tick(), Tick::Char { ch: '✨', .. }));
        assert!(matches!(reveal.tick(), Tick::Char { ch: 'ü', .. }));
        assert!(matches!(reveal.tick(), Tick::Finished { .. }));
    }

    #[test]
    fn test_investor_cta_detection() {
        assert!(wants_investor_cta("Our Series A round is open"));
        assert!(wants_investor_cta("Ask about EQUITY"));
        assert!(wants_investor_cta("Partnering with Fresenius"));
        assert!(!wants_investor_cta("Try the Poke Bowl"));
        let mut reveal = Reveal::new("Seed", BASE);
        while matches!(reveal.tick(), Tick::Char { .. }) {}
        assert_eq!(
            reveal.tick(),
            Tick::Finished {
                show_investor_cta: true
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_emits_every_character_then_done() {
        let mut scheduler = RevealScheduler::new(BASE, Duration::from_millis(500));
        let mut frames = scheduler.start("Hi!");

        let mut received = Vec::new();
        while let Some(frame) = frames.recv().await {
            received.push(frame);
        }

        assert_eq!(
            received,
            vec![
                RevealFrame::Char { ch: 'H' },
                RevealFrame::Char { ch: 'i' },
                RevealFrame::Char { ch: '!' },
                RevealFrame::Done {
                    show_investor_cta: false
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_delay_precedes_first_character() {
        let mut scheduler = RevealScheduler::new(BASE, Duration::from_millis(500));
        let started = tokio::time::Instant::now();
        let mut frames = scheduler.start("a");

        let first = frames.recv().await;
        assert_eq!(first, Some(RevealFrame::Char { ch: 'a' }));
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_emits_full_content_and_stops() {
        let mut scheduler = RevealScheduler::new(BASE, Duration::ZERO);
        let mut frames = scheduler.start("Hello world. How are you?");

        assert_eq!(frames.recv().await, Some(RevealFrame::Char { ch: 'H' }));
        scheduler.cancel();

        let mut rest = Vec::new();
        while let Some(frame) = frames.recv().await {
            rest.push(frame);
        }
        assert_eq!(
            rest,
            vec![RevealFrame::Interrupted {
                content: "Hello world. How are you?".to_string()
            }]
        );
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_starting_again_interrupts_previous() {
        let mut scheduler = RevealScheduler::new(BASE, Duration::from_millis(500));
        let mut first = scheduler.start("first reply");
        let mut second = scheduler.start("second");

        assert_eq!(
            first.recv().await,
            Some(RevealFrame::Interrupted {
                content: "first reply".to_string()
            })
        );
        assert_eq!(first.recv().await, None);
        assert_eq!(second.recv().await, Some(RevealFrame::Char { ch: 's' }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let mut scheduler = RevealScheduler::new(BASE, Duration::from_millis(500));
        let mut frames = scheduler.start("bye");
        drop(scheduler);

        assert_eq!(
            frames.recv().await,
            Some(RevealFrame::Interrupted {
                content: "bye".to_string()
            })
        );
        assert_eq!(frames.recv().await, None);
    }

    #[test]
    fn test_frame_serialization() {
        let json = serde_json::to_value(RevealFrame::Done {
            show_investor_cta: true,
        })
        .expect("serialize");
        assert_eq!(json["type"], "done");
        assert_eq!(json["show_investor_cta"], true);
        assert_eq!(RevealFrame::Char { ch: 'a' }.event_name(), "char");
    }
}
