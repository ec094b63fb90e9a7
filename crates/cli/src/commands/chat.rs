//! Interactive chat with FreshBot.
//!
//! Runs the same conversation engine as the storefront widget against the
//! configured provider. Replies are typed out character by character;
//! Ctrl+C while waiting cancels the request.

use std::io::{self, Write};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use freshking_core::{Cart, ChatRole};
use freshking_storefront::chat::{ChatSessions, RevealFrame, system_prompt};
use freshking_storefront::config::{ChatConfig, ConfigError};
use freshking_storefront::llm::{CompletionError, build_provider};
use freshking_storefront::services::{ChatService, ChatSnapshot};

/// The terminal has a single conversation.
const CONVERSATION_ID: &str = "cli";

/// Errors from the chat command.
#[derive(Debug, Error)]
pub enum ChatCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] CompletionError),

    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),
}

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Reset,
    ShowCart,
    Message(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "/quit" | "/exit" => Input::Quit,
        "/reset" => Input::Reset,
        "/cart" => Input::ShowCart,
        text => Input::Message(text),
    }
}

fn write_cart(out: &mut impl Write, cart: &Cart) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }
    for line in cart.lines() {
        writeln!(
            out,
            "  {} x {:<24} {:>8}",
            line.quantity,
            line.item.name,
            line.line_total.display()
        )?;
    }
    writeln!(out, "  Total: {}", cart.total().display())
}

/// Print assistant messages newer than `after`, except the newest, which
/// is typed out by the reveal.
fn write_unseen(out: &mut impl Write, snapshot: &ChatSnapshot, after: usize) -> io::Result<()> {
    let unseen: Vec<_> = snapshot
        .messages
        .iter()
        .filter(|m| m.index > after && m.role == ChatRole::Assistant)
        .collect();

    if let Some((_, earlier)) = unseen.split_last() {
        for message in earlier {
            writeln!(out, "FreshBot: {}\n", message.content)?;
        }
    }
    Ok(())
}

async fn type_out(service: &ChatService<'_>) -> io::Result<()> {
    let Some(mut frames) = service.start_reveal(CONVERSATION_ID).await else {
        return Ok(());
    };

    let mut out = io::stdout();
    write!(out, "FreshBot: ")?;
    out.flush()?;
    while let Some(frame) = frames.recv().await {
        match frame {
            RevealFrame::Char { ch } => {
                write!(out, "{ch}")?;
                out.flush()?;
            }
            RevealFrame::Done { show_investor_cta } => {
                writeln!(out, "\n")?;
                if show_investor_cta {
                    writeln!(out, "📈 Explore investment opportunities: /investors\n")?;
                }
            }
            RevealFrame::Interrupted { content } => {
                writeln!(out, "\rFreshBot: {content}\n")?;
            }
        }
    }
    Ok(())
}

/// Run the interactive session until `/quit` or end of input.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the provider client cannot
/// be built, or the terminal fails.
pub async fn run() -> Result<(), ChatCommandError> {
    let config = ChatConfig::from_env()?;
    let provider = build_provider(&config)?;
    let sessions = ChatSessions::new(system_prompt(), config.typing_base, config.typing_start);
    let service = ChatService::new(&provider, &sessions, config.timeout);
    let mut cart = Cart::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut seen = 0;

    writeln!(
        io::stdout(),
        "👋 Hi! I'm FreshBot. Ask me about the menu, rewards or investing. (/cart, /reset, /quit)\n"
    )?;

    loop {
        write!(io::stdout(), "> ")?;
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Reset => {
                service.reset(CONVERSATION_ID).await;
                seen = 0;
                writeln!(io::stdout(), "Conversation cleared.\n")?;
            }
            Input::ShowCart => write_cart(&mut io::stdout(), &cart)?,
            Input::Message(text) => {
                let result = {
                    let send = service.send_message(CONVERSATION_ID, text, &mut cart);
                    tokio::pin!(send);
                    loop {
                        tokio::select! {
                            result = &mut send => break result,
                            _ = tokio::signal::ctrl_c() => {
                                service.cancel(CONVERSATION_ID).await;
                            }
                        }
                    }
                };

                let effects = match result {
                    Ok(Some(effects)) => effects,
                    Ok(None) => continue,
                    Err(e) => {
                        writeln!(io::stdout(), "{e}")?;
                        continue;
                    }
                };

                let snapshot = service.snapshot(CONVERSATION_ID).await;
                write_unseen(&mut io::stdout(), &snapshot, seen)?;
                type_out(&service).await?;
                seen = snapshot.messages.last().map_or(seen, |m| m.index);

                if let Some(path) = effects.navigate_to {
                    writeln!(io::stdout(), "↪ FreshBot suggests opening {path}\n")?;
                }
            }
        }
    }

    Ok(())
}
