//! FreshKing CLI - terminal tools for the FreshBot assistant.
//!
//! # Usage
//!
//! ```bash
//! # Chat with the assistant (uses CHAT_PROVIDER and its API key)
//! fk-cli chat
//!
//! # Print the menu, optionally one category
//! fk-cli menu
//! fk-cli menu --category bowls
//!
//! # Preview how a raw reply is formatted
//! echo "Pricing: \$12.99" | fk-cli format
//! echo "Pricing: \$12.99" | fk-cli format --html
//! ```
//!
//! # Commands
//!
//! - `chat` - Interactive conversation with the typing effect
//! - `menu` - Print the catalog
//! - `format` - Apply the chat markup transform to stdin

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fk-cli")]
#[command(author, version, about = "FreshKing CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with FreshBot in the terminal (/cart, /reset, /quit)
    Chat,
    /// Print the menu
    Menu {
        /// Only show one category (e.g. "bowls", "main meals")
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Format a raw assistant reply read from stdin
    Format {
        /// Render the result to HTML as the storefront does
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they don't interleave with the transcript
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Chat => commands::chat::run().await?,
        Commands::Menu { category } => commands::menu::print(category.as_deref())?,
        Commands::Format { html } => commands::format::run(html)?,
    }
    Ok(())
}
