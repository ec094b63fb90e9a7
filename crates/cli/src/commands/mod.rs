//! Subcommand implementations.

pub mod chat;
pub mod format;
pub mod menu;
