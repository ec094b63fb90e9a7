//! FreshKing Core - Shared types and static restaurant data.
//!
//! This crate provides common types used across all FreshKing components:
//! - `storefront` - Public-facing ordering site and chat assistant
//! - `cli` - Terminal tools for chatting with the assistant and previewing output
//!
//! # Architecture
//!
//! The core crate contains only types and static data - no I/O, no HTTP
//! clients, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, roles, messages and the cart
//! - [`catalog`] - The menu
//! - [`locations`] - Restaurant locations and opening hours
//! - [`investors`] - Company facts shared by the investor page and the chat prompt

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod investors;
pub mod locations;
pub mod types;

pub use catalog::{MenuCategory, MenuItem};
pub use types::*;
