//! Business logic services for the storefront.
//!
//! # Services
//!
//! - [`chat`] - Drives assistant turns against the completion provider
//! - [`checkout`] - The three-step checkout wizard and order placement

pub mod chat;
pub mod checkout;

pub use chat::{ChatMessageView, ChatService, ChatSnapshot};
pub use checkout::{CheckoutError, CheckoutWizard, ConfirmedOrder};
