//! Core types for FreshKing.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod message;
pub mod price;
pub mod status;

pub use cart::{Cart, CartError, CartLine};
pub use email::{Email, EmailError};
pub use id::*;
pub use message::Message;
pub use price::{CurrencyCode, Price};
pub use status::*;
