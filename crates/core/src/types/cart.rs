//! Shopping cart.
//!
//! A cart maps menu item ids to positive quantities. It is serialized into
//! the visitor's session as-is, so it stores ids only and resolves names and
//! prices through [`crate::catalog`] when asked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::MenuItemId;
use super::price::{CurrencyCode, Price};
use crate::catalog::{self, MenuItem};

/// Errors from cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("unknown menu item: {0}")]
    UnknownItem(MenuItemId),

    #[error("quantity {quantity} exceeds the limit of {max}")]
    QuantityTooLarge { quantity: u32, max: u32 },
}

/// A resolved cart line for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub item: &'static MenuItem,
    pub quantity: u32,
    /// Unit price times quantity.
    pub line_total: Price,
}

/// Item quantities keyed by id. Every stored quantity is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<MenuItemId, u32>,
}

impl Cart {
    /// Largest quantity a single line may hold.
    pub const MAX_QUANTITY: u32 = 99;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of an item.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownItem`] if the id is not on the menu.
    pub fn add(&mut self, id: &MenuItemId) -> Result<u32, CartError> {
        self.add_quantity(id, 1)
    }

    /// Add `quantity` units of an item. Adding zero is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is not on the menu or the resulting
    /// quantity would exceed [`Self::MAX_QUANTITY`].
    pub fn add_quantity(&mut self, id: &MenuItemId, quantity: u32) -> Result<u32, CartError> {
        let current = self.quantity(id);
        self.set_quantity(id, current.saturating_add(quantity))
    }

    /// Remove one unit. The line disappears when its quantity reaches 0.
    /// Removing an item that isn't in the cart does nothing.
    pub fn remove(&mut self, id: &MenuItemId) -> u32 {
        match self.lines.get_mut(id) {
            Some(quantity) if *quantity > 1 => {
                *quantity -= 1;
                *quantity
            }
            Some(_) => {
                self.lines.remove(id);
                0
            }
            None => 0,
        }
    }

    /// Set the quantity of an item. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is not on the menu or the quantity exceeds
    /// [`Self::MAX_QUANTITY`].
    pub fn set_quantity(&mut self, id: &MenuItemId, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            self.lines.remove(id);
            return Ok(0);
        }
        if catalog::find(id.as_str()).is_none() {
            return Err(CartError::UnknownItem(id.clone()));
        }
        if quantity > Self::MAX_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                quantity,
                max: Self::MAX_QUANTITY,
            });
        }
        self.lines.insert(id.clone(), quantity);
        Ok(quantity)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity of an item, 0 if absent.
    #[must_use]
    pub fn quantity(&self, id: &MenuItemId) -> u32 {
        self.lines.get(id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.values().sum()
    }

    /// Lines resolved against the catalog, in id order.
    ///
    /// Ids that no longer resolve (a session from an older menu) are skipped.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines
            .iter()
            .filter_map(|(id, &quantity)| {
                let item = catalog::find(id.as_str())?;
                Some(CartLine {
                    item,
                    quantity,
                    line_total: item.price() * quantity,
                })
            })
            .collect()
    }

    /// Sum of price × quantity over lines that resolve in the catalog.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines()
            .into_iter()
            .fold(Price::zero(CurrencyCode::USD), |acc, line| acc + line.line_total)
    }
}
