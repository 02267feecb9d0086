//! Cart lines and the persisted cart document.

use crate::catalog::ProductRef;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// One line of the cart: a product and how many of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product snapshot (denormalized for display and pricing).
    pub product: ProductRef,
    /// Always at least 1 inside a ledger.
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product: ProductRef, quantity: u32) -> Self {
        Self { product, quantity }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// `unit_price × quantity`, saturating instead of overflowing.
    pub fn line_total(&self) -> Money {
        Money::new(
            self.product
                .unit_price
                .amount_cents
                .saturating_mul(i64::from(self.quantity)),
            self.product.unit_price.currency,
        )
    }
}

/// Persisted form of the cart: `{ "items": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// Restore the ledger invariants on data read back from storage.
    ///
    /// Lines with zero quantity or a foreign currency are dropped, and
    /// duplicate product ids are merged into the first occurrence.
    pub fn sanitize(self, currency: Currency) -> Vec<CartItem> {
        let mut items: Vec<CartItem> = Vec::with_capacity(self.items.len());
        for item in self.items {
            if item.quantity == 0 || item.product.unit_price.currency != currency {
                tracing::debug!(
                    product_id = %item.product.id,
                    quantity = item.quantity,
                    "dropping invalid persisted cart line"
                );
                continue;
            }
            match items.iter_mut().find(|i| i.product.id == item.product.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => items.push(item),
            }
        }
        items
    }
}
