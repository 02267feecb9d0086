//! Shopping cart module.
//!
//! Contains the cart line type, its persisted snapshot and the ledger that
//! enforces quantity invariants.

mod item;
mod ledger;

pub use item::{CartItem, CartSnapshot};
pub use ledger::CartLedger;
