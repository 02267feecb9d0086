//! Checkout arithmetic.
//!
//! Contains the free-shipping threshold calculator and the totals shown on
//! the cart and checkout pages.

pub mod shipping;
mod totals;

pub use shipping::ShippingPolicy;
pub use totals::CheckoutTotals;
