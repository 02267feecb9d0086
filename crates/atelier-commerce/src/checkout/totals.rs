//! Cart and checkout totals.

use crate::checkout::ShippingPolicy;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// The figures shown in the order summary.
///
/// Shipping is computed on the subtotal before discount, so a coupon never
/// pushes an order back under the free-shipping threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    /// How much more to spend for free shipping.
    pub remaining_for_free_shipping: Money,
    pub total: Money,
}

impl CheckoutTotals {
    /// Combine a subtotal and an optional coupon discount under `policy`.
    pub fn compute(subtotal: Money, discount: Option<Money>, policy: &ShippingPolicy) -> Self {
        let currency = subtotal.currency;
        let discount = discount
            .map(|d| Money::new(d.amount_cents.clamp(0, subtotal.amount_cents.max(0)), currency))
            .unwrap_or_else(|| Money::zero(currency));
        let shipping = policy.calculate_shipping(subtotal);
        let total = subtotal
            .amount_cents
            .saturating_sub(discount.amount_cents)
            .saturating_add(shipping.amount_cents);

        Self {
            subtotal,
            discount,
            shipping,
            remaining_for_free_shipping: policy.remaining_for_free_shipping(subtotal),
            total: Money::new(total, currency),
        }
    }

    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn usd(major: i64) -> Money {
        Money::from_major(major, Currency::USD)
    }

    fn policy() -> ShippingPolicy {
        ShippingPolicy::new(usd(500), usd(15))
    }

    #[test]
    fn test_totals_without_discount() {
        let totals = CheckoutTotals::compute(usd(397), None, &policy());
        assert_eq!(totals.shipping, usd(15));
        assert_eq!(totals.remaining_for_free_shipping, usd(103));
        assert_eq!(totals.total, usd(412));
        assert!(!totals.has_discount());
    }

    #[test]
    fn test_shipping_uses_pre_discount_subtotal() {
        let totals = CheckoutTotals::compute(usd(520), Some(usd(52)), &policy());
        assert!(totals.shipping.is_zero());
        assert_eq!(totals.total, usd(468));
    }

    #[test]
    fn test_discount_is_capped() {
        let totals = CheckoutTotals::compute(usd(40), Some(usd(100)), &policy());
        assert_eq!(totals.discount, usd(40));
        assert_eq!(totals.total, usd(15));
    }
}
