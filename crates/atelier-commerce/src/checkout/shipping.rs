//! Shipping fee calculation.
//!
//! Orders at or above the free-shipping threshold ship free; everything
//! else pays a flat fee. Amounts are in the storefront currency.

use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Free-shipping threshold plus the flat fee charged below it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingPolicy {
    pub free_shipping_threshold: Money,
    pub flat_fee: Money,
}

impl ShippingPolicy {
    pub fn new(free_shipping_threshold: Money, flat_fee: Money) -> Self {
        Self {
            free_shipping_threshold,
            flat_fee,
        }
    }

    pub fn currency(&self) -> Currency {
        self.free_shipping_threshold.currency
    }

    /// True when `subtotal` reaches the threshold.
    pub fn qualifies_for_free_shipping(&self, subtotal: Money) -> bool {
        subtotal.amount_cents >= self.free_shipping_threshold.amount_cents
    }

    /// Shipping fee for `subtotal`: zero at or above the threshold, the flat
    /// fee below it.
    ///
    /// ```
    /// use atelier_commerce::checkout::ShippingPolicy;
    /// use atelier_commerce::money::{Currency, Money};
    ///
    /// let policy = ShippingPolicy::new(
    ///     Money::from_major(500, Currency::USD),
    ///     Money::from_major(15, Currency::USD),
    /// );
    /// assert!(policy.calculate_shipping(Money::from_major(500, Currency::USD)).is_zero());
    /// ```
    pub fn calculate_shipping(&self, subtotal: Money) -> Money {
        if self.qualifies_for_free_shipping(subtotal) {
            Money::zero(self.currency())
        } else {
            self.flat_fee
        }
    }

    /// How much more must be spent to ship free. Never negative.
    pub fn remaining_for_free_shipping(&self, subtotal: Money) -> Money {
        let remaining = self
            .free_shipping_threshold
            .amount_cents
            .saturating_sub(subtotal.amount_cents)
            .max(0);
        Money::new(remaining, self.currency())
    }

    /// Subtotal plus shipping.
    pub fn calculate_total(&self, subtotal: Money) -> Money {
        let shipping = self.calculate_shipping(subtotal);
        Money::new(
            subtotal.amount_cents.saturating_add(shipping.amount_cents),
            subtotal.currency,
        )
    }

    /// Progress toward the threshold as a percentage in `0..=100`.
    pub fn free_shipping_progress(&self, subtotal: Money) -> u8 {
        let threshold = self.free_shipping_threshold.amount_cents;
        if threshold <= 0 || subtotal.amount_cents >= threshold {
            return 100;
        }
        let ratio = subtotal.amount_cents.max(0) as f64 / threshold as f64;
        (ratio * 100.0).floor() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(major: i64) -> Money {
        Money::from_major(major, Currency::USD)
    }

    fn policy() -> ShippingPolicy {
        ShippingPolicy::new(usd(500), usd(15))
    }

    #[test]
    fn test_below_threshold_pays_flat_fee() {
        let subtotal = usd(149 * 2 + 99);
        assert_eq!(subtotal, usd(397));
        assert_eq!(policy().calculate_shipping(subtotal), usd(15));
        assert_eq!(policy().remaining_for_free_shipping(subtotal), usd(103));
        assert_eq!(policy().calculate_total(subtotal), usd(412));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(policy().calculate_shipping(usd(500)).is_zero());
        assert!(policy().remaining_for_free_shipping(usd(500)).is_zero());
        assert_eq!(
            policy().calculate_shipping(Money::new(49_999, Currency::USD)),
            usd(15)
        );
    }

    #[test]
    fn test_remaining_never_negative() {
        assert!(policy().remaining_for_free_shipping(usd(9_000)).is_zero());
        assert_eq!(policy().calculate_total(usd(600)), usd(600));
    }

    #[test]
    fn test_free_shipping_progress() {
        assert_eq!(policy().free_shipping_progress(usd(0)), 0);
        assert_eq!(policy().free_shipping_progress(usd(250)), 50);
        assert_eq!(policy().free_shipping_progress(usd(397)), 79);
        assert_eq!(policy().free_shipping_progress(usd(800)), 100);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fee_is_zero_iff_threshold_met(subtotal in 0i64..2_000_000) {
                let subtotal = Money::new(subtotal, Currency::USD);
                let fee = policy().calculate_shipping(subtotal);
                prop_assert_eq!(fee.is_zero(), subtotal.amount_cents >= 50_000);

                let remaining = policy().remaining_for_free_shipping(subtotal);
                prop_assert_eq!(remaining.amount_cents, (50_000 - subtotal.amount_cents).max(0));
            }
        }
    }
}
