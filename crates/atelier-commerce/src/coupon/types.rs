//! Coupon definitions.

use crate::catalog::LocalizedText;
use crate::coupon::CouponError;
use crate::ids::CouponCode;
use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a coupon reduces the subtotal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DiscountKind {
    /// Percentage off the subtotal (10.0 = 10%).
    Percentage(f64),
    /// Fixed amount off, never more than the subtotal.
    Fixed(Money),
}

impl DiscountKind {
    /// Discount for `subtotal`, always within `[0, subtotal]`.
    pub fn calculate(&self, subtotal: Money) -> Money {
        let ceiling = subtotal.amount_cents.max(0);
        let raw = match self {
            DiscountKind::Percentage(percent) => subtotal.percentage(*percent).amount_cents,
            DiscountKind::Fixed(amount) => amount.amount_cents,
        };
        Money::new(raw.clamp(0, ceiling), subtotal.currency)
    }
}

/// A coupon from the static catalog. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Canonical uppercase code.
    pub code: CouponCode,
    pub discount: DiscountKind,
    /// Minimum subtotal required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_purchase: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Maximum number of redemptions (None = unlimited).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub description: LocalizedText,
}

fn default_active() -> bool {
    true
}

impl Coupon {
    /// Create a percentage-off coupon.
    pub fn percentage(code: impl AsRef<str>, percent: f64) -> Self {
        Self::with_discount(code, DiscountKind::Percentage(percent))
    }

    /// Create a fixed-amount coupon.
    pub fn fixed_amount(code: impl AsRef<str>, amount: Money) -> Self {
        Self::with_discount(code, DiscountKind::Fixed(amount))
    }

    fn with_discount(code: impl AsRef<str>, discount: DiscountKind) -> Self {
        Self {
            code: CouponCode::new(code),
            discount,
            min_purchase: None,
            expires_at: None,
            usage_limit: None,
            used_count: 0,
            is_active: true,
            description: LocalizedText::default(),
        }
    }

    /// Add a minimum purchase condition.
    pub fn with_minimum_purchase(mut self, amount: Money) -> Self {
        self.min_purchase = Some(amount);
        self
    }

    /// Add a usage limit.
    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Set expiration date.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn with_description(mut self, description: LocalizedText) -> Self {
        self.description = description;
        self
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.used_count >= limit)
            .unwrap_or(false)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at < now).unwrap_or(false)
    }

    /// First currency among the coupon's amounts that differs from `currency`.
    pub fn foreign_currency(&self, currency: Currency) -> Option<Currency> {
        let fixed = match self.discount {
            DiscountKind::Fixed(amount) => Some(amount),
            DiscountKind::Percentage(_) => None,
        };
        self.min_purchase
            .iter()
            .chain(fixed.iter())
            .map(|amount| amount.currency)
            .find(|c| *c != currency)
    }

    /// Run the validation pipeline for this coupon.
    ///
    /// Checks run in a fixed order and the first failure wins: active,
    /// expiry, usage limit, currency, minimum purchase. On success returns
    /// the discount for `subtotal`.
    pub fn check(&self, subtotal: Money, now: DateTime<Utc>) -> Result<Money, CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive {
                code: self.code.clone(),
            });
        }
        if let Some(expired_at) = self.expires_at.filter(|_| self.is_expired(now)) {
            return Err(CouponError::Expired {
                code: self.code.clone(),
                expired_at,
            });
        }
        if self.is_exhausted() {
            return Err(CouponError::UsageExceeded {
                code: self.code.clone(),
            });
        }
        if let Some(coupon_currency) = self.foreign_currency(subtotal.currency) {
            return Err(CouponError::CurrencyMismatch {
                code: self.code.clone(),
                expected: subtotal.currency,
                found: coupon_currency,
            });
        }
        if let Some(minimum) = self.min_purchase {
            if subtotal.amount_cents < minimum.amount_cents {
                return Err(CouponError::MinPurchaseNotMet {
                    code: self.code.clone(),
                    minimum,
                });
            }
        }
        Ok(self.discount.calculate(subtotal))
    }
}

/// Display label for a coupon's value: `-10%` or `-50.00 USD`.
pub fn format_coupon_discount(coupon: &Coupon) -> String {
    match coupon.discount {
        DiscountKind::Percentage(percent) if percent.fract() == 0.0 => {
            format!("-{}%", percent as i64)
        }
        DiscountKind::Percentage(percent) => format!("-{}%", percent),
        DiscountKind::Fixed(amount) => {
            format!("-{} {}", amount.display_amount(), amount.currency.code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::CouponErrorKind;
    use crate::money::Currency;
    use chrono::{Duration, TimeZone};

    fn usd(major: i64) -> Money {
        Money::from_major(major, Currency::USD)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = Coupon::percentage("SAVE10", 10.0);
        assert_eq!(coupon.check(usd(397), now()), Ok(Money::new(3970, Currency::USD)));
    }

    #[test]
    fn test_percentage_is_clamped_to_subtotal() {
        let coupon = Coupon::percentage("WOW", 150.0);
        assert_eq!(coupon.check(usd(80), now()), Ok(usd(80)));
        let negative = Coupon::percentage("ODD", -5.0);
        assert_eq!(negative.check(usd(80), now()), Ok(usd(0)));
    }

    #[test]
    fn test_fixed_discount_capped() {
        let coupon = Coupon::fixed_amount("SAVE100", usd(100));
        assert_eq!(coupon.check(usd(250), now()), Ok(usd(100)));
        assert_eq!(coupon.check(usd(50), now()), Ok(usd(50)));
    }

    #[test]
    fn test_check_precedence() {
        // Every condition fails; inactive wins.
        let mut coupon = Coupon::percentage("ALL", 10.0)
            .with_minimum_purchase(usd(1000))
            .with_usage_limit(1)
            .expires_at(now() - Duration::days(1));
        coupon.used_count = 1;
        coupon.is_active = false;
        assert_eq!(coupon.check(usd(10), now()).unwrap_err().kind(), CouponErrorKind::Inactive);

        coupon.is_active = true;
        assert_eq!(coupon.check(usd(10), now()).unwrap_err().kind(), CouponErrorKind::Expired);

        coupon.expires_at = None;
        assert_eq!(
            coupon.check(usd(10), now()).unwrap_err().kind(),
            CouponErrorKind::UsageExceeded
        );

        coupon.usage_limit = None;
        assert_eq!(
            coupon.check(usd(10), now()).unwrap_err().kind(),
            CouponErrorKind::MinPurchaseNotMet
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let coupon = Coupon::percentage("EDGE", 10.0).expires_at(now());
        assert!(coupon.check(usd(100), now()).is_ok());
        assert!(coupon.check(usd(100), now() + Duration::seconds(1)).is_err());
    }

    #[test]
    fn test_minimum_purchase_is_inclusive() {
        let coupon = Coupon::percentage("SAVE10", 10.0).with_minimum_purchase(usd(100));
        assert!(coupon.check(usd(100), now()).is_ok());
        assert!(coupon.check(Money::new(9999, Currency::USD), now()).is_err());
    }

    #[test]
    fn test_foreign_currency_is_refused() {
        let coupon = Coupon::fixed_amount("EUR50", Money::from_major(50, Currency::EUR));
        let err = coupon
            .check(Money::from_major(10_000, Currency::JPY), now())
            .unwrap_err();
        assert_eq!(err.kind(), CouponErrorKind::CurrencyMismatch);
        assert_eq!(
            err,
            CouponError::CurrencyMismatch {
                code: CouponCode::new("EUR50"),
                expected: Currency::JPY,
                found: Currency::EUR,
            }
        );

        let gated = Coupon::percentage("TEN", 10.0).with_minimum_purchase(usd(100));
        assert_eq!(gated.foreign_currency(Currency::USD), None);
        assert_eq!(gated.foreign_currency(Currency::GBP), Some(Currency::USD));
        assert!(gated.check(Money::from_major(500, Currency::GBP), now()).is_err());
        assert_eq!(Coupon::percentage("ANY", 10.0).foreign_currency(Currency::JPY), None);
    }

    #[test]
    fn test_format_coupon_discount() {
        assert_eq!(format_coupon_discount(&Coupon::percentage("A", 10.0)), "-10%");
        assert_eq!(format_coupon_discount(&Coupon::percentage("B", 12.5)), "-12.5%");
        assert_eq!(
            format_coupon_discount(&Coupon::fixed_amount("C", usd(50))),
            "-50.00 USD"
        );
    }

    #[test]
    fn test_coupon_json_shape() {
        let json = r#"{
            "code": "save10",
            "discount": { "type": "percentage", "value": 10 },
            "minPurchase": { "amountCents": 10000, "currency": "USD" },
            "isActive": true
        }"#;
        let coupon: Coupon = serde_json::from_str(json).unwrap();
        assert_eq!(coupon.code.as_str(), "SAVE10");
        assert_eq!(coupon.discount, DiscountKind::Percentage(10.0));
        assert_eq!(coupon.min_purchase, Some(usd(100)));
        assert_eq!(coupon.used_count, 0);
    }
}
