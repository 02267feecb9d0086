//! The static coupon catalog.

use std::collections::BTreeMap;

use crate::catalog::LocalizedText;
use crate::coupon::{Coupon, CouponError, CouponErrorKind};
use crate::ids::CouponCode;
use serde::{Deserialize, Serialize};

/// Coupons known to the storefront plus localized error messages.
///
/// Message templates may use `{code}` and `{minimum}` placeholders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CouponCatalog {
    #[serde(default)]
    coupons: Vec<Coupon>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    messages: BTreeMap<CouponErrorKind, LocalizedText>,
}

impl CouponCatalog {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons,
            messages: BTreeMap::new(),
        }
    }

    /// Register a localized message for an error kind.
    pub fn with_message(mut self, kind: CouponErrorKind, text: LocalizedText) -> Self {
        self.messages.insert(kind, text);
        self
    }

    /// Look up a coupon. Case and surrounding whitespace are ignored.
    pub fn find(&self, code: &str) -> Option<&Coupon> {
        let code = CouponCode::new(code);
        if code.is_empty() {
            return None;
        }
        self.coupons.iter().find(|c| c.code == code)
    }

    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// User-facing message for `error` in `locale`.
    pub fn error_message(&self, error: &CouponError, locale: &str) -> String {
        let template = self
            .messages
            .get(&error.kind())
            .and_then(|text| text.resolve(locale));

        let Some(template) = template else {
            return error.to_string();
        };

        let mut message = template.replace("{code}", error.code().as_str());
        if let CouponError::MinPurchaseNotMet { minimum, .. } = error {
            message = message.replace("{minimum}", &minimum.display());
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};

    fn catalog() -> CouponCatalog {
        CouponCatalog::new(vec![
            Coupon::percentage("SAVE10", 10.0),
            Coupon::fixed_amount("SAVE50", Money::from_major(50, Currency::EUR)),
        ])
        .with_message(
            CouponErrorKind::MinPurchaseNotMet,
            LocalizedText::plain("Spend at least {minimum} to use {code}")
                .with("es", "Compra mínima de {minimum} para {code}"),
        )
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = catalog();
        assert!(catalog.find("save10").is_some());
        assert!(catalog.find("  Save50 ").is_some());
        assert!(catalog.find("SAVE20").is_none());
        assert!(catalog.find("   ").is_none());
    }

    #[test]
    fn test_error_message_localized() {
        let catalog = catalog();
        let error = CouponError::MinPurchaseNotMet {
            code: CouponCode::new("SAVE10"),
            minimum: Money::from_major(100, Currency::USD),
        };
        assert_eq!(
            catalog.error_message(&error, "es-MX"),
            "Compra mínima de $100.00 para SAVE10"
        );
        assert_eq!(
            catalog.error_message(&error, "fr"),
            "Spend at least $100.00 to use SAVE10"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_display() {
        let error = CouponError::NotFound {
            code: CouponCode::new("NOPE"),
        };
        assert_eq!(
            catalog().error_message(&error, "en"),
            "Coupon code NOPE was not found"
        );
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "coupons": [
                { "code": "WELCOME15", "discount": { "type": "percentage", "value": 15 } }
            ],
            "messages": {
                "NOT_FOUND": { "en": "Unknown code {code}" }
            }
        }"#;
        let catalog: CouponCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        let error = CouponError::NotFound {
            code: CouponCode::new("x1"),
        };
        assert_eq!(catalog.error_message(&error, "en"), "Unknown code X1");
    }
}
