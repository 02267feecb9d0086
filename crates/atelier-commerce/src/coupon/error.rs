//! Coupon validation failures.

use crate::ids::CouponCode;
use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a coupon code cannot be applied.
///
/// The `Display` text is the English fallback message; localized messages
/// come from [`CouponCatalog::error_message`](crate::coupon::CouponCatalog::error_message).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouponError {
    #[error("Coupon code {code} was not found")]
    NotFound { code: CouponCode },

    #[error("Coupon {code} is no longer active")]
    Inactive { code: CouponCode },

    #[error("Coupon {code} expired on {}", .expired_at.format("%Y-%m-%d"))]
    Expired {
        code: CouponCode,
        expired_at: DateTime<Utc>,
    },

    #[error("Coupon {code} has reached its usage limit")]
    UsageExceeded { code: CouponCode },

    #[error("Coupon {code} is priced in {found} and cannot be used with {expected}")]
    CurrencyMismatch {
        code: CouponCode,
        expected: Currency,
        found: Currency,
    },

    #[error("Coupon {code} requires a minimum purchase of {minimum}")]
    MinPurchaseNotMet { code: CouponCode, minimum: Money },
}

impl CouponError {
    pub fn kind(&self) -> CouponErrorKind {
        match self {
            CouponError::NotFound { .. } => CouponErrorKind::NotFound,
            CouponError::Inactive { .. } => CouponErrorKind::Inactive,
            CouponError::Expired { .. } => CouponErrorKind::Expired,
            CouponError::UsageExceeded { .. } => CouponErrorKind::UsageExceeded,
            CouponError::CurrencyMismatch { .. } => CouponErrorKind::CurrencyMismatch,
            CouponError::MinPurchaseNotMet { .. } => CouponErrorKind::MinPurchaseNotMet,
        }
    }

    /// The code the error is about.
    pub fn code(&self) -> &CouponCode {
        match self {
            CouponError::NotFound { code }
            | CouponError::Inactive { code }
            | CouponError::Expired { code, .. }
            | CouponError::UsageExceeded { code }
            | CouponError::CurrencyMismatch { code, .. }
            | CouponError::MinPurchaseNotMet { code, .. } => code,
        }
    }
}

/// Payload-free error category, used as the message lookup key and in the
/// serialized validation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponErrorKind {
    NotFound,
    Inactive,
    Expired,
    UsageExceeded,
    CurrencyMismatch,
    MinPurchaseNotMet,
}

impl CouponErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponErrorKind::NotFound => "NOT_FOUND",
            CouponErrorKind::Inactive => "INACTIVE",
            CouponErrorKind::Expired => "EXPIRED",
            CouponErrorKind::UsageExceeded => "USAGE_EXCEEDED",
            CouponErrorKind::CurrencyMismatch => "CURRENCY_MISMATCH",
            CouponErrorKind::MinPurchaseNotMet => "MIN_PURCHASE_NOT_MET",
        }
    }
}

impl std::fmt::Display for CouponErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
