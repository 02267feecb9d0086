//! Newtype identifiers.
//!
//! Product ids come from the external catalog and are opaque to the engine.
//! Coupon codes are case-insensitive and kept in canonical uppercase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A coupon code in canonical form (trimmed, uppercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Canonicalize a user-entered code.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when nothing but whitespace was entered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CouponCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for CouponCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("ring-solitaire");
        assert_eq!(id.as_str(), "ring-solitaire");
        assert_eq!(format!("{}", id), "ring-solitaire");
    }

    #[test]
    fn test_coupon_code_is_canonical() {
        assert_eq!(CouponCode::new("  save10 ").as_str(), "SAVE10");
        assert_eq!(CouponCode::from("Save10"), CouponCode::new("SAVE10"));
        assert!(CouponCode::new("   ").is_empty());
    }

    #[test]
    fn test_coupon_code_deserializes_canonical() {
        let code: CouponCode = serde_json::from_str("\"welcome15\"").unwrap();
        assert_eq!(code.as_str(), "WELCOME15");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"WELCOME15\"");
    }
}
