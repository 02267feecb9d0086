//! Commerce error types.

use thiserror::Error;

/// Errors raised while setting up the engine.
///
/// UI-originated input never produces these: invalid quantities and slider
/// values are clamped or ignored, and coupon checks report a
/// [`CouponError`](crate::coupon::CouponError) value instead.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Configuration could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    /// Configuration parsed but is inconsistent.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl From<toml::de::Error> for CommerceError {
    fn from(e: toml::de::Error) -> Self {
        CommerceError::ConfigParse(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::ConfigParse(e.to_string())
    }
}
