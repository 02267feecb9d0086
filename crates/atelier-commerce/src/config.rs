//! Storefront configuration.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Money amounts are in minor units of `currency`; price filter values are
//! whole units.
//!
//! ```toml
//! currency = "USD"
//!
//! [shipping]
//! free_shipping_threshold = 50000
//! flat_fee = 1500
//!
//! [price_filter]
//! min = 0
//! max = 1000
//! step = 10
//! debounce_ms = 300
//!
//! [[price_filter.presets]]
//! label = "Under 100"
//! min = 0
//! max = 100
//!
//! [storage]
//! namespace = "atelier"
//! ```

use std::path::Path;
use std::time::Duration;

use atelier_storage::cache_key;
use serde::{Deserialize, Serialize};

use crate::checkout::ShippingPolicy;
use crate::error::CommerceError;
use crate::filter::{PricePreset, RangeBounds};
use crate::money::{Currency, Money};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub currency: Currency,

    /// Locale used for coupon messages.
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub shipping: ShippingConfig,

    #[serde(default)]
    pub price_filter: PriceFilterConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            locale: default_locale(),
            shipping: ShippingConfig::default(),
            price_filter: PriceFilterConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_locale() -> String {
    crate::catalog::DEFAULT_LOCALE.to_string()
}

/// Free-shipping rule, in minor units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingConfig {
    #[serde(default = "default_threshold")]
    pub free_shipping_threshold: i64,
    #[serde(default = "default_flat_fee")]
    pub flat_fee: i64,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: default_threshold(),
            flat_fee: default_flat_fee(),
        }
    }
}

fn default_threshold() -> i64 {
    50_000
}

fn default_flat_fee() -> i64 {
    1_500
}

/// Price filter bounds and presets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceFilterConfig {
    #[serde(default)]
    pub min: i64,
    #[serde(default = "default_filter_max")]
    pub max: i64,
    #[serde(default = "default_step")]
    pub step: i64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_presets")]
    pub presets: Vec<PricePreset>,
}

impl Default for PriceFilterConfig {
    fn default() -> Self {
        Self {
            min: 0,
            max: default_filter_max(),
            step: default_step(),
            debounce_ms: default_debounce_ms(),
            presets: default_presets(),
        }
    }
}

impl PriceFilterConfig {
    pub fn bounds(&self) -> Result<RangeBounds, CommerceError> {
        RangeBounds::new(self.min, self.max, self.step)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Find a preset by label, ignoring case.
    pub fn preset(&self, label: &str) -> Option<&PricePreset> {
        let label = label.trim();
        self.presets
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
    }
}

fn default_filter_max() -> i64 {
    1_000
}

fn default_step() -> i64 {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_presets() -> Vec<PricePreset> {
    vec![
        PricePreset::new("Under 100", 0, 100),
        PricePreset::new("100 to 250", 100, 250),
        PricePreset::new("250 to 500", 250, 500),
        PricePreset::new("500 and up", 500, 1_000),
    ]
}

/// Where state documents are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Prefix of every storage key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

fn default_namespace() -> String {
    "atelier".to_string()
}

impl StorageConfig {
    pub fn cart_key(&self) -> String {
        cache_key!(self.namespace.as_str(), "cart")
    }

    pub fn coupon_key(&self) -> String {
        cache_key!(self.namespace.as_str(), "coupon")
    }

    pub fn price_filter_key(&self) -> String {
        cache_key!(self.namespace.as_str(), "price-filter")
    }
}

impl StorefrontConfig {
    /// Parse TOML. The result is validated.
    pub fn from_toml_str(content: &str) -> Result<Self, CommerceError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON. The result is validated.
    pub fn from_json_str(content: &str) -> Result<Self, CommerceError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CommerceError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.shipping.free_shipping_threshold < 0 {
            return Err(CommerceError::InvalidConfig(
                "shipping.free_shipping_threshold must not be negative".into(),
            ));
        }
        if self.shipping.flat_fee < 0 {
            return Err(CommerceError::InvalidConfig(
                "shipping.flat_fee must not be negative".into(),
            ));
        }

        self.price_filter.bounds()?;
        for preset in &self.price_filter.presets {
            if preset.label.trim().is_empty() {
                return Err(CommerceError::InvalidConfig(
                    "price filter presets need a label".into(),
                ));
            }
            if preset.min > preset.max {
                return Err(CommerceError::InvalidConfig(format!(
                    "preset {:?} has min above max",
                    preset.label
                )));
            }
        }

        let namespace = &self.storage.namespace;
        let valid_namespace = !namespace.is_empty()
            && !namespace.starts_with('.')
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid_namespace {
            return Err(CommerceError::InvalidConfig(format!(
                "storage.namespace {:?} may only use letters, digits, '-', '_' and '.'",
                namespace
            )));
        }

        Ok(())
    }

    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy::new(
            Money::new(self.shipping.free_shipping_threshold, self.currency),
            Money::new(self.shipping.flat_fee, self.currency),
        )
    }
}
