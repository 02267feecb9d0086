//! CLI configuration.
//!
//! The engine's `StorefrontConfig` sits at the top level of the file; the
//! CLI adds the product and coupon catalogs it would otherwise get from the
//! storefront, plus where to keep session state.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use atelier_commerce::catalog::{Catalog, LocalizedText, ProductRef};
use atelier_commerce::config::StorefrontConfig;
use atelier_commerce::coupon::{Coupon, CouponCatalog, CouponErrorKind};
use atelier_commerce::Money;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Engine configuration.
    #[serde(flatten)]
    pub storefront: StorefrontConfig,

    /// Session state directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Products that can be put in the cart.
    #[serde(default)]
    pub products: Vec<ProductEntry>,

    /// Known coupons.
    #[serde(default)]
    pub coupons: Vec<Coupon>,

    /// Localized coupon error messages.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub coupon_messages: BTreeMap<CouponErrorKind, LocalizedText>,
}

/// A catalog product, priced in minor units of the storefront currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEntry {
    pub id: String,
    pub name: String,
    /// Defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub price: i64,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Product catalog in the storefront currency.
    pub fn catalog(&self) -> Catalog {
        let currency = self.storefront.currency;
        Catalog::new(
            self.products
                .iter()
                .map(|p| {
                    ProductRef::new(
                        p.id.as_str(),
                        p.name.as_str(),
                        p.slug.clone().unwrap_or_else(|| p.id.clone()),
                        Money::new(p.price, currency),
                    )
                })
                .collect(),
        )
    }

    /// Coupon catalog with the configured messages.
    pub fn coupon_catalog(&self) -> CouponCatalog {
        self.coupon_messages.iter().fold(
            CouponCatalog::new(self.coupons.clone()),
            |catalog, (kind, text)| catalog.with_message(*kind, text.clone()),
        )
    }

    /// Validate the whole file: engine settings plus catalogs.
    pub fn validate(&self) -> Result<()> {
        self.storefront.validate()?;

        let currency = self.storefront.currency;
        let mut ids = HashSet::new();
        for product in &self.products {
            if product.id.trim().is_empty() {
                bail!("product {:?} has an empty id", product.name);
            }
            if !ids.insert(product.id.as_str()) {
                bail!("duplicate product id {:?}", product.id);
            }
            if product.price < 0 {
                bail!("product {:?} has a negative price", product.id);
            }
        }

        let mut codes = HashSet::new();
        for coupon in &self.coupons {
            if coupon.code.is_empty() {
                bail!("coupon with an empty code");
            }
            if !codes.insert(coupon.code.as_str()) {
                bail!("duplicate coupon code {}", coupon.code);
            }
            if let Some(found) = coupon.foreign_currency(currency) {
                bail!(
                    "coupon {} uses {} but the storefront currency is {}",
                    coupon.code,
                    found,
                    currency
                );
            }
        }

        Ok(())
    }
}

/// Sample configuration written by `atelier config init`.
pub fn generate_default_config() -> String {
    r#"# Atelier storefront configuration

currency = "USD"
locale = "en"
# data_dir = ".atelier"

[shipping]
# Minor units (cents)
free_shipping_threshold = 50000
flat_fee = 1500

[price_filter]
min = 0
max = 1000
step = 10
debounce_ms = 300

[[price_filter.presets]]
label = "Under 100"
min = 0
max = 100

[[price_filter.presets]]
label = "100 to 250"
min = 100
max = 250

[[price_filter.presets]]
label = "250 to 500"
min = 250
max = 500

[[price_filter.presets]]
label = "500 and up"
min = 500
max = 1000

[storage]
namespace = "atelier"

[[products]]
id = "ring-solitaire"
name = "Solitaire Ring"
price = 14900

[[products]]
id = "studs-pearl"
name = "Pearl Studs"
price = 9900

[[products]]
id = "cuff-hammered"
name = "Hammered Cuff"
price = 32000

[[coupons]]
code = "SAVE10"
discount = { type = "percentage", value = 10.0 }
minPurchase = { amountCents = 10000, currency = "USD" }
description = { en = "10% off orders over $100", es = "10% de descuento en compras desde $100" }

[[coupons]]
code = "WELCOME"
discount = { type = "fixed", value = { amountCents = 2500, currency = "USD" } }
usageLimit = 1000

[coupon_messages.MIN_PURCHASE_NOT_MET]
en = "Spend at least {minimum} to use {code}"
es = "Compra mínima de {minimum} para usar {code}"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_commerce::Currency;

    #[test]
    fn test_default_config_parses_and_validates() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.storefront.currency, Currency::USD);
        assert_eq!(config.storefront.price_filter.presets.len(), 4);
        assert_eq!(config.catalog().len(), 3);
        assert_eq!(config.coupon_catalog().len(), 2);
        assert!(config.coupon_catalog().find("save10").is_some());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config: CliConfig = toml::from_str("").unwrap();
        config.validate().unwrap();
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_duplicate_products_rejected() {
        let config: CliConfig = toml::from_str(
            r#"
            [[products]]
            id = "ring"
            name = "Ring"
            price = 100

            [[products]]
            id = "ring"
            name = "Other Ring"
            price = 200
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_coupon_currency_must_match() {
        let config: CliConfig = toml::from_str(
            r#"
            currency = "EUR"

            [[coupons]]
            code = "TAKE5"
            discount = { type = "fixed", value = { amountCents = 500, currency = "USD" } }
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atelier.json");
        std::fs::write(
            &path,
            r#"{ "currency": "GBP", "products": [{ "id": "a", "name": "A", "price": 500 }] }"#,
        )
        .unwrap();
        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.storefront.currency, Currency::GBP);
        assert_eq!(config.catalog().products()[0].unit_price.currency, Currency::GBP);
    }
}
