//! Product references.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// The slice of a catalog product the cart needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug of the product page.
    pub slug: String,
    /// Price of one unit.
    pub unit_price: Money,
}

impl ProductRef {
    /// Create a product reference.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        slug: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            unit_price,
        }
    }
}

/// A static list of products supplied at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<ProductRef>,
}

impl Catalog {
    /// Build a catalog from a product list.
    pub fn new(products: Vec<ProductRef>) -> Self {
        Self { products }
    }

    /// Look a product up by id.
    pub fn get(&self, id: &ProductId) -> Option<&ProductRef> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Look a product up by slug.
    pub fn by_slug(&self, slug: &str) -> Option<&ProductRef> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// All products, in catalog order.
    pub fn products(&self) -> &[ProductRef] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_lookup() {
        let catalog = Catalog::new(vec![
            ProductRef::new(
                "ring-1",
                "Solitaire Ring",
                "solitaire-ring",
                Money::from_major(149, Currency::USD),
            ),
            ProductRef::new(
                "chain-1",
                "Gold Chain",
                "gold-chain",
                Money::from_major(99, Currency::USD),
            ),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get(&ProductId::new("chain-1")).map(|p| p.slug.as_str()),
            Some("gold-chain")
        );
        assert!(catalog.by_slug("solitaire-ring").is_some());
        assert!(catalog.get(&ProductId::new("missing")).is_none());
    }

    #[test]
    fn test_product_json_shape() {
        let product = ProductRef::new(
            "ring-1",
            "Solitaire Ring",
            "solitaire-ring",
            Money::from_major(149, Currency::USD),
        );
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], "ring-1");
        assert_eq!(json["unitPrice"]["amountCents"], 14900);
    }
}
