//! Localized strings supplied by the catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locale used when a requested translation is missing.
pub const DEFAULT_LOCALE: &str = "en";

/// A string with one translation per locale tag (`"en"`, `"es"`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Empty text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text with a single default-locale translation.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new().with(DEFAULT_LOCALE, text)
    }

    /// Add or replace a translation.
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }

    /// Resolve for `locale`, then its language part (`es-MX` → `es`), then
    /// the default locale, then any translation at all.
    pub fn resolve(&self, locale: &str) -> Option<&str> {
        let language = locale.split(['-', '_']).next().unwrap_or(locale);
        self.0
            .get(locale)
            .or_else(|| self.0.get(language))
            .or_else(|| self.0.get(DEFAULT_LOCALE))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        let text = LocalizedText::plain("10% off")
            .with("es", "10% de descuento")
            .with("es-MX", "10% menos");

        assert_eq!(text.resolve("es-MX"), Some("10% menos"));
        assert_eq!(text.resolve("es-ES"), Some("10% de descuento"));
        assert_eq!(text.resolve("fr"), Some("10% off"));
        assert_eq!(LocalizedText::new().resolve("en"), None);
    }

    #[test]
    fn test_only_foreign_translation() {
        let text = LocalizedText::new().with("es", "Envío gratis");
        assert_eq!(text.resolve("en"), Some("Envío gratis"));
    }
}
