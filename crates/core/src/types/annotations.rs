//! Metafield annotations stored on orders and customers.
//!
//! Shopify metafields are read as plain `key -> value` strings within a
//! namespace. Everything this service reads or writes lives in the
//! [`INVOICE_NAMESPACE`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metafield namespace holding invoice data on orders and customers.
pub const INVOICE_NAMESPACE: &str = "invoice";

/// Metafield keys used in the `invoice` namespace.
pub mod keys {
    /// Order flag: invoice requested (`"true"`/`"false"`).
    pub const REQUESTED: &str = "requested";
    /// Order flag: invoice emitted, set by the fulfillment process.
    pub const EMITTED: &str = "emitted";
    /// Order JSON snapshot of the customer's fiscal data at request time.
    pub const INVOICE_DATA: &str = "invoice_data";

    pub const CUSTOMER_TYPE: &str = "customer_type";
    pub const CODICE_FISCALE: &str = "codice_fiscale";
    pub const RAGIONE_SOCIALE: &str = "ragione_sociale";
    pub const PARTITA_IVA: &str = "partita_iva";
    pub const SEDE_LEGALE_VIA: &str = "sede_legale_via";
    pub const SEDE_LEGALE_CAP: &str = "sede_legale_cap";
    pub const SEDE_LEGALE_CITTA: &str = "sede_legale_citta";
    pub const SEDE_LEGALE_PROVINCIA: &str = "sede_legale_provincia";
    pub const PEC: &str = "pec";
    pub const CODICE_SDI: &str = "codice_sdi";
}

/// String annotations (metafields) of one owner within one namespace.
///
/// Keys are kept sorted so serialized snapshots are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<String, String>);

impl Annotations {
    /// Create an empty annotation set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the raw value of a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Get the trimmed value of a key, treating blank values as absent.
    #[must_use]
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Whether the key is absent or blank after trimming.
    #[must_use]
    pub fn is_blank(&self, key: &str) -> bool {
        self.get_non_blank(key).is_none()
    }

    /// Read a boolean flag: `Some(true)` for `"true"`, `Some(false)` for any
    /// other value, `None` when the key is absent.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).map(|v| v == "true")
    }

    /// Whether the key is present (even if blank).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K, V> FromIterator<(K, V)> for Annotations
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        let annotations: Annotations = [("a", "value"), ("b", "   "), ("c", "")]
            .into_iter()
            .collect();
        assert!(!annotations.is_blank("a"));
        assert!(annotations.is_blank("b"));
        assert!(annotations.is_blank("c"));
        assert!(annotations.is_blank("missing"));
        assert!(annotations.contains("c"));
    }

    #[test]
    fn test_flag() {
        let annotations: Annotations = [("yes", "true"), ("no", "false"), ("odd", "TRUE")]
            .into_iter()
            .collect();
        assert_eq!(annotations.flag("yes"), Some(true));
        assert_eq!(annotations.flag("no"), Some(false));
        assert_eq!(annotations.flag("odd"), Some(false));
        assert_eq!(annotations.flag("missing"), None);
    }

    #[test]
    fn test_get_non_blank_trims() {
        let annotations: Annotations = [("k", "  ABC  ")].into_iter().collect();
        assert_eq!(annotations.get_non_blank("k"), Some("ABC"));
        assert_eq!(annotations.get("k"), Some("  ABC  "));
    }
}
