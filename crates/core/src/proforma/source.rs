//! Typed records the proforma document is built from.
//!
//! These are what the commerce platform client must deliver: every field the
//! document consumes, already converted out of the platform's wire shape.
//! Conversions fail with [`ProjectionError`] naming the missing field
//! instead of carrying nulls further down.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Annotations, CustomerId, OrderId};

/// A required field was absent or malformed in platform data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// Field path as named by the platform, e.g. `order.totalPriceSet`.
    #[error("missing required field: {0}")]
    Missing(&'static str),
    /// A money amount that does not parse as a decimal.
    #[error("invalid amount in {field}: {value}")]
    InvalidAmount {
        field: &'static str,
        value: String,
    },
}

/// Parse a platform money amount (`"12.50"`).
///
/// # Errors
///
/// Returns [`ProjectionError::InvalidAmount`] when `value` is not a decimal.
pub fn parse_amount(field: &'static str, value: &str) -> Result<Decimal, ProjectionError> {
    Decimal::from_str(value.trim()).map_err(|_| ProjectionError::InvalidAmount {
        field,
        value: value.to_string(),
    })
}

/// Postal address; every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub province_code: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

/// The order's customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerRecord {
    pub id: Option<CustomerId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub default_address: Option<Address>,
    /// Live `invoice` annotations.
    pub annotations: Annotations,
}

impl CustomerRecord {
    /// Display name, else `"{first} {last}"`, else `None`.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        if let Some(name) = non_blank(self.display_name.as_deref()) {
            return Some(name.to_string());
        }
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        non_blank(Some(full.trim())).map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxLine {
    pub rate_percentage: Option<Decimal>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountAllocation {
    /// Percentage of a percentage discount; `None` for fixed amounts.
    pub percentage: Option<Decimal>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRecord {
    pub title: String,
    pub variant_title: Option<String>,
    pub sku: Option<String>,
    pub quantity: i64,
    pub original_unit_price: Decimal,
    pub discounted_unit_price: Decimal,
    pub tax_lines: Vec<TaxLine>,
    pub discount_allocations: Vec<DiscountAllocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub gateway: Option<String>,
    pub amount: Option<Decimal>,
    pub status: Option<String>,
    pub created_at: Option<String>,
}

/// Everything the proforma needs about one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub name: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub po_number: Option<String>,
    /// Order `invoice` annotations (`requested`, `invoice_data`).
    pub annotations: Annotations,
    pub customer: Option<CustomerRecord>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub line_items: Vec<LineItemRecord>,
    pub total_discounts: Decimal,
    pub subtotal: Decimal,
    pub total_shipping: Decimal,
    pub tax_lines: Vec<TaxLine>,
    pub total_tax: Decimal,
    pub total_price: Decimal,
    pub currency: String,
    pub payment_gateway_names: Vec<String>,
    pub transactions: Vec<TransactionRecord>,
}

/// Merchant company data from the shop's `company` metafields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyDetails {
    pub partita_iva: Option<String>,
    pub codice_fiscale: Option<String>,
    pub rea: Option<String>,
    pub capitale_sociale: Option<String>,
    pub pec: Option<String>,
    pub codice_sdi: Option<String>,
}

/// The merchant shop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopRecord {
    pub name: String,
    pub email: Option<String>,
    pub myshopify_domain: Option<String>,
    pub billing_address: Option<Address>,
    pub company: CompanyDetails,
}

/// The `invoice_data` snapshot stored on an order at request time.
///
/// Kept as a loose JSON object: older snapshots may nest the registered
/// office under `sede_legale` and values may not all be strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiscalSnapshot(Map<String, Value>);

impl FiscalSnapshot {
    /// Parse a snapshot from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self)
    }

    /// Whether the snapshot has the key, whatever its value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Snapshot value of `key` as a non-blank string.
    ///
    /// `None` means the key is absent; `Some(None)` means present but null
    /// or blank.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<Option<String>> {
        self.0.get(key).map(value_to_string)
    }

    /// Whether `key` holds a nested JSON object.
    #[must_use]
    pub fn has_object(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Object(_)))
    }

    /// Field of a nested object such as `sede_legale`, when there is one.
    #[must_use]
    pub fn nested(&self, object: &str, key: &str) -> Option<Option<String>> {
        match self.0.get(object) {
            Some(Value::Object(map)) => Some(map.get(key).and_then(value_to_string)),
            _ => None,
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s)).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
