//! Invoice request payloads and write outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Annotations, INVOICE_NAMESPACE, OrderId, keys};

use super::eligibility::MissingField;

/// Snapshot persisted on the order when invoicing is requested.
///
/// Holds the status flags plus a copy of every customer annotation at
/// request time, so later edits to the customer do not change an invoice
/// that was already requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceRequestPayload(BTreeMap<String, String>);

impl InvoiceRequestPayload {
    /// Value of a payload key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// JSON object stored in the `invoice_data` metafield.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// The two metafields written together for a request: the boolean
    /// `requested` flag and the JSON `invoice_data` snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized.
    pub fn metafield_writes(&self, order_id: OrderId) -> Result<Vec<MetafieldWrite>, serde_json::Error> {
        let owner_id = order_id.gid();
        Ok(vec![
            MetafieldWrite {
                owner_id: owner_id.clone(),
                namespace: INVOICE_NAMESPACE.to_string(),
                key: keys::REQUESTED.to_string(),
                kind: "boolean".to_string(),
                value: "true".to_string(),
            },
            MetafieldWrite {
                owner_id,
                namespace: INVOICE_NAMESPACE.to_string(),
                key: keys::INVOICE_DATA.to_string(),
                kind: "json".to_string(),
                value: self.to_json()?,
            },
        ])
    }
}

/// Build the request snapshot from the customer's current annotations.
///
/// `requested` and `emitted` are always `"true"` and `"false"`, even when
/// the customer carries keys with the same names.
#[must_use]
pub fn build_request_payload(customer: &Annotations) -> InvoiceRequestPayload {
    let mut payload: BTreeMap<String, String> = customer
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    payload.insert(keys::REQUESTED.to_string(), "true".to_string());
    payload.insert(keys::EMITTED.to_string(), "false".to_string());
    InvoiceRequestPayload(payload)
}

/// One metafield in a `metafieldsSet` mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldWrite {
    pub owner_id: String,
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// First validation error reported by the platform for a metafield write.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}", match field { Some(f) => format!("{f}: {message}"), None => message.clone() })]
pub struct WriteError {
    /// Field path, joined with `.`.
    pub field: Option<String>,
    pub message: String,
}

impl WriteError {
    /// Build from a platform user error with an optional field path.
    #[must_use]
    pub fn new(field: Option<&[String]>, message: impl Into<String>) -> Self {
        Self {
            field: field.filter(|path| !path.is_empty()).map(|path| path.join(".")),
            message: message.into(),
        }
    }
}

/// Field-level validation failure shown to the merchant.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Error for a required customer field that is absent or blank.
    #[must_use]
    pub fn missing(field: MissingField) -> Self {
        Self {
            field: field.as_str().to_string(),
            message: format!("{} mancante", field.label()),
        }
    }

    /// Errors for every missing field, in reporting order.
    #[must_use]
    pub fn for_missing(fields: &[MissingField]) -> Vec<Self> {
        fields.iter().copied().map(Self::missing).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_snapshots_customer_fields() {
        let customer: Annotations = [("customer_type", "individual"), ("codice_fiscale", "ABC123")]
            .into_iter()
            .collect();
        let payload = build_request_payload(&customer);

        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "requested": "true",
                "emitted": "false",
                "customer_type": "individual",
                "codice_fiscale": "ABC123",
            })
        );
    }

    #[test]
    fn test_status_flags_override_customer_keys() {
        let customer: Annotations = [("requested", "false"), ("emitted", "true"), ("pec", "a@pec.it")]
            .into_iter()
            .collect();
        let payload = build_request_payload(&customer);
        assert_eq!(payload.get("requested"), Some("true"));
        assert_eq!(payload.get("emitted"), Some("false"));
        assert_eq!(payload.get("pec"), Some("a@pec.it"));
    }

    #[test]
    fn test_payload_without_customer_has_flags_only() {
        let payload = build_request_payload(&Annotations::new());
        let keys: Vec<&str> = payload.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["emitted", "requested"]);
    }

    #[test]
    fn test_metafield_writes() {
        let customer: Annotations = [("customer_type", "company")].into_iter().collect();
        let writes = build_request_payload(&customer)
            .metafield_writes(OrderId::new(42))
            .unwrap();

        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].key, "requested");
        assert_eq!(writes[0].kind, "boolean");
        assert_eq!(writes[0].value, "true");
        assert_eq!(writes[1].key, "invoice_data");
        assert_eq!(writes[1].kind, "json");
        assert!(writes.iter().all(|w| w.owner_id == "gid://shopify/Order/42"));
        assert!(writes.iter().all(|w| w.namespace == "invoice"));

        let json = serde_json::to_value(&writes[0]).unwrap();
        assert_eq!(json["ownerId"], "gid://shopify/Order/42");
        assert_eq!(json["type"], "boolean");
    }

    #[test]
    fn test_write_error_joins_field_path() {
        let path = vec!["metafields".to_string(), "1".to_string(), "value".to_string()];
        let err = WriteError::new(Some(&path), "is invalid");
        assert_eq!(err.field.as_deref(), Some("metafields.1.value"));
        assert_eq!(err.to_string(), "metafields.1.value: is invalid");

        let err = WriteError::new(None, "Access denied");
        assert_eq!(err.field, None);
        assert_eq!(err.to_string(), "Access denied");
    }

    #[test]
    fn test_validation_errors_are_italian() {
        let errors = ValidationError::for_missing(&[
            MissingField::CustomerType,
            MissingField::Field("partita_iva"),
        ]);
        assert_eq!(errors[0].field, "customer type");
        assert_eq!(errors[0].message, "Tipo cliente mancante");
        assert_eq!(errors[1].field, "partita_iva");
        assert_eq!(errors[1].message, "Partita IVA mancante");
    }
}
