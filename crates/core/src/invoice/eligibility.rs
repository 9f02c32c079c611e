//! Invoice eligibility evaluation.
//!
//! Given the `invoice` annotations of an order and of its customer, works
//! out whether invoicing was already requested or emitted and which customer
//! fields still block a request.
//!
//! Evaluation is pure: it never fetches anything. Callers that fail to fetch
//! the annotations must report that failure alongside the fallback
//! [`InvoiceEligibility::conservative_default`] (see [`EligibilityReport`]);
//! the fallback has no missing fields and would otherwise look eligible.

use serde::{Serialize, Serializer};

use crate::types::{Annotations, CustomerId, keys};

use super::rules::{CustomerType, field_label};

/// A customer field blocking an invoice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingField {
    /// The customer type itself is unset, blank or unknown.
    CustomerType,
    /// A required field key that is absent or blank.
    Field(&'static str),
}

impl MissingField {
    /// Wire value reported for an unresolved customer type.
    pub const CUSTOMER_TYPE_SENTINEL: &'static str = "customer type";

    /// Wire value: the field key, or `"customer type"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CustomerType => Self::CUSTOMER_TYPE_SENTINEL,
            Self::Field(key) => key,
        }
    }

    /// Italian display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CustomerType => field_label(keys::CUSTOMER_TYPE).unwrap_or("Tipo cliente"),
            Self::Field(key) => field_label(key).unwrap_or(key),
        }
    }
}

impl Serialize for MissingField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Invoice status of an order and what blocks a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEligibility {
    /// Invoicing has been requested for the order.
    pub requested: bool,
    /// Invoice emitted; `None` when the fulfillment process never set it.
    pub emitted: Option<bool>,
    /// Customer fields still missing, in reporting order.
    pub missing_fields: Vec<MissingField>,
}

impl InvoiceEligibility {
    /// Fallback used when annotations could not be fetched.
    ///
    /// Has no missing fields; never treat it as eligible on its own.
    #[must_use]
    pub const fn conservative_default() -> Self {
        Self {
            requested: false,
            emitted: None,
            missing_fields: Vec::new(),
        }
    }
}

/// Evaluate invoice eligibility from order and customer annotations.
///
/// Once requested, or when the order has no customer, no fields are
/// reported missing.
#[must_use]
pub fn evaluate(
    order: &Annotations,
    customer: &Annotations,
    has_customer: bool,
) -> InvoiceEligibility {
    let requested = order.get(keys::REQUESTED) == Some("true");
    let emitted = order.flag(keys::EMITTED);

    let missing_fields = if requested || !has_customer {
        Vec::new()
    } else {
        missing_customer_fields(customer)
    };

    InvoiceEligibility {
        requested,
        emitted,
        missing_fields,
    }
}

/// Required customer fields that are absent or blank.
#[must_use]
pub fn missing_customer_fields(customer: &Annotations) -> Vec<MissingField> {
    let Some(customer_type) = customer
        .get(keys::CUSTOMER_TYPE)
        .and_then(CustomerType::parse)
    else {
        return vec![MissingField::CustomerType];
    };

    customer_type
        .required_fields()
        .iter()
        .copied()
        .filter(|key| customer.is_blank(key))
        .map(MissingField::Field)
        .collect()
}

/// Eligibility together with the outcome of fetching its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    #[serde(flatten)]
    pub eligibility: InvoiceEligibility,
    /// Whether the annotations were fetched; `false` means `eligibility`
    /// is the conservative default.
    pub fetched: bool,
    /// Whether the order has a customer.
    pub has_customer: bool,
    /// The order's customer, when known.
    pub customer_id: Option<CustomerId>,
}

impl EligibilityReport {
    /// Report for successfully fetched annotations.
    #[must_use]
    pub fn fetched(
        order: &Annotations,
        customer: Option<(CustomerId, &Annotations)>,
    ) -> Self {
        let empty = Annotations::new();
        let (customer_id, customer_annotations) = match customer {
            Some((id, annotations)) => (Some(id), annotations),
            None => (None, &empty),
        };

        Self {
            eligibility: evaluate(order, customer_annotations, customer_id.is_some()),
            fetched: true,
            has_customer: customer_id.is_some(),
            customer_id,
        }
    }

    /// Report for a failed fetch.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            eligibility: InvoiceEligibility::conservative_default(),
            fetched: false,
            has_customer: false,
            customer_id: None,
        }
    }

    /// Whether a new invoice request may be submitted.
    #[must_use]
    pub fn can_request(&self) -> bool {
        self.fetched
            && self.has_customer
            && !self.eligibility.requested
            && self.eligibility.missing_fields.is_empty()
    }
}
