//! Results of Admin API calls, as consumed by the services.
//!
//! Order and shop detail convert straight into `proforma_core` records; the
//! types here cover what has no core counterpart.

use proforma_core::{Annotations, CustomerId};

/// `invoice` annotations of an order and, when it has one, its customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceState {
    /// Order annotations (`requested`, `emitted`, `invoice_data`).
    pub order: Annotations,
    /// The order's customer and their annotations.
    pub customer: Option<(CustomerId, Annotations)>,
}

impl InvoiceState {
    /// Customer id, when the order has a customer.
    #[must_use]
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer.as_ref().map(|(id, _)| *id)
    }
}

/// A user error returned by `metafieldsSet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetafieldUserError {
    /// Path to the offending input field.
    pub field: Option<Vec<String>>,
    pub message: String,
}
