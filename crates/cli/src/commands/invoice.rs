//! Invoice eligibility and request commands.
//!
//! # Usage
//!
//! ```bash
//! # Print the eligibility report of an order
//! proforma-cli eligibility --order 1001
//!
//! # Validate and request invoicing for an order
//! proforma-cli request --order 1001
//! ```
//!
//! Reads the same environment as the service (see `proforma_app::config`).

use std::sync::Arc;

use proforma_app::config::{ConfigError, ProformaConfig};
use proforma_app::services::{InvoiceError, InvoiceService};
use proforma_app::shopify::{AdminClient, AdminShopifyError};
use proforma_core::invoice::{EligibilityReport, InvoiceRequestPayload};
use proforma_core::{IdError, OrderId};
use thiserror::Error;

/// Errors that can occur during invoice operations.
#[derive(Debug, Error)]
pub enum InvoiceCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Shopify client error: {0}")]
    Client(#[from] AdminShopifyError),

    #[error("Invalid order id: {0}")]
    InvalidOrder(#[from] IdError),

    /// The eligibility report could not be fetched.
    #[error("Invoice state unavailable")]
    Unavailable,

    #[error(transparent)]
    Invoice(#[from] InvoiceError),
}

fn service() -> Result<InvoiceService, InvoiceCommandError> {
    let config = ProformaConfig::from_env()?;
    let client = AdminClient::new(&config.shopify)?;
    Ok(InvoiceService::new(Arc::new(client)))
}

/// Evaluate an order's eligibility.
pub async fn eligibility(order: &str) -> Result<EligibilityReport, InvoiceCommandError> {
    let order_id = OrderId::parse(order)?;
    let report = service()?.evaluate(order_id).await;

    if !report.fetched {
        return Err(InvoiceCommandError::Unavailable);
    }
    Ok(report)
}

/// Validate and request invoicing for an order.
pub async fn request(order: &str) -> Result<InvoiceRequestPayload, InvoiceCommandError> {
    let order_id = OrderId::parse(order)?;

    match service()?.request(order_id).await {
        Ok(payload) => Ok(payload),
        Err(InvoiceError::Validation(errors)) => {
            for error in &errors {
                tracing::warn!(field = %error.field, "{}", error.message);
            }
            Err(InvoiceError::Validation(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}
