//! Invoice eligibility and invoice requests.

use std::sync::Arc;

use proforma_core::invoice::{
    EligibilityReport, InvoiceRequestPayload, ValidationError, WriteError, build_request_payload,
};
use proforma_core::{Annotations, CustomerId, OrderId};
use thiserror::Error;
use tracing::instrument;

use super::CommercePlatform;
use crate::shopify::AdminShopifyError;

/// Errors from submitting an invoice request.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Reading from the platform failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] AdminShopifyError),

    /// The platform rejected the metafield write.
    #[error("write rejected: {}", .0.message)]
    Write(WriteError),

    /// The customer's fiscal data is incomplete.
    #[error("{} required field(s) missing", .0.len())]
    Validation(Vec<ValidationError>),

    /// The order has no customer to invoice.
    #[error("order has no customer")]
    NoCustomer,

    /// Invoicing was already requested; the stored snapshot stays as is.
    #[error("invoice already requested")]
    AlreadyRequested,

    /// The request snapshot could not be serialized.
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Evaluates and records invoice requests on orders.
#[derive(Clone)]
pub struct InvoiceService {
    platform: Arc<dyn CommercePlatform>,
}

impl InvoiceService {
    #[must_use]
    pub fn new(platform: Arc<dyn CommercePlatform>) -> Self {
        Self { platform }
    }

    /// Evaluate an order's invoice eligibility.
    ///
    /// A failed fetch is not an error: the report carries the conservative
    /// default with `fetched = false`, which never allows a request.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn evaluate(&self, order_id: OrderId) -> EligibilityReport {
        match self.platform.invoice_state(order_id).await {
            Ok(state) => EligibilityReport::fetched(
                &state.order,
                state.customer.as_ref().map(|(id, annotations)| (*id, annotations)),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch invoice state");
                EligibilityReport::unavailable()
            }
        }
    }

    /// Record an invoice request with the customer's current fiscal data.
    ///
    /// Without a customer only the status flags are written.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Fetch` if the customer cannot be read or the
    /// write call fails, `InvoiceError::Write` if the platform rejects it.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn submit(
        &self,
        order_id: OrderId,
        customer_id: Option<CustomerId>,
    ) -> Result<InvoiceRequestPayload, InvoiceError> {
        let customer = match customer_id {
            Some(id) => self.platform.customer_annotations(id).await?,
            None => Annotations::new(),
        };

        self.write(order_id, &customer).await
    }

    /// Validate the order's current state, then record the request.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NoCustomer`, `InvoiceError::AlreadyRequested`
    /// or `InvoiceError::Validation` when the order is not eligible,
    /// otherwise as [`Self::submit`].
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn request(&self, order_id: OrderId) -> Result<InvoiceRequestPayload, InvoiceError> {
        let state = self.platform.invoice_state(order_id).await?;

        let Some((customer_id, customer)) = &state.customer else {
            return Err(InvoiceError::NoCustomer);
        };

        let report = EligibilityReport::fetched(&state.order, Some((*customer_id, customer)));
        if report.eligibility.requested {
            tracing::info!("Invoice already requested, keeping snapshot");
            return Err(InvoiceError::AlreadyRequested);
        }
        if !report.can_request() {
            return Err(InvoiceError::Validation(ValidationError::for_missing(
                &report.eligibility.missing_fields,
            )));
        }

        self.write(order_id, customer).await
    }

    async fn write(
        &self,
        order_id: OrderId,
        customer: &Annotations,
    ) -> Result<InvoiceRequestPayload, InvoiceError> {
        let payload = build_request_payload(customer);
        let writes = payload.metafield_writes(order_id)?;

        let user_errors = self.platform.set_metafields(writes).await?;
        if let Some(first) = user_errors.into_iter().next() {
            tracing::warn!(
                field = ?first.field,
                message = %first.message,
                "Invoice request rejected"
            );
            return Err(InvoiceError::Write(WriteError::new(
                first.field.as_deref(),
                first.message,
            )));
        }

        tracing::info!("Invoice requested");
        Ok(payload)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use proforma_core::invoice::{MetafieldWrite, MissingField};
    use proforma_core::proforma::{OrderRecord, ShopRecord};

    use super::*;
    use crate::shopify::{InvoiceState, MetafieldUserError};

    #[derive(Default)]
    struct StubPlatform {
        state: Option<InvoiceState>,
        customer: Annotations,
        user_errors: Vec<MetafieldUserError>,
        writes: Mutex<Vec<Vec<MetafieldWrite>>>,
    }

    #[async_trait]
    impl CommercePlatform for StubPlatform {
        async fn invoice_state(&self, _: OrderId) -> Result<InvoiceState, AdminShopifyError> {
            self.state
                .clone()
                .ok_or_else(|| AdminShopifyError::NotFound("order".to_string()))
        }

        async fn customer_annotations(
            &self,
            _: CustomerId,
        ) -> Result<Annotations, AdminShopifyError> {
            Ok(self.customer.clone())
        }

        async fn set_metafields(
            &self,
            metafields: Vec<MetafieldWrite>,
        ) -> Result<Vec<MetafieldUserError>, AdminShopifyError> {
            self.writes.lock().unwrap().push(metafields);
            Ok(self.user_errors.clone())
        }

        async fn proforma_order(
            &self,
            _: OrderId,
        ) -> Result<Option<OrderRecord>, AdminShopifyError> {
            Ok(None)
        }

        async fn shop(&self) -> Result<ShopRecord, AdminShopifyError> {
            Ok(ShopRecord::default())
        }
    }

    fn annotations(pairs: &[(&str, &str)]) -> Annotations {
        pairs.iter().copied().collect()
    }

    fn service(platform: StubPlatform) -> (InvoiceService, Arc<StubPlatform>) {
        let platform = Arc::new(platform);
        (InvoiceService::new(platform.clone()), platform)
    }

    #[tokio::test]
    async fn test_evaluate_fetch_failure_is_conservative() {
        let (service, _) = service(StubPlatform::default());

        let report = service.evaluate(OrderId::new(1)).await;

        assert!(!report.fetched);
        assert!(!report.eligibility.requested);
        assert_eq!(report.eligibility.emitted, None);
        assert!(report.eligibility.missing_fields.is_empty());
        assert!(!report.can_request());
    }

    #[tokio::test]
    async fn test_evaluate_reports_missing_fields() {
        let (service, _) = service(StubPlatform {
            state: Some(InvoiceState {
                order: Annotations::new(),
                customer: Some((
                    CustomerId::new(5),
                    annotations(&[("customer_type", "individual")]),
                )),
            }),
            ..StubPlatform::default()
        });

        let report = service.evaluate(OrderId::new(1)).await;

        assert!(report.fetched);
        assert_eq!(
            report.eligibility.missing_fields,
            vec![MissingField::Field("codice_fiscale")]
        );
        assert!(!report.can_request());
    }

    #[tokio::test]
    async fn test_submit_writes_flags_and_snapshot() {
        let (service, platform) = service(StubPlatform {
            customer: annotations(&[("customer_type", "individual"), ("codice_fiscale", "ABC123")]),
            ..StubPlatform::default()
        });

        let payload = service
            .submit(OrderId::new(42), Some(CustomerId::new(5)))
            .await
            .unwrap();

        assert_eq!(payload.get("codice_fiscale"), Some("ABC123"));
        let writes = platform.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let batch = &writes[0];
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].owner_id, "gid://shopify/Order/42");
        assert_eq!(batch[0].key, "requested");
        assert_eq!(batch[0].value, "true");
        assert_eq!(batch[1].key, "invoice_data");
        assert_eq!(batch[1].kind, "json");
        let snapshot: serde_json::Value = serde_json::from_str(&batch[1].value).unwrap();
        assert_eq!(
            snapshot,
            serde_json::json!({
                "codice_fiscale": "ABC123",
                "customer_type": "individual",
                "emitted": "false",
                "requested": "true"
            })
        );
    }

    #[tokio::test]
    async fn test_submit_without_customer_writes_flags_only() {
        let (service, _) = service(StubPlatform::default());

        let payload = service.submit(OrderId::new(42), None).await.unwrap();

        assert_eq!(payload.iter().count(), 2);
        assert_eq!(payload.get("requested"), Some("true"));
        assert_eq!(payload.get("emitted"), Some("false"));
    }

    #[tokio::test]
    async fn test_submit_surfaces_first_user_error() {
        let (service, _) = service(StubPlatform {
            user_errors: vec![
                MetafieldUserError {
                    field: Some(vec!["metafields".to_string(), "1".to_string(), "value".to_string()]),
                    message: "Value is invalid JSON".to_string(),
                },
                MetafieldUserError {
                    field: None,
                    message: "second".to_string(),
                },
            ],
            ..StubPlatform::default()
        });

        let err = service.submit(OrderId::new(42), None).await.unwrap_err();

        match err {
            InvoiceError::Write(e) => {
                assert_eq!(e.field.as_deref(), Some("metafields.1.value"));
                assert_eq!(e.message, "Value is invalid JSON");
            }
            other => panic!("expected write error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_rejects_incomplete_customer() {
        let (service, platform) = service(StubPlatform {
            state: Some(InvoiceState {
                order: Annotations::new(),
                customer: Some((CustomerId::new(5), annotations(&[("customer_type", "company")]))),
            }),
            ..StubPlatform::default()
        });

        let err = service.request(OrderId::new(42)).await.unwrap_err();

        let InvoiceError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 6);
        assert_eq!(errors[0].field, "ragione_sociale");
        assert!(platform.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_keeps_existing_snapshot() {
        let (service, platform) = service(StubPlatform {
            state: Some(InvoiceState {
                order: annotations(&[("requested", "true")]),
                customer: Some((
                    CustomerId::new(5),
                    annotations(&[("customer_type", "individual"), ("codice_fiscale", "ABC123")]),
                )),
            }),
            ..StubPlatform::default()
        });

        assert!(matches!(
            service.request(OrderId::new(42)).await,
            Err(InvoiceError::AlreadyRequested)
        ));
        assert!(platform.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_requires_customer() {
        let (service, _) = service(StubPlatform {
            state: Some(InvoiceState::default()),
            ..StubPlatform::default()
        });

        assert!(matches!(
            service.request(OrderId::new(42)).await,
            Err(InvoiceError::NoCustomer)
        ));
    }
}
