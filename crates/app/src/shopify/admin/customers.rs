//! Customer operations for the Admin API.

use proforma_core::{Annotations, CustomerId};
use tracing::instrument;

use super::{
    AdminClient, AdminShopifyError,
    conversions::convert_customer_annotations,
    queries::{CustomerInvoiceMetafields, INVOICE_METAFIELDS_FIRST, customer_invoice_metafields},
};

impl AdminClient {
    /// Get a customer's `invoice` annotations.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if the customer does not exist
    /// or the response is for another customer, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get_customer_annotations(
        &self,
        id: CustomerId,
    ) -> Result<Annotations, AdminShopifyError> {
        let variables = customer_invoice_metafields::Variables {
            id: id.gid(),
            first: INVOICE_METAFIELDS_FIRST,
        };

        let response = self.execute::<CustomerInvoiceMetafields>(variables).await?;

        response
            .customer
            .and_then(|customer| convert_customer_annotations(id, customer))
            .ok_or_else(|| AdminShopifyError::NotFound(id.gid()))
    }
}
