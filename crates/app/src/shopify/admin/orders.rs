//! Order operations for the Admin API.

use proforma_core::OrderId;
use proforma_core::proforma::OrderRecord;
use tracing::instrument;

use super::{
    AdminClient, AdminShopifyError,
    queries::{
        INVOICE_METAFIELDS_FIRST, InvoiceState, LINE_ITEMS_FIRST, ProformaOrder,
        TRANSACTIONS_FIRST, invoice_state, proforma_order,
    },
};
use crate::shopify::types;

impl AdminClient {
    /// Get the `invoice` annotations of an order and of its customer.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if the order does not exist,
    /// or an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_invoice_state(
        &self,
        id: OrderId,
    ) -> Result<types::InvoiceState, AdminShopifyError> {
        let variables = invoice_state::Variables {
            id: id.gid(),
            first: INVOICE_METAFIELDS_FIRST,
        };

        let response = self.execute::<InvoiceState>(variables).await?;

        let order = response
            .order
            .ok_or_else(|| AdminShopifyError::NotFound(id.gid()))?;

        Ok(types::InvoiceState::try_from(order)?)
    }

    /// Get everything the proforma needs about an order.
    ///
    /// Returns `Ok(None)` when the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or a required field is
    /// missing from the response.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_proforma_order(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderRecord>, AdminShopifyError> {
        let variables = proforma_order::Variables {
            id: id.gid(),
            metafield_count: INVOICE_METAFIELDS_FIRST,
            line_item_count: LINE_ITEMS_FIRST,
            transaction_count: TRANSACTIONS_FIRST,
        };

        let response = self.execute::<ProformaOrder>(variables).await?;

        Ok(response.order.map(OrderRecord::try_from).transpose()?)
    }
}
