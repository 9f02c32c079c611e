//! Metafield writes for the Admin API.

use proforma_core::invoice::MetafieldWrite;
use tracing::instrument;

use super::{
    AdminClient, AdminShopifyError,
    queries::{MetafieldsSet, metafields_set},
};
use crate::shopify::types::MetafieldUserError;

impl AdminClient {
    /// Write metafields in one atomic `metafieldsSet` mutation.
    ///
    /// Returns the mutation's user errors; an empty list means every
    /// metafield was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, metafields), fields(count = metafields.len()))]
    pub async fn set_metafields(
        &self,
        metafields: Vec<MetafieldWrite>,
    ) -> Result<Vec<MetafieldUserError>, AdminShopifyError> {
        let variables = metafields_set::Variables { metafields };

        let response = self.execute::<MetafieldsSet>(variables).await?;

        Ok(response
            .metafields_set
            .map(|payload| payload.user_errors)
            .unwrap_or_default()
            .into_iter()
            .map(|e| MetafieldUserError {
                field: e.field,
                message: e.message,
            })
            .collect())
    }
}
