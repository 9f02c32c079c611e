//! Shop operations for the Admin API.

use proforma_core::proforma::ShopRecord;
use tracing::instrument;

use super::{
    AdminClient, AdminShopifyError,
    queries::{ShopDetails, shop_details},
};

/// Maximum `company` metafields read from the shop.
const COMPANY_METAFIELDS_FIRST: i64 = 20;

impl AdminClient {
    /// Get the merchant's name, billing address and `company` metafields.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_shop(&self) -> Result<ShopRecord, AdminShopifyError> {
        let variables = shop_details::Variables {
            first: COMPANY_METAFIELDS_FIRST,
        };

        let response = self.execute::<ShopDetails>(variables).await?;

        Ok(ShopRecord::from(response.shop))
    }
}
