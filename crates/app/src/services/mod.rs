//! Business logic services.
//!
//! # Services
//!
//! - `invoice` - Eligibility evaluation and invoice requests
//! - `proforma` - Proforma rendering behind signed links
//! - `render_cache` - TTL cache of rendered proforma HTML
//!
//! Services reach Shopify through the [`CommercePlatform`] trait so tests
//! can run them against an in-memory store.

pub mod invoice;
pub mod proforma;
pub mod render_cache;

pub use invoice::{InvoiceError, InvoiceService};
pub use proforma::{ProformaRenderer, RenderError};
pub use render_cache::{Clock, ManualClock, RenderCache, SystemClock};

use async_trait::async_trait;
use proforma_core::invoice::MetafieldWrite;
use proforma_core::proforma::{OrderRecord, ShopRecord};
use proforma_core::{Annotations, CustomerId, OrderId};

use crate::shopify::{AdminClient, AdminShopifyError, InvoiceState, MetafieldUserError};

/// Reads and writes the services need from the commerce platform.
#[async_trait]
pub trait CommercePlatform: Send + Sync {
    /// `invoice` annotations of an order and its customer.
    async fn invoice_state(&self, order_id: OrderId) -> Result<InvoiceState, AdminShopifyError>;

    /// `invoice` annotations of a customer.
    async fn customer_annotations(
        &self,
        customer_id: CustomerId,
    ) -> Result<Annotations, AdminShopifyError>;

    /// Write metafields atomically, returning the platform's user errors.
    async fn set_metafields(
        &self,
        metafields: Vec<MetafieldWrite>,
    ) -> Result<Vec<MetafieldUserError>, AdminShopifyError>;

    /// Everything the proforma needs about an order; `None` if it does not exist.
    async fn proforma_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<OrderRecord>, AdminShopifyError>;

    /// The merchant shop.
    async fn shop(&self) -> Result<ShopRecord, AdminShopifyError>;
}

#[async_trait]
impl CommercePlatform for AdminClient {
    async fn invoice_state(&self, order_id: OrderId) -> Result<InvoiceState, AdminShopifyError> {
        self.get_invoice_state(order_id).await
    }

    async fn customer_annotations(
        &self,
        customer_id: CustomerId,
    ) -> Result<Annotations, AdminShopifyError> {
        self.get_customer_annotations(customer_id).await
    }

    async fn set_metafields(
        &self,
        metafields: Vec<MetafieldWrite>,
    ) -> Result<Vec<MetafieldUserError>, AdminShopifyError> {
        Self::set_metafields(self, metafields).await
    }

    async fn proforma_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<OrderRecord>, AdminShopifyError> {
        self.get_proforma_order(order_id).await
    }

    async fn shop(&self) -> Result<ShopRecord, AdminShopifyError> {
        self.get_shop().await
    }
}
