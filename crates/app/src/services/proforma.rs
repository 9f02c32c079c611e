//! Proforma rendering behind signed print links.

use std::sync::Arc;

use askama::Template;
use proforma_core::proforma::{FiscalSnapshot, ProformaDocument, ProjectionError};
use proforma_core::{OrderId, ShopDomain, keys};
use thiserror::Error;
use tracing::instrument;

use super::{CommercePlatform, RenderCache};
use crate::filters;
use crate::shopify::AdminShopifyError;

/// Errors from rendering a proforma.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The order does not exist, or the shop is not the configured store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The link signature did not verify.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The platform could not be reached or answered with an error.
    #[error("Fetch error: {0}")]
    Fetch(AdminShopifyError),

    /// The platform response lacks a field the document needs.
    #[error("Projection error: {0}")]
    Projection(ProjectionError),
}

impl From<AdminShopifyError> for RenderError {
    fn from(err: AdminShopifyError) -> Self {
        match err {
            AdminShopifyError::NotFound(what) => Self::NotFound(what),
            AdminShopifyError::Projection(e) => Self::Projection(e),
            other => Self::Fetch(other),
        }
    }
}

/// Printable proforma invoice.
#[derive(Template)]
#[template(path = "proforma.html")]
pub struct ProformaTemplate {
    pub doc: ProformaDocument,
}

/// Renders proforma invoices for the configured store, with caching.
#[derive(Clone)]
pub struct ProformaRenderer {
    platform: Arc<dyn CommercePlatform>,
    store: ShopDomain,
    cache: Arc<RenderCache>,
}

impl ProformaRenderer {
    #[must_use]
    pub fn new(
        platform: Arc<dyn CommercePlatform>,
        store: ShopDomain,
        cache: Arc<RenderCache>,
    ) -> Self {
        Self {
            platform,
            store,
            cache,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Render the proforma of an order as HTML.
    ///
    /// A cached document younger than the TTL is returned as is, without
    /// reading from the platform.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::NotFound` for an unknown order or a shop other
    /// than the configured store, otherwise fetch, projection or template
    /// errors.
    #[instrument(skip(self), fields(order_id = %order_id, shop = %shop))]
    pub async fn render(&self, order_id: OrderId, shop: &ShopDomain) -> Result<String, RenderError> {
        if shop != &self.store {
            return Err(RenderError::NotFound(format!("shop {shop}")));
        }

        let key = RenderCache::key(order_id, shop);
        if let Some(html) = self.cache.get(&key) {
            tracing::debug!(cache_key = %key, "Proforma cache hit");
            return Ok(html);
        }
        tracing::debug!(cache_key = %key, "Proforma cache miss");

        let (order, shop_record) = futures::future::try_join(
            self.platform.proforma_order(order_id),
            self.platform.shop(),
        )
        .await?;
        let order = order.ok_or_else(|| RenderError::NotFound(order_id.gid()))?;

        let snapshot = order
            .annotations
            .get_non_blank(keys::INVOICE_DATA)
            .and_then(|json| match FiscalSnapshot::parse(json) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed invoice_data snapshot");
                    None
                }
            });

        let doc = ProformaDocument::build(&order, &shop_record, snapshot.as_ref());
        let html = ProformaTemplate { doc }.render()?;

        self.cache.insert(key, html.clone());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_through() {
        let err = RenderError::from(AdminShopifyError::NotFound("gid://shopify/Order/1".to_string()));
        assert!(matches!(err, RenderError::NotFound(_)));
    }

    #[test]
    fn test_projection_maps_through() {
        let err = RenderError::from(AdminShopifyError::Projection(ProjectionError::Missing(
            "order.totalPriceSet",
        )));
        assert!(matches!(
            err,
            RenderError::Projection(ProjectionError::Missing("order.totalPriceSet"))
        ));
    }

    #[test]
    fn test_other_errors_are_fetch_errors() {
        let err = RenderError::from(AdminShopifyError::RateLimited(2));
        assert!(matches!(err, RenderError::Fetch(_)));
    }
}
