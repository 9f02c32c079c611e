//! Application state shared across handlers.

use std::sync::Arc;

use proforma_core::signing::{LinkSigner, SigningError};

use crate::config::ProformaConfig;
use crate::middleware::SessionVerifier;
use crate::services::{Clock, CommercePlatform, InvoiceService, ProformaRenderer, RenderCache};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ProformaConfig,
    signer: LinkSigner,
    sessions: SessionVerifier,
    invoices: InvoiceService,
    renderer: ProformaRenderer,
}

impl AppState {
    /// Wire services around a commerce platform and a clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the link signer rejects the API secret or the
    /// public base URL.
    pub fn new(
        config: ProformaConfig,
        platform: Arc<dyn CommercePlatform>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SigningError> {
        let shopify = &config.shopify;
        let signer = LinkSigner::new(&shopify.api_secret, &config.base_url)?;
        let sessions =
            SessionVerifier::new(&shopify.api_secret, &shopify.api_key, shopify.store.clone());
        let cache = Arc::new(RenderCache::with_clock(config.cache_ttl, clock));
        let invoices = InvoiceService::new(platform.clone());
        let renderer = ProformaRenderer::new(platform, shopify.store.clone(), cache);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                signer,
                sessions,
                invoices,
                renderer,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ProformaConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn signer(&self) -> &LinkSigner {
        &self.inner.signer
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionVerifier {
        &self.inner.sessions
    }

    #[must_use]
    pub fn invoices(&self) -> &InvoiceService {
        &self.inner.invoices
    }

    #[must_use]
    pub fn renderer(&self) -> &ProformaRenderer {
        &self.inner.renderer
    }
}
