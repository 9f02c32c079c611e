//! Print link signing commands.
//!
//! # Usage
//!
//! ```bash
//! # Issue a signed print URL
//! proforma-cli sign --order 1001 --shop your-store.myshopify.com
//!
//! # Check a signature (exits non-zero on mismatch)
//! proforma-cli verify --order 1001 --shop your-store.myshopify.com --sig <hex>
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_API_SECRET` - Key print links are signed with
//! - `PROFORMA_BASE_URL` - Public URL print links are issued under

use proforma_core::signing::{LinkSigner, SignedPrintLink, SigningError};
use proforma_core::{IdError, OrderId, ShopDomain, ShopDomainError};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur during link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid order id: {0}")]
    InvalidOrder(#[from] IdError),

    #[error("Invalid shop: {0}")]
    InvalidShop(#[from] ShopDomainError),

    #[error("Signer error: {0}")]
    Signer(#[from] SigningError),

    /// The signature does not match the order and shop.
    #[error("Signature mismatch")]
    SignatureMismatch,
}

fn signer() -> Result<LinkSigner, LinkError> {
    dotenvy::dotenv().ok();

    let secret = std::env::var("SHOPIFY_API_SECRET")
        .map_err(|_| LinkError::MissingEnvVar("SHOPIFY_API_SECRET"))?;
    let base_url = std::env::var("PROFORMA_BASE_URL")
        .map_err(|_| LinkError::MissingEnvVar("PROFORMA_BASE_URL"))?;

    Ok(LinkSigner::new(&SecretString::from(secret), &base_url)?)
}

/// Issue a signed print link.
pub fn sign(order: &str, shop: &str) -> Result<SignedPrintLink, LinkError> {
    let order_id = OrderId::parse(order)?;
    let shop = ShopDomain::parse(shop)?;

    let link = signer()?.issue(order_id, &shop);
    tracing::info!(order_id = %link.order_id, shop = %link.shop, "Issued print link");
    Ok(link)
}

/// Verify a print link signature against the exact order and shop strings.
pub fn verify(order: &str, shop: &str, sig: &str) -> Result<(), LinkError> {
    if signer()?.verify(order, shop, sig) {
        tracing::info!("Signature valid");
        Ok(())
    } else {
        Err(LinkError::SignatureMismatch)
    }
}
