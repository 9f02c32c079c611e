//! Response header middleware.

use axum::{
    extract::Request,
    http::{HeaderValue, header::CACHE_CONTROL},
    middleware::Next,
    response::Response,
};

/// `Cache-Control` value for documents that must never be stored.
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Forbid caching of every response, errors included.
///
/// Print pages are fetched by POS devices and browsers that would otherwise
/// reuse a stale proforma after the order changes.
pub async fn no_cache_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    response
}
