//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Extension API (Shopify session token)
//! GET  /api/orders/{order_id}/invoice   - Invoice eligibility report
//! POST /api/orders/{order_id}/invoice   - Request invoicing
//! GET  /pos/{order_id}/proforma         - Signed print link for the POS
//!
//! # Print (signed link)
//! GET  /print/proforma/{order_id}       - Proforma HTML (?sig=&shop=)
//! ```

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};

use crate::middleware::no_cache_middleware;
use crate::state::AppState;

pub mod invoice;
pub mod pos;
pub mod print;

/// CORS for the POS and admin extensions, which call from Shopify origins.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Build all routes.
pub fn routes() -> Router<AppState> {
    let print_routes = Router::new()
        .route("/print/proforma/{order_id}", get(print::proforma))
        .layer(middleware::from_fn(no_cache_middleware));

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/orders/{order_id}/invoice",
            get(invoice::eligibility).post(invoice::request),
        )
        .route("/pos/{order_id}/proforma", get(pos::proforma_link))
        .merge(print_routes)
        .layer(cors_layer())
}

async fn health() -> &'static str {
    "ok"
}
