//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. CORS for the POS and admin extensions
//! 4. `no_cache_middleware` on print routes
//!
//! Extension API routes authenticate with the [`ShopSession`] extractor.

mod auth;
mod headers;

pub use auth::{SessionClaims, SessionVerifier, ShopSession};
pub use headers::no_cache_middleware;
