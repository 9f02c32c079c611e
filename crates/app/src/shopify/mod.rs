//! Shopify Admin API client.
//!
//! # Security
//!
//! **This module holds the offline Admin API access token of the store.**
//!
//! The service only needs:
//! - Orders and customers (read `invoice` metafields, order detail)
//! - Metafields (write the `invoice` request snapshot)
//! - Shop (name, billing address, `company` metafields)
//!
//! # Architecture
//!
//! - Query documents are plain strings sent in `graphql_client::QueryBody`
//!   envelopes; responses are read through `graphql_client::Response`
//! - Wire types live in [`types`] and convert into `proforma_core` records
//! - No retries: a failed call is terminal for the request that made it

mod admin;
pub mod types;

pub use admin::AdminClient;
pub use types::*;

use proforma_core::proforma::ProjectionError;
use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A field the service relies on is missing from the response.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl GraphQLError {
    /// Error without location or path.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
