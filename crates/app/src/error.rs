//! Unified error handling for the HTTP boundary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use proforma_core::invoice::{ValidationError, WriteError};
use proforma_core::{IdError, ShopDomainError};
use serde::Serialize;
use thiserror::Error;

use crate::services::{InvoiceError, RenderError};
use crate::shopify::AdminShopifyError;

/// JSON body of every error without a structured payload.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Application-level error type for API routes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] AdminShopifyError),

    /// The platform rejected an invoice request write.
    #[error("Write rejected: {0}")]
    WriteRejected(WriteError),

    /// Customer fiscal data is incomplete.
    #[error("Validation failed")]
    Validation(Vec<ValidationError>),

    /// Rendering a proforma failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with the resource's current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::Fetch(e) => Self::Shopify(e),
            InvoiceError::Write(e) => Self::WriteRejected(e),
            InvoiceError::Validation(errors) => Self::Validation(errors),
            InvoiceError::NoCustomer => Self::BadRequest("Order has no customer".to_string()),
            InvoiceError::AlreadyRequested => {
                Self::Conflict("Invoice already requested".to_string())
            }
            InvoiceError::Serialize(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<IdError> for AppError {
    fn from(err: IdError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ShopDomainError> for AppError {
    fn from(err: ShopDomainError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl AppError {
    /// Whether the failure is ours (or upstream's) rather than the caller's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Shopify(_) | Self::Render(_) | Self::Internal(_)
        )
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(_) | Self::WriteRejected(_) => StatusCode::BAD_GATEWAY,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Capture a server error to Sentry and log it.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        let status = self.status();

        // Extensions always read the body as JSON.
        let message = match self {
            Self::Validation(errors) => return (status, Json(errors)).into_response(),
            Self::WriteRejected(error) => return (status, Json(error)).into_response(),
            // Don't expose internal error details to clients
            Self::Internal(_) | Self::Render(_) => "Internal server error".to_string(),
            Self::Shopify(_) => "External service error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Validation(vec![])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::WriteRejected(WriteError::new(None, "bad"))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invoice_error_mapping() {
        assert!(matches!(
            AppError::from(InvoiceError::NoCustomer),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(InvoiceError::Validation(vec![])),
            AppError::Validation(_)
        ));
        assert_eq!(
            AppError::from(InvoiceError::AlreadyRequested).status(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_error_bodies_are_json() {
        let response = AppError::Unauthorized("Missing session token".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "Unauthorized: Missing session token" })
        );
    }
}
