//! Signed print links for the POS extension.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use proforma_core::OrderId;
use serde_json::json;

use crate::middleware::ShopSession;
use crate::state::AppState;

/// Issue a signed proforma print URL for an order.
///
/// Responds `{ "url": ... }`; any failure is `{ "error": "Server error" }`
/// so the extension can always read the body.
#[tracing::instrument(skip_all, fields(order_id = %order_id, shop = %session.shop))]
pub async fn proforma_link(
    State(state): State<AppState>,
    session: ShopSession,
    Path(order_id): Path<String>,
) -> Response {
    match OrderId::parse(&order_id) {
        Ok(order_id) => {
            let link = state.signer().issue(order_id, &session.shop);
            tracing::info!(order_id = %link.order_id, "Issued proforma print link");
            Json(json!({ "url": link.url })).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, order_id = %order_id, "Invalid order id for print link");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Server error" })),
            )
                .into_response()
        }
    }
}
