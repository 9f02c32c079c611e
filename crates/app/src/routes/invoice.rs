//! Invoice eligibility and request endpoints for the admin extension.

use axum::{
    Json,
    extract::{Path, State},
};
use proforma_core::OrderId;
use proforma_core::invoice::EligibilityReport;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::ShopSession;
use crate::state::AppState;

/// Response of a successful invoice request.
#[derive(Debug, Serialize)]
pub struct RequestedResponse {
    pub status: &'static str,
}

/// Eligibility report of an order.
///
/// A platform failure still answers 200, with `fetched: false` and the
/// conservative default.
#[tracing::instrument(skip_all, fields(order_id = %order_id, shop = %session.shop))]
pub async fn eligibility(
    State(state): State<AppState>,
    session: ShopSession,
    Path(order_id): Path<String>,
) -> Result<Json<EligibilityReport>, AppError> {
    let order_id = OrderId::parse(&order_id)?;
    Ok(Json(state.invoices().evaluate(order_id).await))
}

/// Request invoicing for an order.
///
/// The order is re-evaluated first: incomplete fiscal data answers 422 with
/// the validation errors, a rejected write 502 with the first write error.
#[tracing::instrument(skip_all, fields(order_id = %order_id, shop = %session.shop))]
pub async fn request(
    State(state): State<AppState>,
    session: ShopSession,
    Path(order_id): Path<String>,
) -> Result<Json<RequestedResponse>, AppError> {
    let order_id = OrderId::parse(&order_id)?;
    state.invoices().request(order_id).await?;

    Ok(Json(RequestedResponse {
        status: "requested",
    }))
}
