//! Signature-gated proforma print page.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use proforma_core::{OrderId, ShopDomain};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Generic body of every print failure after the signature check.
const GENERIC_ERROR: &str = "Errore";

#[derive(Debug, Deserialize)]
pub struct PrintParams {
    pub sig: Option<String>,
    pub shop: Option<String>,
}

/// Render the proforma behind a signed link.
///
/// The signature is checked against the raw path and query strings before
/// anything is parsed or fetched.
#[tracing::instrument(skip_all, fields(order_id = %order_id))]
pub async fn proforma(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(params): Query<PrintParams>,
) -> Response {
    let (Some(sig), Some(shop)) = (
        params.sig.filter(|s| !s.is_empty()),
        params.shop.filter(|s| !s.is_empty()),
    ) else {
        return (StatusCode::BAD_REQUEST, "Missing parameters").into_response();
    };

    if !state.signer().verify(&order_id, &shop, &sig) {
        tracing::warn!(shop = %shop, "Print link signature mismatch");
        return (StatusCode::UNAUTHORIZED, "Unauthorized Access").into_response();
    }

    match render(&state, &order_id, &shop).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Proforma rendering failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR).into_response()
        }
    }
}

async fn render(state: &AppState, order_id: &str, shop: &str) -> Result<String, AppError> {
    let order_id = OrderId::parse(order_id)?;
    let shop = ShopDomain::parse(shop)?;
    Ok(state.renderer().render(order_id, &shop).await?)
}
