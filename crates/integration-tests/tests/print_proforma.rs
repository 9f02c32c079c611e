//! Signed print link tests.
//!
//! Run with: `cargo test -p proforma-integration-tests --test print_proforma`

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::{StatusCode, header};
use proforma_core::OrderId;
use proforma_integration_tests::{
    CallCounts, FakePlatform, TestContext, assert_status, body_string, company_annotations,
    sample_order,
};

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

fn context() -> TestContext {
    TestContext::new(FakePlatform::new().with_order(sample_order(1001, Some(company_annotations()))))
}

fn cache_control(response: &axum::http::Response<axum::body::Body>) -> Option<&str> {
    response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_missing_parameters() {
    let ctx = context();

    for uri in [
        "/print/proforma/1001",
        "/print/proforma/1001?sig=abc",
        "/print/proforma/1001?shop=negozio.myshopify.com",
        "/print/proforma/1001?sig=&shop=negozio.myshopify.com",
    ] {
        let response = ctx.get(uri).await;
        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(cache_control(&response), Some(NO_CACHE));
        assert_eq!(body_string(response).await, "Missing parameters");
    }

    assert_eq!(CallCounts::get(&ctx.platform.calls.proforma_order), 0);
}

#[tokio::test]
async fn test_bad_signature_is_rejected_before_fetching() {
    let ctx = context();

    let response = ctx
        .get("/print/proforma/1001?sig=deadbeef&shop=negozio.myshopify.com")
        .await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
    assert_eq!(cache_control(&response), Some(NO_CACHE));
    assert_eq!(body_string(response).await, "Unauthorized Access");

    // A valid signature for another order does not carry over.
    let path = ctx.print_path(1001).replace("/1001?", "/1002?");
    let response = ctx.get(&path).await;
    assert_status(&response, StatusCode::UNAUTHORIZED);

    assert_eq!(CallCounts::get(&ctx.platform.calls.proforma_order), 0);
    assert_eq!(CallCounts::get(&ctx.platform.calls.shop), 0);
}

#[tokio::test]
async fn test_renders_proforma() {
    let ctx = context();

    let response = ctx.get(&ctx.print_path(1001)).await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(cache_control(&response), Some(NO_CACHE));
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .starts_with("text/html")
    );

    let html = body_string(response).await;
    assert!(html.contains("#1001"));
    assert!(html.contains("Negozio Design"));
    assert!(html.contains("Sedia Lounge"));
    assert!(html.contains("€90,00"));
    assert!(html.contains("Bonifico bancario"));
}

#[tokio::test]
async fn test_repeat_render_is_served_from_cache() {
    let ctx = context();
    let path = ctx.print_path(1001);

    let first = body_string(ctx.get(&path).await).await;

    ctx.platform
        .update_order(OrderId::new(1001), |order| order.name = "#CHANGED".to_string());
    ctx.clock.advance(Duration::from_secs(299));

    let second = body_string(ctx.get(&path).await).await;
    assert_eq!(first, second);
    assert_eq!(CallCounts::get(&ctx.platform.calls.proforma_order), 1);
    assert_eq!(CallCounts::get(&ctx.platform.calls.shop), 1);
}

#[tokio::test]
async fn test_expired_render_is_refetched() {
    let ctx = context();
    let path = ctx.print_path(1001);

    ctx.get(&path).await;
    ctx.platform
        .update_order(OrderId::new(1001), |order| order.name = "#CHANGED".to_string());
    ctx.clock.advance(Duration::from_secs(301));

    let html = body_string(ctx.get(&path).await).await;
    assert!(html.contains("#CHANGED"));
    assert_eq!(CallCounts::get(&ctx.platform.calls.proforma_order), 2);
}

#[tokio::test]
async fn test_unknown_order_is_a_generic_error() {
    let ctx = context();

    let response = ctx.get(&ctx.print_path(4242)).await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(cache_control(&response), Some(NO_CACHE));
    assert_eq!(body_string(response).await, "Errore");
}

#[tokio::test]
async fn test_platform_failure_is_a_generic_error() {
    let ctx = context();
    ctx.platform.set_unavailable(true);

    let response = ctx.get(&ctx.print_path(1001)).await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, "Errore");

    // Failures are not cached.
    ctx.platform.set_unavailable(false);
    let response = ctx.get(&ctx.print_path(1001)).await;
    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn test_print_allows_any_origin() {
    let ctx = context();

    let response = ctx
        .send(
            axum::http::Request::get(ctx.print_path(1001))
                .header(header::ORIGIN, "https://extensions.shopifycdn.com")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
