//! POS print link tests.
//!
//! Run with: `cargo test -p proforma-integration-tests --test pos_link`

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use proforma_integration_tests::{
    BASE_URL, FakePlatform, STORE, TestContext, assert_status, body_json, body_string,
    company_annotations, sample_order,
};
use serde_json::json;

fn context() -> TestContext {
    TestContext::new(FakePlatform::new().with_order(sample_order(1001, Some(company_annotations()))))
}

#[tokio::test]
async fn test_issued_link_opens_the_proforma() {
    let ctx = context();

    let response = ctx.authed("GET", "/pos/1001/proforma").await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    let link = url::Url::parse(body["url"].as_str().unwrap()).unwrap();
    assert!(link.as_str().starts_with(&format!("{BASE_URL}/print/proforma/1001?")));

    let query: Vec<(String, String)> = link.query_pairs().into_owned().collect();
    let sig = &query.iter().find(|(k, _)| k == "sig").unwrap().1;
    let shop = &query.iter().find(|(k, _)| k == "shop").unwrap().1;
    assert_eq!(shop, STORE);
    assert!(ctx.state.signer().verify("1001", STORE, sig));

    let response = ctx
        .get(&format!("{}?{}", link.path(), link.query().unwrap()))
        .await;
    assert_status(&response, StatusCode::OK);
    assert!(body_string(response).await.contains("#1001"));
}

#[tokio::test]
async fn test_accepts_order_gid() {
    let ctx = context();

    let response = ctx
        .authed("GET", "/pos/gid%3A%2F%2Fshopify%2FOrder%2F1001/proforma")
        .await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["url"].as_str().unwrap().contains("/print/proforma/1001?"));
}

#[tokio::test]
async fn test_invalid_order_id() {
    let ctx = context();

    let response = ctx.authed("GET", "/pos/abc/proforma").await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "Server error" }));
}

#[tokio::test]
async fn test_requires_session_token() {
    let ctx = context();

    let response = ctx.get("/pos/1001/proforma").await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].as_str().is_some());

    let response = ctx
        .send(
            Request::get("/pos/1001/proforma")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Unauthorized: Invalid session token" })
    );
}

#[tokio::test]
async fn test_preflight() {
    let ctx = context();

    let response = ctx
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/pos/1001/proforma")
                .header(header::ORIGIN, "https://extensions.shopifycdn.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_status(&response, StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(methods.contains("GET"));
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn test_health() {
    let ctx = context();

    let response = ctx.get("/health").await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}
