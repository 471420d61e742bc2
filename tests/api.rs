// HTTP query API tests
//
// Numan Thabit 2025 Nov

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::*;
use swap_gateway::api::{create_api_router, AppState};
use swap_gateway::gateway::Call;
use swap_gateway::venues::amm::V2_FEE_TIER;

fn app_with_order() -> axum::Router {
    let (gateway, mut chain) = deploy(amm_venues());
    seed(&mut chain, USD, EUR, V2_FEE_TIER, 1_000_000, 1_000_000);
    fund_and_approve(&mut chain, USD, ALICE, 1000);
    gateway
        .create_order(&mut chain, Call::new(ALICE), USD, units(1000), terms(250))
        .unwrap();
    create_api_router(AppState::new(Arc::new(gateway), chain))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (status, _) = send(
        app_with_order(),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn order_lookup_returns_record_or_404() {
    let app = app_with_order();
    let (status, body) = send(
        app.clone(),
        Request::get("/api/v1/orders/0").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feePercent"], json!(250));
    assert_eq!(body["isFulfilled"], json!(true));
    assert_eq!(body["isRefunded"], json!(false));
    assert_eq!(body["token"], serde_json::to_value(USD).unwrap());
    assert_eq!(body["amount"], serde_json::to_value(units(1000)).unwrap());

    let (status, body) = send(
        app,
        Request::get("/api/v1/orders/7").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], json!("not_found"));
}

#[tokio::test]
async fn config_snapshot_reports_addresses_and_count() {
    let (status, body) = send(
        app_with_order(),
        Request::get("/api/v1/config").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pathRouter"], serde_json::to_value(V2_ROUTER).unwrap());
    assert_eq!(body["quoter"], serde_json::to_value(QUOTER).unwrap());
    assert_eq!(body["wrappedNative"], serde_json::to_value(WRAPPED).unwrap());
    assert_eq!(body["totalOrders"], json!(1));
}

#[tokio::test]
async fn batch_support_check() {
    let (status, body) = send(
        app_with_order(),
        post_json(
            "/api/v1/assets/supported",
            json!({ "assets": [USD, "0x4242424242424242424242424242424242424242"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["supported"], json!([true, false]));
}

#[tokio::test]
async fn quote_maps_results_and_errors() {
    let app = app_with_order();

    let (status, body) = send(
        app.clone(),
        post_json(
            "/api/v1/quote",
            json!({ "kind": "v2_pair", "token_in": USD, "token_out": EUR, "amount_in": "0x3e8" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["amountOut"].is_string());

    // no pool at this fee tier: the quoter reverts
    let (status, body) = send(
        app.clone(),
        post_json(
            "/api/v1/quote",
            json!({
                "kind": "v3_single",
                "token_in": USD,
                "token_out": EUR,
                "fee_tier": 500,
                "amount_in": "0x3e8"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], json!("estimate_failed"));

    let (status, body) = send(
        app,
        post_json(
            "/api/v1/quote",
            json!({ "kind": "v2_path", "path": [USD], "amount_in": "0x1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], json!("validation"));
}

#[tokio::test]
async fn metrics_are_rendered_as_text() {
    let response = app_with_order()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("gateway_orders_created_total"));
}
