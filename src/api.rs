// Gateway HTTP API implementation
// This file provides read-only HTTP endpoints over the gateway query surface
//
// Numan Thabit 2025 Nov

use alloy_primitives::{Address, U256};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::chain::Chain;
use crate::errors::GatewayError;
use crate::gateway::{ConfigSnapshot, Gateway};
use crate::ledger::Order;
use crate::metrics;
use crate::router::EstimateRequest;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub chain: Arc<Mutex<Chain>>,
}

impl AppState {
    pub fn new(gateway: Arc<Gateway>, chain: Chain) -> Self {
        Self {
            gateway,
            chain: Arc::new(Mutex::new(chain)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SupportQuery {
    pub assets: Vec<Address>,
}

#[derive(Debug, Serialize)]
pub struct SupportResponse {
    pub supported: Vec<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub amount_out: U256,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Create the HTTP router with API endpoints
pub fn create_api_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/api/v1/orders/:id", get(get_order))
        .route("/api/v1/config", get(get_config))
        .route("/api/v1/assets/supported", post(check_support))
        .route("/api/v1/quote", post(quote))
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Order>, ApiError> {
    state.gateway.order(id).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("order {id} not found"),
                kind: "not_found",
            }),
        )
    })
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigSnapshot> {
    Json(state.gateway.config_snapshot())
}

async fn check_support(
    State(state): State<AppState>,
    Json(req): Json<SupportQuery>,
) -> Json<SupportResponse> {
    Json(SupportResponse {
        supported: state.gateway.batch_is_supported(&req.assets),
    })
}

/// Output estimate for any router shape; never changes state
async fn quote(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let chain = state.chain.lock().await;
    let amount_out = state
        .gateway
        .estimate(&chain, &req)
        .map_err(api_error)?;
    Ok(Json(QuoteResponse { amount_out }))
}

async fn render_metrics() -> String {
    metrics::render()
}

fn api_error(err: GatewayError) -> ApiError {
    let status = match &err {
        GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
        GatewayError::Unauthorized(_) => StatusCode::FORBIDDEN,
        GatewayError::SwapFailed { .. } | GatewayError::EstimateFailed { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GatewayError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::Reentrancy => StatusCode::CONFLICT,
        GatewayError::TransferFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
        }),
    )
}
