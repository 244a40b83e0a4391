//! Inbound HTTP: a collect-now trigger and pass-through for externally sourced logs.
//!
//! - `POST /v1/cli_manager` - collect a `status` or `activity` snapshot and relay it
//! - `POST /v1/feature_log` - relay a feature usage log
//! - `POST /v1/interaction_log` - relay an interaction log
//! - `GET /health` - liveness plus the active schedule
//!
//! Every route answers cross-origin GET/POST and is traced at info level.

use crate::error::AgentError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

pub const FEATURE_LOG_PATH: &str = "/v1/feature_log";
pub const INTERACTION_LOG_PATH: &str = "/v1/interaction_log";

#[derive(Debug, Serialize, Default)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureLog {
    #[serde(rename = "hwId")]
    pub hw_id: String,
    #[serde(rename = "featureId")]
    pub feature_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InteractionLog {
    #[serde(rename = "hwId")]
    pub hw_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/cli_manager", post(collect_handler))
        .route(FEATURE_LOG_PATH, post(feature_log_handler))
        .route(INTERACTION_LOG_PATH, post(interaction_log_handler))
        .route("/health", get(health_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer())
        .with_state(state)
}

/// Reflects the caller's origin and requested headers.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
}

async fn collect_handler(State(state): State<AppState>, Json(req): Json<CollectRequest>) -> Response {
    match state.pipeline.run_named(&req.kind).await {
        Ok(snapshot) => match serde_json::to_value(&snapshot) {
            Ok(data) => Json(ApiResponse::ok(Some(data))).into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::fail(format!("failed to encode snapshot: {e}"))),
            )
                .into_response(),
        },
        Err(e @ AgentError::UnknownRequestKind(_)) => {
            warn!("rejected collect request: {e}");
            (StatusCode::BAD_REQUEST, Json(ApiResponse::fail(e.to_string()))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::fail(e.to_string())),
        )
            .into_response(),
    }
}

async fn feature_log_handler(State(state): State<AppState>, Json(log): Json<FeatureLog>) -> Json<ApiResponse> {
    info!(hw_id = %log.hw_id, feature = %log.feature_id, "feature log received");
    state.pipeline.relay_client().relay(FEATURE_LOG_PATH, &log).await;
    Json(ApiResponse::ok(None))
}

async fn interaction_log_handler(
    State(state): State<AppState>,
    Json(log): Json<InteractionLog>,
) -> Json<ApiResponse> {
    info!(hw_id = %log.hw_id, kind = %log.kind, "interaction log received");
    state.pipeline.relay_client().relay(INTERACTION_LOG_PATH, &log).await;
    Json(ApiResponse::ok(None))
}

async fn health_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    Json(ApiResponse::ok(Some(json!({
        "deviceId": state.pipeline.collector().device_id(),
        "schedule": &*state.schedule,
        "relay": state.pipeline.relay_client().base_url().is_some(),
    }))))
}
