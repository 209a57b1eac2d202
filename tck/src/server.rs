//! # HTTP Surface
//!
//! | Method | Path       | Description                 |
//! |--------|------------|-----------------------------|
//! | POST   | `/`        | JSON-RPC 2.0 endpoint       |
//! | GET    | `/health`  | Liveness probe              |
//! | GET    | `/metrics` | Prometheus text exposition  |
//!
//! JSON-RPC failures are still HTTP 200; the error lives in the body. The
//! body is taken as raw bytes so malformed JSON, or bytes that are not
//! UTF-8 at all, get a proper `-32700` instead of axum's own rejection.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use hiero_sdk::Transport;

use crate::errors::JsonRpcError;
use crate::handlers::{dispatch, Method};
use crate::metrics::{metrics_handler, TckMetrics};
use crate::protocol::{error_response, parse_request, success_response};
use crate::sessions::{SessionRegistry, DEFAULT_SESSION};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub metrics: Arc<TckMetrics>,
    /// When set, every client built by `setup` talks through this transport
    /// instead of TCP.
    pub transport: Option<Arc<dyn Transport>>,
}

impl AppState {
    pub fn new(metrics: Arc<TckMetrics>) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            metrics,
            transport: None,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(rpc_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `POST /`.
async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let timer = state.metrics.rpc_latency_seconds.start_timer();
    let response = match std::str::from_utf8(&body) {
        Ok(body) => handle_rpc(&state, body).await,
        Err(_) => {
            warn!("request body is not utf-8");
            state.metrics.record("unknown", "invalid");
            error_response(&JsonRpcError::parse_error(), Value::Null)
        }
    };
    timer.observe_duration();
    Json(response)
}

/// One request body in, one response object out.
pub async fn handle_rpc(state: &AppState, body: &str) -> Value {
    let request = match parse_request(body) {
        Ok(request) => request,
        Err(rejected) => {
            warn!(code = rejected.error.code, "rejected malformed request");
            state.metrics.record("unknown", "invalid");
            return error_response(&rejected.error, rejected.id);
        }
    };

    let method = match request.method.parse::<Method>() {
        Ok(method) => method,
        Err(e) => {
            warn!(method = %request.method, "unknown method");
            state.metrics.record("unknown", "error");
            return error_response(&e, request.id);
        }
    };

    let span = info_span!(
        "rpc",
        request_id = %Uuid::new_v4(),
        method = method.name(),
        session_id = request.session_id.as_deref().unwrap_or(DEFAULT_SESSION),
    );
    let result = dispatch(state, method, request.params, request.session_id.as_deref())
        .instrument(span)
        .await;

    match result {
        Ok(result) => {
            state.metrics.record(method.name(), "ok");
            success_response(result, request.id)
        }
        Err(e) => {
            warn!(method = method.name(), code = e.code, error = %e, "request failed");
            state.metrics.record(method.name(), "error");
            error_response(&e, request.id)
        }
    }
}
