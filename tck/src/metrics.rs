//! # Prometheus Metrics
//!
//! Request counters and latency for the JSON-RPC endpoint, served at
//! `GET /metrics`. Everything lives in a dedicated registry with the
//! `hiero_tck` prefix.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::server::AppState;

/// Metric handles for the server. Cheap to clone.
#[derive(Clone)]
pub struct TckMetrics {
    registry: Registry,
    /// JSON-RPC requests, by method and outcome (`ok`, `error`, `invalid`).
    pub rpc_requests_total: IntCounterVec,
    /// Sessions that currently hold a client.
    pub active_sessions: IntGauge,
    /// Wall time from request body to response, in seconds.
    pub rpc_latency_seconds: Histogram,
}

impl TckMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("hiero_tck".into()), None)?;

        let rpc_requests_total = IntCounterVec::new(
            Opts::new("rpc_requests_total", "JSON-RPC requests handled"),
            &["method", "outcome"],
        )?;
        registry.register(Box::new(rpc_requests_total.clone()))?;

        let active_sessions = IntGauge::new("active_sessions", "Sessions with a configured client")?;
        registry.register(Box::new(active_sessions.clone()))?;

        // Transactions wait on consensus, so the buckets reach further than
        // a typical RPC histogram.
        let rpc_latency_seconds = Histogram::with_opts(
            HistogramOpts::new("rpc_latency_seconds", "JSON-RPC request latency in seconds")
                .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(rpc_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            rpc_requests_total,
            active_sessions,
            rpc_latency_seconds,
        })
    }

    pub fn record(&self, method: &str, outcome: &str) {
        self.rpc_requests_total.with_label_values(&[method, outcome]).inc();
    }

    /// Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// `GET /metrics`.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_the_export() {
        let metrics = TckMetrics::new().unwrap();
        metrics.record("setup", "ok");
        metrics.record("setup", "ok");
        metrics.active_sessions.set(1);

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"hiero_tck_rpc_requests_total{method="setup",outcome="ok"} 2"#));
        assert!(text.contains("hiero_tck_active_sessions 1"));
    }
}
