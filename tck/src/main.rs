// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Hiero TCK Server
//!
//! Entry point for the `hiero-tck` binary: a JSON-RPC 2.0 server that lets a
//! conformance harness drive the SDK. Parses CLI flags, sets up logging and
//! metrics, then serves until SIGINT or SIGTERM.

mod cli;
mod errors;
mod handlers;
mod logging;
mod metrics;
mod protocol;
mod server;
mod sessions;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use cli::TckCli;
use logging::LogFormat;
use metrics::TckMetrics;
use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TckCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::from_str_lossy(&cli.log_format))?;

    let metrics = Arc::new(TckMetrics::new().context("failed to register metrics")?);
    let router = server::create_router(AppState::new(metrics));

    let addr = cli.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind TCK listener on {addr}"))?;
    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "hiero-tck listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("hiero-tck stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM. If a handler can't be installed, that
/// branch never fires and the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
