// exporter/src/main.rs

//! Cosmos exporter binary.
//!
//! Serves Prometheus metrics scraped on demand from a Cosmos-SDK node:
//!
//! - `GET /metrics/general`
//! - `GET /metrics/wallet?address=`
//! - `GET /metrics/validator?address=`
//! - `GET /metrics/validators`
//! - `GET /metrics/params`
//! - `GET /metrics/gravity-bridge?cudos_orchestrator_address=&ethereum_orchestrator_address=`
//! - `GET /metrics/status`
//! - `GET /metrics/osmosis`
//! - `GET /health`
//!
//! Each request queries the backends concurrently and renders a fresh
//! registry; nothing is cached between scrapes.

mod cli;
mod routes;
mod state;

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use cosmos::{ChainContext, Settings};
use state::{AppState, Backends, SharedState};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("fatal error: invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    if let Err(e) = run(settings).await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> Result<(), String> {
    // ---------------------------
    // Backends + chain context
    // ---------------------------

    let backends = Backends::connect(&settings).map_err(|e| e.to_string())?;

    let chain = ChainContext::resolve(
        &settings.denom,
        settings.denom_coefficient,
        &backends.cosmos,
        &backends.tendermint,
    )
    .await
    .map_err(|e| e.to_string())?;

    tracing::info!(
        chain_id = %chain.chain_id,
        denom = %chain.denomination.denom,
        coefficient = chain.denomination.coefficient,
        node = %settings.node,
        "resolved chain"
    );

    // ---------------------------
    // Shared state
    // ---------------------------

    let listen_address = settings.listen_address;
    let app_state: SharedState =
        Arc::new(AppState::new(settings, chain, backends).map_err(|e| e.to_string())?);

    // ---------------------------
    // HTTP server
    // ---------------------------

    let app = routes::router(app_state);

    tracing::info!("exporter listening on http://{}", listen_address);

    let listener = tokio::net::TcpListener::bind(listen_address)
        .await
        .map_err(|e| format!("failed to bind {listen_address}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("exporter server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
