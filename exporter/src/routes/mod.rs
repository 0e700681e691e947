//! HTTP routes.
//!
//! Every `/metrics/*` handler follows the same shape: begin a [`Scrape`],
//! register that endpoint's gauges, spawn one task per data source, then
//! render whatever the tasks managed to write.

use std::fmt::Display;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{error, warn};

use cosmos::{CONTENT_TYPE, ClientError, MetricsError, Scrape};

use crate::state::SharedState;

pub mod general;
pub mod gravity_bridge;
pub mod health;
pub mod osmosis;
pub mod params;
pub mod status;
pub mod validator;
pub mod validators;
pub mod wallet;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics/general", get(general::general_metrics))
        .route("/metrics/wallet", get(wallet::wallet_metrics))
        .route("/metrics/validator", get(validator::validator_metrics))
        .route("/metrics/validators", get(validators::validators_metrics))
        .route("/metrics/params", get(params::params_metrics))
        .route(
            "/metrics/gravity-bridge",
            get(gravity_bridge::gravity_bridge_metrics),
        )
        .route("/metrics/status", get(status::status_metrics))
        .route("/metrics/osmosis", get(osmosis::osmosis_metrics))
        .with_state(state)
}

/// Waits for the scrape and turns the exposition into a response.
pub(crate) async fn render(scrape: Scrape) -> Response {
    match scrape.finish().await {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(err) => {
            error!(error = %err, "could not encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Malformed caller input: logged, answered with an empty body.
pub(crate) fn reject(scrape: &Scrape, reason: impl Display) -> Response {
    scrape
        .span()
        .in_scope(|| error!(error = %reason, "rejecting request"));
    StatusCode::OK.into_response()
}

pub(crate) fn registration_failed(scrape: &Scrape, err: MetricsError) -> Response {
    scrape
        .span()
        .in_scope(|| error!(error = %err, "could not register metrics"));
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// Hands a parsed value to `set`, or logs and skips it.
pub(crate) fn record(value: Result<f64, ClientError>, set: impl FnOnce(f64)) {
    match value {
        Ok(value) => set(value),
        Err(err) => warn!(error = %err, "skipping malformed value"),
    }
}

pub(crate) fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
