//! Health check endpoints
//!
//! Liveness and readiness probes for the load balancer, plus a summary of the
//! reference datasets the server started with.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status ("healthy" or "unhealthy")
    pub status: String,
    /// Server version
    pub version: String,
    /// Server uptime in seconds
    pub uptime_secs: u64,
    /// Environment name
    pub environment: String,
    /// Dataset status
    pub datasets: DatasetStatus,
}

/// Reference datasets held in memory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStatus {
    /// Tickers in the fundamentals source, when known
    pub tickers: Option<usize>,
    /// Products in the elasticity catalog
    pub catalog_products: usize,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub ready: bool,
}

/// Build the health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        environment: state.config.environment.to_string(),
        datasets: DatasetStatus {
            tickers: state.fundamentals.ticker_count(),
            catalog_products: state.catalog.len(),
        },
    };

    (StatusCode::OK, Json(response))
}

/// GET /ready
///
/// The engines hold no external connections, so a running process is ready.
async fn ready_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(ReadyResponse { ready: true }))
}
