//! Route modules for the valuation server
//!
//! - dcf: discounted-cash-flow valuation
//! - vc: venture-capital valuation and scenario presets
//! - elasticity: price simulation and catalog listing
//! - health: health check and readiness probes

pub mod dcf;
pub mod elasticity;
pub mod health;
pub mod vc;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::datasets::{DatasetError, FundamentalsBook, FundamentalsSource, ProductCatalog};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
    /// Company data behind `GET /api/v1/dcf?ticker=...`
    pub fundamentals: Arc<dyn FundamentalsSource>,
    /// Elasticity estimates behind the product listing
    pub catalog: Arc<ProductCatalog>,
}

impl AppState {
    /// State with empty datasets.
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self::with_datasets(
            config,
            Arc::new(FundamentalsBook::default()),
            Arc::new(ProductCatalog::default()),
        )
    }

    pub fn with_datasets(
        config: Arc<ServerConfig>,
        fundamentals: Arc<dyn FundamentalsSource>,
        catalog: Arc<ProductCatalog>,
    ) -> Self {
        Self {
            config,
            start_time: std::time::Instant::now(),
            fundamentals,
            catalog,
        }
    }

    /// Load the datasets named in the configuration.
    pub fn load(config: Arc<ServerConfig>) -> Result<Self, DatasetError> {
        let book = FundamentalsBook::load(config.fundamentals_file.as_deref())?;
        let catalog = ProductCatalog::load(config.catalog_file.as_deref())?;
        tracing::info!(
            tickers = book.len(),
            products = catalog.len(),
            "Reference datasets loaded"
        );
        Ok(Self::with_datasets(config, Arc::new(book), Arc::new(catalog)))
    }
}

/// Build the main application router by merging all route modules
pub fn build_router(state: AppState) -> Router {
    let cors_permissive = state.config.cors_permissive;

    let router = Router::new()
        .merge(health::routes())
        .merge(dcf::routes())
        .merge(vc::routes())
        .merge(elasticity::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
