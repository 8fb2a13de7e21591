//! Price-elasticity endpoints
//!
//! - `POST /api/v1/elasticity/simulate`: what-if revenue for a price move
//! - `GET /api/v1/elasticity/products`: the catalog with its sensitivity
//!   class, pricing recommendation and headline summary

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use valuation_core::elasticity::{
    summarize, CatalogSummary, CategoryFilter, ElasticityProduct, PriceAction, Sensitivity,
    SimulationResult,
};

use super::AppState;
use crate::error::ApiError;

/// Body of `POST /api/v1/elasticity/simulate`
#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    pub product: ElasticityProduct,
    /// Price change in percent
    pub pct_price_change: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Catalog entry with its classification
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedProduct {
    #[serde(flatten)]
    pub product: ElasticityProduct,
    pub sensitivity: Sensitivity,
    pub action: PriceAction,
}

impl From<&ElasticityProduct> for ClassifiedProduct {
    fn from(product: &ElasticityProduct) -> Self {
        Self {
            sensitivity: product.sensitivity(),
            action: product.recommended_action(),
            product: product.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductListing {
    pub summary: CatalogSummary,
    pub products: Vec<ClassifiedProduct>,
}

/// Build the elasticity routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/elasticity/simulate", post(simulate_handler))
        .route("/api/v1/elasticity/products", get(products_handler))
}

/// POST /api/v1/elasticity/simulate
async fn simulate_handler(
    body: Result<Json<SimulateRequest>, JsonRejection>,
) -> Result<Json<SimulationResult>, ApiError> {
    let Json(request) = body?;

    let result = request.product.simulate(request.pct_price_change)?;

    tracing::debug!(
        product = %request.product.product,
        pct_price_change = request.pct_price_change,
        rev_diff_pct = result.rev_diff_pct,
        "Price change simulated"
    );

    Ok(Json(result))
}

/// GET /api/v1/elasticity/products
async fn products_handler(
    State(state): State<AppState>,
    query: Result<Query<ProductsQuery>, QueryRejection>,
) -> Result<Json<ProductListing>, ApiError> {
    let Query(query) = query?;

    let filter: CategoryFilter = match query.category.as_deref() {
        Some(category) => category.parse().unwrap_or_default(),
        None => CategoryFilter::All,
    };

    let products: Vec<ClassifiedProduct> = state.catalog.filter(&filter).map(Into::into).collect();
    let summary = summarize(products.iter().map(|p| &p.product));

    Ok(Json(ProductListing { summary, products }))
}
