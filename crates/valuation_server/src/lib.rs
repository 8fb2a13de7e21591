//! REST API server for the valuation engines
//!
//! Exposes the DCF, venture-capital and price-elasticity engines of
//! `valuation_core` over HTTP, together with the reference datasets the
//! dashboards query (company fundamentals and the product catalog).

pub mod config;
pub mod datasets;
pub mod error;
pub mod routes;
pub mod server;

pub use valuation_core;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
