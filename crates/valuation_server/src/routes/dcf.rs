//! Discounted-cash-flow endpoint
//!
//! `GET /api/v1/dcf` values a company either from the fundamentals source
//! (`ticker=...`), from manual figures (`manual_*`), or from a ticker with
//! selected fields overridden. Rates are fractions.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use valuation_core::dcf::{self, DcfRates, DcfResult, Fundamentals, FundamentalsOverrides, ValuationInputs};

use super::AppState;
use crate::datasets::{normalize_ticker, TickerData};
use crate::error::ApiError;

/// Query parameters of `GET /api/v1/dcf`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DcfQuery {
    pub ticker: Option<String>,
    pub g1: Option<f64>,
    pub wacc: Option<f64>,
    pub g2: Option<f64>,
    /// Market price; defaults to the ticker's last price
    pub price: Option<f64>,
    pub manual_ebit: Option<f64>,
    pub manual_tax: Option<f64>,
    pub manual_da: Option<f64>,
    pub manual_capex: Option<f64>,
    pub manual_nwc: Option<f64>,
    pub manual_cash: Option<f64>,
    pub manual_debt: Option<f64>,
    pub manual_shares: Option<f64>,
}

impl DcfQuery {
    fn rates(&self) -> DcfRates {
        let defaults = DcfRates::default();
        DcfRates {
            g1: self.g1.unwrap_or(defaults.g1),
            wacc: self.wacc.unwrap_or(defaults.wacc),
            g2: self.g2.unwrap_or(defaults.g2),
        }
    }

    fn overrides(&self) -> FundamentalsOverrides {
        FundamentalsOverrides {
            ebit: self.manual_ebit,
            tax_rate: self.manual_tax,
            d_and_a: self.manual_da,
            capex: self.manual_capex,
            change_nwc: self.manual_nwc,
            total_cash: self.manual_cash,
            total_debt: self.manual_debt,
            shares: self.manual_shares,
        }
    }

    fn ticker(&self) -> Option<String> {
        self.ticker
            .as_deref()
            .map(normalize_ticker)
            .filter(|t| !t.is_empty())
    }
}

/// DCF result with the resolved inputs echoed back
#[derive(Debug, Clone, Serialize)]
pub struct DcfResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Fundamentals after overrides
    pub inputs: Fundamentals,
    pub rates: DcfRates,
    #[serde(flatten)]
    pub result: DcfResult,
}

/// Build the DCF routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/dcf", get(dcf_handler))
}

/// GET /api/v1/dcf
async fn dcf_handler(
    State(state): State<AppState>,
    query: Result<Query<DcfQuery>, QueryRejection>,
) -> Result<Json<DcfResponse>, ApiError> {
    let Query(query) = query?;

    let ticker = query.ticker();
    let quote: Option<TickerData> = match &ticker {
        Some(symbol) => Some(
            state
                .fundamentals
                .lookup(symbol)
                .ok_or_else(|| ApiError::UpstreamData {
                    ticker: symbol.clone(),
                })?,
        ),
        None => None,
    };

    let fetched = quote.as_ref().map(TickerData::fundamentals);
    let inputs = query.overrides().resolve(fetched.as_ref())?;
    let rates = query.rates();
    let price = query.price.or(quote.as_ref().map(|q| q.price));

    let result = dcf::compute(&ValuationInputs::new(&inputs, rates), price)?;

    tracing::debug!(
        ticker = ticker.as_deref().unwrap_or("-"),
        wacc = rates.wacc,
        intrinsic_value = result.intrinsic_value,
        "DCF computed"
    );

    Ok(Json(DcfResponse {
        ticker,
        currency: quote.map(|q| q.currency),
        inputs,
        rates,
        result,
    }))
}
