//! Venture-capital valuation endpoints
//!
//! `GET /api/v1/vc` runs the top-down VC method either on explicit market
//! assumptions or on a named scenario preset. Rates are whole percentages.

use axum::{
    extract::{rejection::QueryRejection, Query},
    response::Json,
    routing::get,
    Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use valuation_core::presets::{Scenario, ScenarioPreset};
use valuation_core::vc::{self, VcInputs, VcResult};
use valuation_core::{ValuationError, ValuationResult};

use super::AppState;
use crate::error::ApiError;

/// Query parameters of `GET /api/v1/vc`
///
/// The six market assumptions come either from `scenario` or from the query,
/// never from both.
#[derive(Debug, Clone, Deserialize)]
pub struct VcQuery {
    pub scenario: Option<String>,
    pub tam: Option<f64>,
    pub quota: Option<f64>,
    pub margem: Option<f64>,
    pub multiplo: Option<f64>,
    pub desconto: Option<f64>,
    pub diluicao: Option<f64>,
    pub target_year: i32,
    pub acoes_atuais: f64,
    pub caixa_atual: f64,
    pub burn_anual: f64,
    /// Base year of the exit horizon; the current UTC year when omitted
    pub current_year: Option<i32>,
}

impl VcQuery {
    fn assumptions(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("tam", self.tam),
            ("quota", self.quota),
            ("margem", self.margem),
            ("multiplo", self.multiplo),
            ("desconto", self.desconto),
            ("diluicao", self.diluicao),
        ]
    }

    fn scenario(&self) -> ValuationResult<Option<Scenario>> {
        match self.scenario.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.parse().map(Some),
            _ => Ok(None),
        }
    }

    /// Resolve the engine inputs.
    pub fn inputs(&self) -> ValuationResult<VcInputs> {
        if let Some(scenario) = self.scenario()? {
            if let Some((field, _)) = self.assumptions().into_iter().find(|(_, v)| v.is_some()) {
                return Err(ValuationError::validation(
                    field,
                    format!("cannot be combined with scenario '{}'", scenario),
                ));
            }
            return Ok(VcInputs::from_scenario(
                scenario,
                self.target_year,
                self.acoes_atuais,
                self.caixa_atual,
                self.burn_anual,
            ));
        }

        let required = |field: &'static str, value: Option<f64>| {
            value.ok_or_else(|| {
                ValuationError::validation(field, "required unless a scenario is given")
            })
        };

        Ok(VcInputs {
            tam: required("tam", self.tam)?,
            quota: required("quota", self.quota)?,
            margem: required("margem", self.margem)?,
            multiplo: required("multiplo", self.multiplo)?,
            desconto: required("desconto", self.desconto)?,
            diluicao: required("diluicao", self.diluicao)?,
            target_year: self.target_year,
            acoes_atuais: self.acoes_atuais,
            caixa_atual: self.caixa_atual,
            burn_anual: self.burn_anual,
        })
    }
}

/// One entry of `GET /api/v1/vc/presets`
#[derive(Debug, Clone, Serialize)]
pub struct PresetEntry {
    pub key: Scenario,
    #[serde(flatten)]
    pub preset: ScenarioPreset,
}

/// Build the VC routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/vc", get(vc_handler))
        .route("/api/v1/vc/presets", get(presets_handler))
}

/// GET /api/v1/vc
async fn vc_handler(
    query: Result<Query<VcQuery>, QueryRejection>,
) -> Result<Json<VcResult>, ApiError> {
    let Query(query) = query?;

    let inputs = query.inputs()?;
    let current_year = query.current_year.unwrap_or_else(|| Utc::now().year());
    let result = vc::compute(&inputs, current_year)?;

    tracing::debug!(
        scenario = query.scenario.as_deref().unwrap_or("custom"),
        years_to_exit = result.metrics.years_to_exit,
        target_price = result.metrics.target_price,
        runway_status = ?result.survival.status,
        "VC valuation computed"
    );

    Ok(Json(result))
}

/// GET /api/v1/vc/presets
async fn presets_handler() -> Json<Vec<PresetEntry>> {
    Json(
        Scenario::ALL
            .iter()
            .map(|s| PresetEntry {
                key: *s,
                preset: *s.preset(),
            })
            .collect(),
    )
}
