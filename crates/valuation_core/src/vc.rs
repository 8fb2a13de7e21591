//! Venture-capital "top-down" valuation.
//!
//! Starts from the addressable market at the exit year and walks back to a
//! price per share today:
//!
//! ```text
//! revenue   = TAM · quota
//! nopat     = revenue · margin
//! exit      = nopat · multiple
//! pv        = exit / (1 + discount)^years
//! price     = pv / shares
//! target    = price · (1 - dilution)^years
//! ```
//!
//! Rates in this module are whole percentages (0-100), unlike the DCF engine
//! which takes fractions.

use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};
use crate::presets::Scenario;
use crate::validation::{
    computed, non_negative, percentage, percentage_below_hundred, positive,
    positive_denominator,
};

/// Runway below which the company is in immediate danger (years).
pub const RUNWAY_DANGER_YEARS: f64 = 1.0;

/// Runway below which fundraising should start (years).
pub const RUNWAY_WARNING_YEARS: f64 = 2.0;

/// Inputs of the VC method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VcInputs {
    /// Total addressable market at exit
    pub tam: f64,
    /// Market share captured (%)
    pub quota: f64,
    /// Operating margin (%)
    pub margem: f64,
    /// Exit multiple on NOPAT
    pub multiplo: f64,
    /// Annual discount rate (%)
    pub desconto: f64,
    /// Annual dilution (%)
    pub diluicao: f64,
    /// Exit year
    pub target_year: i32,
    /// Shares outstanding today
    pub acoes_atuais: f64,
    /// Cash on hand
    pub caixa_atual: f64,
    /// Annual cash burn
    pub burn_anual: f64,
}

impl VcInputs {
    /// Build inputs from a scenario preset plus the company-specific fields.
    pub fn from_scenario(
        scenario: Scenario,
        target_year: i32,
        acoes_atuais: f64,
        caixa_atual: f64,
        burn_anual: f64,
    ) -> Self {
        let p = scenario.preset();
        Self {
            tam: p.tam,
            quota: p.quota,
            margem: p.margem,
            multiplo: p.multiplo,
            desconto: p.desconto,
            diluicao: p.diluicao,
            target_year,
            acoes_atuais,
            caixa_atual,
            burn_anual,
        }
    }

    /// Replace all six market/return assumptions with the preset's values.
    ///
    /// The company-specific fields are left untouched.
    pub fn apply(&mut self, scenario: Scenario) {
        *self = Self::from_scenario(
            scenario,
            self.target_year,
            self.acoes_atuais,
            self.caixa_atual,
            self.burn_anual,
        );
    }
}

/// Cash runway health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunwayStatus {
    /// Less than one year of cash
    Danger,
    /// Less than two years of cash
    Warning,
    /// Two years or more
    Healthy,
}

impl RunwayStatus {
    /// Classify a runway expressed in years.
    pub fn from_years(runway_years: f64) -> Self {
        if runway_years < RUNWAY_DANGER_YEARS {
            RunwayStatus::Danger
        } else if runway_years < RUNWAY_WARNING_YEARS {
            RunwayStatus::Warning
        } else {
            RunwayStatus::Healthy
        }
    }
}

/// Valuation metrics at and before the exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VcMetrics {
    /// Price per share after dilution
    pub target_price: f64,
    /// Price per share ignoring dilution
    pub price_no_dilution: f64,
    /// Revenue at exit
    pub receita_alvo: f64,
    /// NOPAT at exit
    pub nopat_alvo: f64,
    /// Exit value
    pub exit_value: f64,
    /// Present value of the exit
    pub pv_equity: f64,
    /// Whole years until the exit
    pub years_to_exit: i32,
    /// Ownership retained after compounding dilution
    pub dilution_factor: f64,
    /// Share count implied by the dilution factor; omitted once the factor
    /// underflows to zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acoes_futuras: Option<f64>,
}

/// Cash runway assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Survival {
    /// Years of cash at the current burn
    pub runway: f64,
    /// Health classification of `runway`
    pub status: RunwayStatus,
    /// Annual burn used
    pub burn: f64,
    /// Cash used
    pub cash: f64,
}

/// Full VC valuation result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VcResult {
    /// Valuation metrics
    pub metrics: VcMetrics,
    /// Runway assessment
    pub survival: Survival,
}

/// Value a startup with the VC method.
///
/// `current_year` is the base year for the exit horizon; it is never read
/// from the clock so that identical inputs give identical results.
///
/// # Errors
///
/// * `InvalidRange` - `target_year <= current_year`
/// * `Division` - `acoes_atuais <= 0` or `burn_anual <= 0`
/// * `Validation` - any rate outside its percentage range, or a
///   non-positive `tam`/`multiplo`
///
/// # Example
///
/// ```
/// use valuation_core::presets::Scenario;
/// use valuation_core::vc::{compute, RunwayStatus, VcInputs};
///
/// let inputs = VcInputs::from_scenario(Scenario::Base, 2035, 1e7, 5e6, 2e6);
/// let result = compute(&inputs, 2026).unwrap();
/// assert_eq!(result.metrics.years_to_exit, 9);
/// assert_eq!(result.survival.status, RunwayStatus::Healthy);
/// ```
pub fn compute(inputs: &VcInputs, current_year: i32) -> ValuationResult<VcResult> {
    let tam = positive("tam", inputs.tam)?;
    let quota = percentage("quota", inputs.quota)?;
    let margem = percentage("margem", inputs.margem)?;
    let multiplo = positive("multiplo", inputs.multiplo)?;
    let desconto = percentage_below_hundred("desconto", inputs.desconto)?;
    let diluicao = percentage_below_hundred("diluicao", inputs.diluicao)?;

    let years = match inputs.target_year.checked_sub(current_year) {
        Some(years) if years > 0 => years,
        _ => {
            return Err(ValuationError::InvalidRange {
                field: "target_year",
                value: inputs.target_year as f64,
                reason: format!("must be after the current year {}", current_year),
            })
        }
    };

    let acoes_atuais = positive_denominator("acoes_atuais", inputs.acoes_atuais)?;
    let caixa_atual = non_negative("caixa_atual", inputs.caixa_atual)?;
    let burn_anual = positive_denominator("burn_anual", inputs.burn_anual)?;

    let receita_alvo = computed("receita_alvo", tam * (quota / 100.0))?;
    let nopat_alvo = computed("nopat_alvo", receita_alvo * (margem / 100.0))?;
    let exit_value = computed("exit_value", nopat_alvo * multiplo)?;

    let discount = (1.0 + desconto / 100.0).powi(years);
    let pv_equity = computed("pv_equity", exit_value / discount)?;
    let price_no_dilution = computed("price_no_dilution", pv_equity / acoes_atuais)?;

    let dilution_factor = (1.0 - diluicao / 100.0).powi(years);
    let target_price = price_no_dilution * dilution_factor;
    let acoes_futuras = Some(acoes_atuais / dilution_factor).filter(|n| n.is_finite());

    let runway = computed("runway", caixa_atual / burn_anual)?;

    Ok(VcResult {
        metrics: VcMetrics {
            target_price,
            price_no_dilution,
            receita_alvo,
            nopat_alvo,
            exit_value,
            pv_equity,
            years_to_exit: years,
            dilution_factor,
            acoes_futuras,
        },
        survival: Survival {
            runway,
            status: RunwayStatus::from_years(runway),
            burn: burn_anual,
            cash: caixa_atual,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base_inputs() -> VcInputs {
        VcInputs {
            tam: 1e11,
            quota: 10.0,
            margem: 20.0,
            multiplo: 15.0,
            desconto: 30.0,
            diluicao: 7.0,
            target_year: 2035,
            acoes_atuais: 10_000_000.0,
            caixa_atual: 5_000_000.0,
            burn_anual: 2_000_000.0,
        }
    }

    #[test]
    fn test_top_down_chain() {
        let r = compute(&base_inputs(), 2030).unwrap();
        assert_relative_eq!(r.metrics.receita_alvo, 1e10, max_relative = 1e-12);
        assert_relative_eq!(r.metrics.nopat_alvo, 2e9, max_relative = 1e-12);
        assert_relative_eq!(r.metrics.exit_value, 3e10, max_relative = 1e-12);
        assert_eq!(r.metrics.years_to_exit, 5);

        let pv = 3e10 / 1.3_f64.powi(5);
        assert_relative_eq!(r.metrics.pv_equity, pv, max_relative = 1e-12);
        assert_relative_eq!(r.metrics.price_no_dilution, pv / 1e7, max_relative = 1e-12);
        assert_relative_eq!(
            r.metrics.target_price,
            pv / 1e7 * 0.93_f64.powi(5),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_no_dilution_identity() {
        let mut inputs = base_inputs();
        inputs.diluicao = 0.0;
        let r = compute(&inputs, 2026).unwrap();
        assert_eq!(r.metrics.target_price, r.metrics.price_no_dilution);
        assert_eq!(r.metrics.dilution_factor, 1.0);
        assert_eq!(r.metrics.acoes_futuras, Some(inputs.acoes_atuais));
    }

    #[test]
    fn test_dilution_lowers_target_price() {
        let r = compute(&base_inputs(), 2026).unwrap();
        assert!(r.metrics.target_price < r.metrics.price_no_dilution);
        assert!(r.metrics.acoes_futuras.unwrap() > 10_000_000.0);
    }

    #[test]
    fn test_runway_thresholds() {
        let mut inputs = base_inputs();
        inputs.caixa_atual = 500_000.0;
        inputs.burn_anual = 600_000.0;
        let r = compute(&inputs, 2026).unwrap();
        assert_relative_eq!(r.survival.runway, 0.833333, epsilon = 1e-6);
        assert_eq!(r.survival.status, RunwayStatus::Danger);

        assert_eq!(RunwayStatus::from_years(1.0), RunwayStatus::Warning);
        assert_eq!(RunwayStatus::from_years(1.99), RunwayStatus::Warning);
        assert_eq!(RunwayStatus::from_years(2.0), RunwayStatus::Healthy);
    }

    #[test]
    fn test_target_year_must_be_in_future() {
        let mut inputs = base_inputs();
        inputs.target_year = 2026;
        match compute(&inputs, 2026) {
            Err(ValuationError::InvalidRange { field, .. }) => assert_eq!(field, "target_year"),
            other => panic!("Expected InvalidRange, got {:?}", other),
        }
    }

    #[test]
    fn test_extreme_years_rejected_without_overflow() {
        let mut inputs = base_inputs();
        inputs.target_year = 2031;
        assert!(matches!(
            compute(&inputs, i32::MIN),
            Err(ValuationError::InvalidRange { field: "target_year", .. })
        ));

        inputs.target_year = i32::MIN;
        assert!(matches!(
            compute(&inputs, i32::MAX),
            Err(ValuationError::InvalidRange { field: "target_year", .. })
        ));
    }

    #[test]
    fn test_full_dilution_keeps_valuation() {
        let mut inputs = base_inputs();
        inputs.diluicao = 99.0;
        inputs.target_year = 2226;
        let r = compute(&inputs, 2026).unwrap();

        assert_eq!(r.metrics.years_to_exit, 200);
        assert_eq!(r.metrics.dilution_factor, 0.0);
        assert_eq!(r.metrics.target_price, 0.0);
        assert!(r.metrics.acoes_futuras.is_none());

        let json = serde_json::to_value(r).unwrap();
        assert!(json["metrics"].get("acoes_futuras").is_none());
    }

    #[test]
    fn test_denominators_rejected() {
        let mut inputs = base_inputs();
        inputs.acoes_atuais = 0.0;
        assert!(matches!(
            compute(&inputs, 2026),
            Err(ValuationError::Division { field: "acoes_atuais", .. })
        ));

        let mut inputs = base_inputs();
        inputs.burn_anual = 0.0;
        assert!(matches!(
            compute(&inputs, 2026),
            Err(ValuationError::Division { field: "burn_anual", .. })
        ));
    }

    #[test]
    fn test_rate_domains() {
        let mut inputs = base_inputs();
        inputs.desconto = 100.0;
        assert!(matches!(
            compute(&inputs, 2026),
            Err(ValuationError::Validation { field: "desconto", .. })
        ));

        let mut inputs = base_inputs();
        inputs.quota = 120.0;
        assert!(matches!(
            compute(&inputs, 2026),
            Err(ValuationError::Validation { field: "quota", .. })
        ));

        let mut inputs = base_inputs();
        inputs.tam = -5.0;
        assert!(matches!(
            compute(&inputs, 2026),
            Err(ValuationError::Validation { field: "tam", .. })
        ));
    }

    #[test]
    fn test_apply_replaces_every_preset_field() {
        let mut inputs = base_inputs();
        inputs.tam = 1.0;
        inputs.quota = 99.0;
        inputs.apply(Scenario::Bull);

        let bull = Scenario::Bull.preset();
        assert_eq!(inputs.tam, bull.tam);
        assert_eq!(inputs.quota, bull.quota);
        assert_eq!(inputs.margem, bull.margem);
        assert_eq!(inputs.multiplo, bull.multiplo);
        assert_eq!(inputs.desconto, bull.desconto);
        assert_eq!(inputs.diluicao, bull.diluicao);
        // company fields survive
        assert_eq!(inputs.target_year, 2035);
        assert_eq!(inputs.acoes_atuais, 10_000_000.0);
    }

    #[test]
    fn test_bull_beats_bear() {
        let bear = VcInputs::from_scenario(Scenario::Bear, 2032, 1e7, 1e6, 1e6);
        let bull = VcInputs::from_scenario(Scenario::Bull, 2032, 1e7, 1e6, 1e6);
        let bear = compute(&bear, 2026).unwrap();
        let bull = compute(&bull, 2026).unwrap();
        assert!(bull.metrics.target_price > bear.metrics.target_price);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&RunwayStatus::Danger).unwrap();
        assert_eq!(json, "\"danger\"");
    }
}
