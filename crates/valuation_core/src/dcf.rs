//! Discounted-cash-flow valuation.
//!
//! Projects free cash flow to the firm over a fixed five-year horizon,
//! capitalises the tail with a Gordon growth terminal value and walks the
//! enterprise value down to an intrinsic value per share.
//!
//! # Mathematical Background
//!
//! ```text
//! NOPAT   = EBIT · (1 - τ)
//! FCFF_0  = NOPAT + D&A - CapEx - ΔNWC
//! FCFF_t  = FCFF_0 · (1 + g1)^t                 t = 1..5
//! PV_t    = FCFF_t / (1 + WACC)^t
//! TV      = FCFF_5 · (1 + g2) / (WACC - g2)
//! EV      = Σ PV_t + TV / (1 + WACC)^5
//! Equity  = EV + Cash - Debt
//! IV      = Equity / Shares
//! ```
//!
//! All rates here are fractions (0.09 for 9%).

use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};
use crate::validation::{computed, finite, growth_rate, positive_denominator, unit_fraction};

/// Length of the explicit forecast horizon in years.
pub const PROJECTION_YEARS: i32 = 5;

/// Company fundamentals consumed by the DCF engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    /// Earnings before interest and taxes
    pub ebit: f64,
    /// Effective tax rate (fraction)
    pub tax_rate: f64,
    /// Depreciation and amortisation
    pub d_and_a: f64,
    /// Capital expenditure, as a positive outflow
    pub capex: f64,
    /// Change in net working capital
    pub change_nwc: f64,
    /// Cash and equivalents
    pub total_cash: f64,
    /// Total debt
    pub total_debt: f64,
    /// Shares outstanding
    pub shares: f64,
}

/// Per-field replacements for fetched fundamentals.
///
/// A present field replaces the fetched value for that field only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsOverrides {
    pub ebit: Option<f64>,
    pub tax_rate: Option<f64>,
    pub d_and_a: Option<f64>,
    pub capex: Option<f64>,
    pub change_nwc: Option<f64>,
    pub total_cash: Option<f64>,
    pub total_debt: Option<f64>,
    pub shares: Option<f64>,
}

impl FundamentalsOverrides {
    /// Whether no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the overrides onto `fetched`.
    ///
    /// Without fetched data every field must be overridden; the first missing
    /// one is reported. Capex is normalised to its absolute value because
    /// data providers report it as a negative cash flow.
    pub fn resolve(&self, fetched: Option<&Fundamentals>) -> ValuationResult<Fundamentals> {
        fn pick(
            field: &'static str,
            manual: Option<f64>,
            fetched: Option<f64>,
        ) -> ValuationResult<f64> {
            manual.or(fetched).ok_or_else(|| {
                ValuationError::validation(field, "required when no ticker data is available")
            })
        }

        Ok(Fundamentals {
            ebit: pick("ebit", self.ebit, fetched.map(|f| f.ebit))?,
            tax_rate: pick("tax_rate", self.tax_rate, fetched.map(|f| f.tax_rate))?,
            d_and_a: pick("d_and_a", self.d_and_a, fetched.map(|f| f.d_and_a))?,
            capex: pick("capex", self.capex, fetched.map(|f| f.capex))?.abs(),
            change_nwc: pick("change_nwc", self.change_nwc, fetched.map(|f| f.change_nwc))?,
            total_cash: pick("total_cash", self.total_cash, fetched.map(|f| f.total_cash))?,
            total_debt: pick("total_debt", self.total_debt, fetched.map(|f| f.total_debt))?,
            shares: pick("shares", self.shares, fetched.map(|f| f.shares))?,
        })
    }
}

/// Scenario rates of the DCF model (fractions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfRates {
    /// Near-term FCFF growth
    pub g1: f64,
    /// Discount rate
    pub wacc: f64,
    /// Perpetual growth after the horizon
    pub g2: f64,
}

impl Default for DcfRates {
    fn default() -> Self {
        Self {
            g1: 0.075,
            wacc: 0.09,
            g2: 0.025,
        }
    }
}

/// Complete DCF input record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationInputs {
    pub ebit: f64,
    pub tax_rate: f64,
    pub d_and_a: f64,
    pub capex: f64,
    pub change_nwc: f64,
    pub total_cash: f64,
    pub total_debt: f64,
    pub shares: f64,
    pub g1: f64,
    pub wacc: f64,
    pub g2: f64,
}

impl ValuationInputs {
    /// Combine fundamentals with scenario rates.
    pub fn new(f: &Fundamentals, rates: DcfRates) -> Self {
        Self {
            ebit: f.ebit,
            tax_rate: f.tax_rate,
            d_and_a: f.d_and_a,
            capex: f.capex,
            change_nwc: f.change_nwc,
            total_cash: f.total_cash,
            total_debt: f.total_debt,
            shares: f.shares,
            g1: rates.g1,
            wacc: rates.wacc,
            g2: rates.g2,
        }
    }
}

/// One year of the explicit forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    /// Year index, 1-based
    pub year: i32,
    /// Projected free cash flow to the firm
    pub fcff: f64,
    /// FCFF discounted to today
    pub pv: f64,
}

/// Enterprise-to-equity waterfall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationFlow {
    pub pv_projections: f64,
    pub terminal_value: f64,
    pub pv_terminal: f64,
    pub enterprise_value: f64,
    pub total_cash: f64,
    pub total_debt: f64,
    pub equity_value: f64,
    pub shares: f64,
}

/// Base-year operating metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfMetrics {
    pub nopat: f64,
    pub fcf_base: f64,
}

/// Result of a DCF valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    /// Equity value per share
    pub intrinsic_value: f64,
    /// Market price supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// `(intrinsic - price) / price`, present with a price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    /// Explicit forecast, chronological
    pub breakdown: Vec<ProjectionYear>,
    /// Enterprise-to-equity waterfall
    pub valuation_flow: ValuationFlow,
    /// Base-year NOPAT and FCFF
    pub metrics: DcfMetrics,
}

/// Run the DCF valuation.
///
/// # Arguments
///
/// * `inputs` - Fundamentals and rates; `wacc` must exceed `g2`
/// * `market_price` - Optional current share price for the margin of safety
///
/// # Errors
///
/// * `ModelDivergence` - `wacc <= g2`
/// * `Division` - `shares <= 0` or a supplied `market_price <= 0`
/// * `Validation` - non-finite fields, `tax_rate` outside `[0, 1]`, or a
///   rate at or below -100%
/// * `NonFinite` - an intermediate value overflowed
///
/// # Example
///
/// ```
/// use valuation_core::dcf::{compute, ValuationInputs};
///
/// let inputs = ValuationInputs {
///     ebit: 1000.0, tax_rate: 0.21, d_and_a: 100.0, capex: 150.0,
///     change_nwc: 20.0, total_cash: 500.0, total_debt: 300.0, shares: 100.0,
///     g1: 0.075, wacc: 0.09, g2: 0.025,
/// };
/// let result = compute(&inputs, Some(100.0)).unwrap();
/// assert!((result.metrics.fcf_base - 720.0).abs() < 1e-9);
/// assert_eq!(result.breakdown.len(), 5);
/// ```
pub fn compute(inputs: &ValuationInputs, market_price: Option<f64>) -> ValuationResult<DcfResult> {
    let ebit = finite("ebit", inputs.ebit)?;
    let tax_rate = unit_fraction("tax_rate", inputs.tax_rate)?;
    let d_and_a = finite("d_and_a", inputs.d_and_a)?;
    let capex = finite("capex", inputs.capex)?;
    let change_nwc = finite("change_nwc", inputs.change_nwc)?;
    let total_cash = finite("total_cash", inputs.total_cash)?;
    let total_debt = finite("total_debt", inputs.total_debt)?;
    let g1 = growth_rate("g1", inputs.g1)?;
    let wacc = growth_rate("wacc", inputs.wacc)?;
    let g2 = growth_rate("g2", inputs.g2)?;

    if wacc <= g2 {
        return Err(ValuationError::ModelDivergence { wacc, g2 });
    }
    let shares = positive_denominator("shares", inputs.shares)?;

    let nopat = ebit * (1.0 - tax_rate);
    let fcf_base = computed("fcf_base", nopat + d_and_a - capex - change_nwc)?;

    let mut breakdown = Vec::with_capacity(PROJECTION_YEARS as usize);
    let mut pv_projections = 0.0;
    for year in 1..=PROJECTION_YEARS {
        let fcff = computed("fcff", fcf_base * (1.0 + g1).powi(year))?;
        let pv = computed("pv", fcff / (1.0 + wacc).powi(year))?;
        pv_projections += pv;
        breakdown.push(ProjectionYear { year, fcff, pv });
    }
    let pv_projections = computed("pv_projections", pv_projections)?;

    let last_fcff = breakdown.last().map_or(fcf_base, |p| p.fcff);
    let terminal_value = computed("terminal_value", last_fcff * (1.0 + g2) / (wacc - g2))?;
    let pv_terminal = computed(
        "pv_terminal",
        terminal_value / (1.0 + wacc).powi(PROJECTION_YEARS),
    )?;

    let enterprise_value = computed("enterprise_value", pv_projections + pv_terminal)?;
    let equity_value = computed("equity_value", enterprise_value + total_cash - total_debt)?;
    let intrinsic_value = computed("intrinsic_value", equity_value / shares)?;

    let margin = match market_price {
        Some(price) => {
            let price = positive_denominator("price", price)?;
            Some(computed("margin", (intrinsic_value - price) / price)?)
        }
        None => None,
    };

    Ok(DcfResult {
        intrinsic_value,
        price: market_price,
        margin,
        breakdown,
        valuation_flow: ValuationFlow {
            pv_projections,
            terminal_value,
            pv_terminal,
            enterprise_value,
            total_cash,
            total_debt,
            equity_value,
            shares,
        },
        metrics: DcfMetrics { nopat, fcf_base },
    })
}
