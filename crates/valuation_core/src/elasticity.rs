//! Price-elasticity what-if simulation.
//!
//! Applies a percentage price change to one product and projects volume and
//! revenue using the point-elasticity definition:
//!
//! ```text
//! %ΔQ = ε · %ΔP
//! Q'  = max(0, Q · (1 + ε · pct/100))
//! R'  = P · (1 + pct/100) · Q'
//! ```
//!
//! The simulation is recomputed on every slider movement, so it is a pure
//! function of its four inputs.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ValuationError, ValuationResult};
use crate::validation::{computed, finite, non_negative, positive};

/// Elasticity below which a product counts as highly price sensitive.
pub const HIGH_ELASTICITY_THRESHOLD: f64 = -1.5;

/// Unit elasticity: the boundary between elastic and inelastic demand.
pub const UNIT_ELASTICITY: f64 = -1.0;

/// Minimum regression fit for a pricing recommendation to be acted on.
pub const MIN_CONFIDENT_R2: f64 = 0.5;

/// Reference data for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticityProduct {
    /// Product name or SKU
    #[serde(default)]
    pub product: String,
    /// Merchandising category ("Dairy", "Drinks", ...)
    #[serde(default)]
    pub category: String,
    /// Average observed selling price
    pub avg_price: f64,
    /// Estimated point elasticity of demand
    pub elasticity: f64,
    /// Current volume sold per period
    pub current_volume: f64,
    /// Goodness of fit of the elasticity regression
    pub r2: f64,
    /// Significance of the elasticity coefficient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
}

impl ElasticityProduct {
    /// Simulate a `pct_price_change` percent price move for this product.
    pub fn simulate(&self, pct_price_change: f64) -> ValuationResult<SimulationResult> {
        simulate(
            self.avg_price,
            self.current_volume,
            self.elasticity,
            pct_price_change,
        )
    }

    /// Demand sensitivity class of this product.
    pub fn sensitivity(&self) -> Sensitivity {
        Sensitivity::classify(self.elasticity)
    }

    /// Pricing recommendation for this product.
    pub fn recommended_action(&self) -> PriceAction {
        PriceAction::recommend(self.elasticity, self.r2)
    }

    /// Positive elasticity (Veblen-like behaviour); computed normally but
    /// worth highlighting in a dashboard.
    pub fn is_anomalous(&self) -> bool {
        self.elasticity > 0.0
    }
}

/// Projection produced by one price-change scenario.
///
/// Field names follow the dashboard contract (`newP`, `newQ`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// New price
    pub new_p: f64,
    /// New volume, floored at zero
    pub new_q: f64,
    /// New revenue
    pub new_rev: f64,
    /// Revenue before the price change
    pub base_rev: f64,
    /// Revenue change in currency units
    pub rev_diff: f64,
    /// Revenue change in percent of the base revenue (0 when base is 0)
    pub rev_diff_pct: f64,
    /// Volume change implied by the elasticity, in percent (before the floor)
    #[serde(rename = "deltaQPct")]
    pub delta_q_pct: f64,
}

/// Run a price-change scenario.
///
/// # Arguments
///
/// * `base_price` - Current price (must be > 0)
/// * `base_volume` - Current volume (must be >= 0)
/// * `elasticity` - Point elasticity; any finite value, positive included
/// * `pct_price_change` - Price change in percent (must be > -100)
///
/// # Example
///
/// ```
/// use valuation_core::elasticity::simulate;
///
/// let r = simulate(10.0, 1000.0, -2.0, 10.0).unwrap();
/// assert!((r.new_q - 800.0).abs() < 1e-9);
/// assert!((r.rev_diff_pct + 12.0).abs() < 1e-9);
/// ```
pub fn simulate(
    base_price: f64,
    base_volume: f64,
    elasticity: f64,
    pct_price_change: f64,
) -> ValuationResult<SimulationResult> {
    let base_price = positive("avg_price", base_price)?;
    let base_volume = non_negative("current_volume", base_volume)?;
    let elasticity = finite("elasticity", elasticity)?;
    let pct = finite("pct_price_change", pct_price_change)?;
    if pct <= -100.0 {
        return Err(ValuationError::validation(
            "pct_price_change",
            format!("must be greater than -100, got {}", pct),
        ));
    }

    let price_factor = pct / 100.0;
    let new_p = computed("new_price", base_price * (1.0 + price_factor))?;
    let delta_q = computed("delta_q", elasticity * price_factor)?;
    let new_q = computed("new_volume", (base_volume * (1.0 + delta_q)).max(0.0))?;
    let delta_q_pct = computed("delta_q_pct", delta_q * 100.0)?;

    let base_rev = computed("base_revenue", base_price * base_volume)?;
    let new_rev = computed("new_revenue", new_p * new_q)?;
    let rev_diff = computed("revenue_diff", new_rev - base_rev)?;
    let rev_diff_pct = if base_rev > 0.0 {
        computed("revenue_diff_pct", rev_diff / base_rev * 100.0)?
    } else {
        0.0
    };

    Ok(SimulationResult {
        new_p,
        new_q,
        new_rev,
        base_rev,
        rev_diff,
        rev_diff_pct,
        delta_q_pct,
    })
}

/// Demand sensitivity class derived from the elasticity sign and magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    /// ε < -1.5
    HighlyElastic,
    /// -1.5 <= ε < -1
    Elastic,
    /// -1 <= ε <= 0
    Inelastic,
    /// ε > 0
    Anomalous,
}

impl Sensitivity {
    /// Classify an elasticity estimate.
    pub fn classify(elasticity: f64) -> Self {
        if elasticity > 0.0 {
            Sensitivity::Anomalous
        } else if elasticity < HIGH_ELASTICITY_THRESHOLD {
            Sensitivity::HighlyElastic
        } else if elasticity < UNIT_ELASTICITY {
            Sensitivity::Elastic
        } else {
            Sensitivity::Inelastic
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Sensitivity::HighlyElastic => "Highly Elastic",
            Sensitivity::Elastic => "Elastic",
            Sensitivity::Inelastic => "Inelastic",
            Sensitivity::Anomalous => "Anomalous",
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pricing recommendation for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceAction {
    /// Demand is inelastic: a price rise grows revenue
    IncreasePrice,
    /// Demand is highly elastic: a price cut grows revenue
    DecreasePrice,
    /// No confident revenue gain either way
    Maintain,
}

impl PriceAction {
    /// Recommend an action from an elasticity estimate and its fit.
    pub fn recommend(elasticity: f64, r2: f64) -> Self {
        if r2.is_nan() || r2 < MIN_CONFIDENT_R2 {
            return PriceAction::Maintain;
        }
        match Sensitivity::classify(elasticity) {
            Sensitivity::Inelastic => PriceAction::IncreasePrice,
            Sensitivity::HighlyElastic => PriceAction::DecreasePrice,
            Sensitivity::Elastic | Sensitivity::Anomalous => PriceAction::Maintain,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            PriceAction::IncreasePrice => "Increase Price",
            PriceAction::DecreasePrice => "Decrease Price",
            PriceAction::Maintain => "Maintain",
        }
    }

    /// Whether the recommendation asks for a price change.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, PriceAction::Maintain)
    }
}

impl std::fmt::Display for PriceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Category selector for product listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every category
    #[default]
    All,
    /// One category, compared case-insensitively
    Category(String),
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Category(s.to_string()))
        }
    }
}

impl CategoryFilter {
    /// Whether `product` belongs to the selection.
    pub fn matches(&self, product: &ElasticityProduct) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(c) => product.category.eq_ignore_ascii_case(c),
        }
    }
}

/// Headline figures for a set of products.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    /// Number of products
    pub products_analyzed: usize,
    /// Products with ε below [`HIGH_ELASTICITY_THRESHOLD`]
    pub high_elasticity: usize,
    /// Products with an actionable recommendation
    pub optimization_opportunities: usize,
    /// Products with positive elasticity
    pub anomalous: usize,
    /// Mean regression fit; `None` for an empty set
    pub mean_r2: Option<f64>,
}

/// Summarise a product set.
pub fn summarize<'a, I>(products: I) -> CatalogSummary
where
    I: IntoIterator<Item = &'a ElasticityProduct>,
{
    let mut summary = CatalogSummary {
        products_analyzed: 0,
        high_elasticity: 0,
        optimization_opportunities: 0,
        anomalous: 0,
        mean_r2: None,
    };
    let mut r2_sum = 0.0;

    for product in products {
        summary.products_analyzed += 1;
        if product.sensitivity() == Sensitivity::HighlyElastic {
            summary.high_elasticity += 1;
        }
        if product.recommended_action().is_actionable() {
            summary.optimization_opportunities += 1;
        }
        if product.is_anomalous() {
            summary.anomalous += 1;
        }
        r2_sum += product.r2;
    }

    if summary.products_analyzed > 0 {
        summary.mean_r2 = Some(r2_sum / summary.products_analyzed as f64);
    }
    summary
}
