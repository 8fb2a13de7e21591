//! Named scenario presets for the venture-capital engine.
//!
//! The set of presets is closed: `bear`, `base` and `bull`. Each preset is a
//! `'static` record and is applied to [`VcInputs`](crate::vc::VcInputs) as a
//! whole, replacing all six market/return assumptions at once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValuationError;

/// Immutable bundle of market and return assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioPreset {
    /// Display label
    pub label: &'static str,
    /// Total addressable market
    pub tam: f64,
    /// Market share captured (%)
    pub quota: f64,
    /// Operating margin (%)
    pub margem: f64,
    /// Exit multiple on NOPAT
    pub multiplo: f64,
    /// Annual VC discount rate (%)
    pub desconto: f64,
    /// Annual dilution (%)
    pub diluicao: f64,
}

const BEAR: ScenarioPreset = ScenarioPreset {
    label: "Pessimista (Bear)",
    tam: 50_000_000_000.0,
    quota: 5.0,
    margem: 10.0,
    multiplo: 10.0,
    desconto: 40.0,
    diluicao: 10.0,
};

const BASE: ScenarioPreset = ScenarioPreset {
    label: "Caso Base (Neutro)",
    tam: 100_000_000_000.0,
    quota: 10.0,
    margem: 20.0,
    multiplo: 15.0,
    desconto: 30.0,
    diluicao: 7.0,
};

const BULL: ScenarioPreset = ScenarioPreset {
    label: "Otimista (Bull)",
    tam: 250_000_000_000.0,
    quota: 25.0,
    margem: 30.0,
    multiplo: 25.0,
    desconto: 25.0,
    diluicao: 3.0,
};

/// Preset selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Pessimistic case
    Bear,
    /// Neutral case
    #[default]
    Base,
    /// Optimistic case
    Bull,
}

impl Scenario {
    /// Every scenario, in display order.
    pub const ALL: [Scenario; 3] = [Scenario::Bear, Scenario::Base, Scenario::Bull];

    /// Lookup key.
    pub fn key(&self) -> &'static str {
        match self {
            Scenario::Bear => "bear",
            Scenario::Base => "base",
            Scenario::Bull => "bull",
        }
    }

    /// The preset values for this scenario.
    pub fn preset(&self) -> &'static ScenarioPreset {
        match self {
            Scenario::Bear => &BEAR,
            Scenario::Base => &BASE,
            Scenario::Bull => &BULL,
        }
    }
}

impl FromStr for Scenario {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bear" => Ok(Scenario::Bear),
            "base" => Ok(Scenario::Base),
            "bull" => Ok(Scenario::Bull),
            other => Err(ValuationError::validation(
                "scenario",
                format!("unknown scenario '{}', expected bear, base or bull", other),
            )),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
