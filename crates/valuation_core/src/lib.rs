//! # valuation_core: Deterministic Valuation Engines
//!
//! Pure calculation engines behind the valuation dashboards:
//! - Discounted cash flow with an enterprise-to-equity waterfall (`dcf`)
//! - Venture-capital top-down valuation with dilution and runway (`vc`)
//! - Price-elasticity what-if simulation and product classification
//!   (`elasticity`)
//! - Named bear/base/bull presets for the VC engine (`presets`)
//!
//! Every engine is a synchronous function of its explicit inputs: no I/O, no
//! clock, no shared state. Degenerate inputs (a non-positive denominator,
//! `wacc <= g2`, an exit year in the past) are rejected with a
//! [`ValuationError`] before any arithmetic runs, so results never contain
//! `NaN` or infinities.
//!
//! ## Unit conventions
//!
//! The DCF engine takes rates as fractions (`0.09`), the VC engine as whole
//! percentages (`30.0`). The two conventions are kept as-is; callers convert
//! at their own boundary.
//!
//! ## Usage Examples
//!
//! ```rust
//! use valuation_core::elasticity::simulate;
//! use valuation_core::presets::Scenario;
//! use valuation_core::vc::{self, VcInputs};
//!
//! let sim = simulate(10.0, 1000.0, -2.0, 10.0).unwrap();
//! assert!((sim.new_rev - 8800.0).abs() < 1e-9);
//!
//! let inputs = VcInputs::from_scenario(Scenario::Bear, 2031, 1e7, 5e5, 6e5);
//! let result = vc::compute(&inputs, 2026).unwrap();
//! assert!(result.metrics.target_price < result.metrics.price_no_dilution);
//! ```

pub mod dcf;
pub mod elasticity;
pub mod error;
pub mod presets;
pub mod validation;
pub mod vc;

pub use error::{ValuationError, ValuationResult};
