//! Error types for the valuation engines.
//!
//! Every degenerate arithmetic path in the engines is checked before the
//! operation runs and reported through [`ValuationError`]; no engine returns
//! `NaN` or an infinite value.

use thiserror::Error;

/// Categorised valuation errors.
///
/// # Variants
/// - `Validation`: malformed or out-of-domain input
/// - `ModelDivergence`: terminal value undefined because `wacc <= g2`
/// - `Division`: a denominator was zero or negative
/// - `InvalidRange`: a range bound (such as the exit horizon) is empty
/// - `NonFinite`: an intermediate quantity overflowed
///
/// # Examples
/// ```
/// use valuation_core::ValuationError;
///
/// let err = ValuationError::ModelDivergence { wacc: 0.03, g2: 0.03 };
/// assert_eq!(err.kind(), "model_divergence");
/// assert!(err.to_string().contains("wacc"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// Input outside the engine's domain.
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Offending input field
        field: &'static str,
        /// Human-readable constraint that was violated
        reason: String,
    },

    /// Discount rate does not exceed perpetual growth.
    #[error("Model divergence: wacc ({wacc}) must be strictly greater than g2 ({g2})")]
    ModelDivergence {
        /// Discount rate supplied
        wacc: f64,
        /// Perpetual growth rate supplied
        g2: f64,
    },

    /// Non-positive denominator.
    #[error("Division error: {field} must be positive, got {value}")]
    Division {
        /// Field used as the denominator
        field: &'static str,
        /// Value supplied
        value: f64,
    },

    /// Empty or inverted range.
    #[error("Invalid range for {field} ({value}): {reason}")]
    InvalidRange {
        /// Field defining the range
        field: &'static str,
        /// Value supplied
        value: f64,
        /// Constraint that was violated
        reason: String,
    },

    /// A computed quantity is not finite.
    #[error("Numerical overflow: {quantity} is not finite")]
    NonFinite {
        /// Name of the computed quantity
        quantity: &'static str,
    },
}

impl ValuationError {
    /// Build a validation error for `field`.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ValuationError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Stable snake_case identifier of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ValuationError::Validation { .. } => "validation_error",
            ValuationError::ModelDivergence { .. } => "model_divergence",
            ValuationError::Division { .. } => "division_error",
            ValuationError::InvalidRange { .. } => "invalid_range",
            ValuationError::NonFinite { .. } => "non_finite",
        }
    }

    /// Input field (or computed quantity) the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValuationError::Validation { field, .. }
            | ValuationError::Division { field, .. }
            | ValuationError::InvalidRange { field, .. } => field,
            ValuationError::ModelDivergence { .. } => "wacc",
            ValuationError::NonFinite { quantity } => quantity,
        }
    }
}

/// Result alias used by every engine.
pub type ValuationResult<T> = Result<T, ValuationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ValuationError::validation("tax_rate", "must lie in [0, 1]");
        assert_eq!(format!("{}", err), "Invalid tax_rate: must lie in [0, 1]");
    }

    #[test]
    fn test_division_display() {
        let err = ValuationError::Division {
            field: "shares",
            value: 0.0,
        };
        assert_eq!(
            format!("{}", err),
            "Division error: shares must be positive, got 0"
        );
    }

    #[test]
    fn test_invalid_range_display() {
        let err = ValuationError::InvalidRange {
            field: "target_year",
            value: 2020.0,
            reason: "must be after current year 2026".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid range for target_year (2020): must be after current year 2026"
        );
    }

    #[test]
    fn test_kind_and_field() {
        let cases = [
            (ValuationError::validation("pct", "x"), "validation_error", "pct"),
            (
                ValuationError::ModelDivergence { wacc: 0.02, g2: 0.03 },
                "model_divergence",
                "wacc",
            ),
            (
                ValuationError::Division {
                    field: "burn_anual",
                    value: -1.0,
                },
                "division_error",
                "burn_anual",
            ),
            (
                ValuationError::NonFinite {
                    quantity: "terminal_value",
                },
                "non_finite",
                "terminal_value",
            ),
        ];

        for (err, kind, field) in cases {
            assert_eq!(err.kind(), kind);
            assert_eq!(err.field(), field);
        }
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = ValuationError::NonFinite { quantity: "pv" };
        let _: &dyn std::error::Error = &err;
    }
}
