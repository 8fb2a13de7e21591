//! Input guards shared by the engines.
//!
//! Each guard returns the checked value so call sites read as
//! `let shares = positive_denominator("shares", inputs.shares)?;`.

use crate::error::{ValuationError, ValuationResult};

/// Reject `NaN` and infinities.
#[inline]
pub fn finite(field: &'static str, value: f64) -> ValuationResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValuationError::validation(field, "must be a finite number"))
    }
}

/// Require `value > 0`, reported as a validation error.
#[inline]
pub fn positive(field: &'static str, value: f64) -> ValuationResult<f64> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValuationError::validation(
            field,
            format!("must be positive, got {}", value),
        ))
    }
}

/// Require `value >= 0`.
#[inline]
pub fn non_negative(field: &'static str, value: f64) -> ValuationResult<f64> {
    let value = finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ValuationError::validation(
            field,
            format!("must not be negative, got {}", value),
        ))
    }
}

/// Require `value > 0` for a quantity used as a denominator.
///
/// Unlike [`positive`] this reports a [`ValuationError::Division`].
#[inline]
pub fn positive_denominator(field: &'static str, value: f64) -> ValuationResult<f64> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValuationError::Division { field, value })
    }
}

/// Require a fraction in `[0, 1]`.
#[inline]
pub fn unit_fraction(field: &'static str, value: f64) -> ValuationResult<f64> {
    let value = finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValuationError::validation(
            field,
            format!("must lie in [0, 1], got {}", value),
        ))
    }
}

/// Require a whole percentage in `[0, 100]`.
#[inline]
pub fn percentage(field: &'static str, value: f64) -> ValuationResult<f64> {
    let value = finite(field, value)?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValuationError::validation(
            field,
            format!("must lie in [0, 100], got {}", value),
        ))
    }
}

/// Require a whole percentage in `[0, 100)`.
#[inline]
pub fn percentage_below_hundred(field: &'static str, value: f64) -> ValuationResult<f64> {
    let value = finite(field, value)?;
    if (0.0..100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValuationError::validation(
            field,
            format!("must lie in [0, 100), got {}", value),
        ))
    }
}

/// Require a rate whose compounding base `1 + rate` is positive.
#[inline]
pub fn growth_rate(field: &'static str, value: f64) -> ValuationResult<f64> {
    let value = finite(field, value)?;
    if value > -1.0 {
        Ok(value)
    } else {
        Err(ValuationError::validation(
            field,
            format!("must be greater than -1 (-100%), got {}", value),
        ))
    }
}

/// Turn a computed quantity into an error if it overflowed.
#[inline]
pub fn computed(quantity: &'static str, value: f64) -> ValuationResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValuationError::NonFinite { quantity })
    }
}
