//! Complex arithmetic helpers on top of `num_complex`.
//!
//! All operations except division are the plain operator overloads of
//! [`Complex64`]. Division is routed through [`checked_div`] wherever a zero
//! divisor is possible so the failure surfaces as an error instead of NaN.

use crate::error::{Result, TrackError};
use num_traits::Zero;

pub use num_complex::Complex64;

/// A vector of unknowns, one complex value per root.
pub type RootVector = Vec<Complex64>;

/// Shorthand for a purely real complex value.
pub fn real(value: f64) -> Complex64 {
    Complex64::new(value, 0.0)
}

/// Divides `numerator` by `denominator`, refusing an exactly zero divisor.
pub fn checked_div(numerator: Complex64, denominator: Complex64) -> Result<Complex64> {
    if denominator.is_zero() {
        return Err(TrackError::DivisionByZero);
    }
    Ok(numerator / denominator)
}

pub fn all_finite(values: &[Complex64]) -> bool {
    values.iter().all(|c| c.is_finite())
}

/// Euclidean norm of a complex vector.
pub fn l2_norm(values: &[Complex64]) -> f64 {
    values.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt()
}
