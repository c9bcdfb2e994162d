use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("Tolerance must be a finite positive number, got {0}")]
pub struct InvalidToleranceError(pub f64);

/// Absolute tolerance used for every fuzzy coordinate comparison.
///
/// Holding a `Tolerance` guarantees the wrapped value is finite and strictly
/// positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    pub fn new(epsilon: f64) -> Result<Self, InvalidToleranceError> {
        if epsilon.is_finite() && epsilon > 0.0 {
            Ok(Self(epsilon))
        } else {
            Err(InvalidToleranceError(epsilon))
        }
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Fuzzy equality of two scalars: `|a - b| <= epsilon`.
    #[inline]
    pub fn matches(self, a: f64, b: f64) -> bool {
        approx_eq(a, b, self.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE)
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = InvalidToleranceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tolerance> for f64 {
    fn from(value: Tolerance) -> Self {
        value.0
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e}", self.0)
    }
}

/// The single fuzzy comparison used throughout the crate.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}
