//! Error types shared across the crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("complex division by zero")]
    DivisionByZero,

    #[error("Jacobian is singular")]
    SingularJacobian,

    #[error("Newton corrector did not converge")]
    NonConvergence,

    #[error("malformed seed input: {0}")]
    MalformedSeedInput(String),

    #[error("dimension mismatch for {what}: expected {expected}, got {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Why the corrector gave up on a sample. Recorded on every bad point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveFailure {
    DivisionByZero,
    SingularJacobian,
    NonConvergence,
}

impl From<SolveFailure> for TrackError {
    fn from(value: SolveFailure) -> Self {
        match value {
            SolveFailure::DivisionByZero => TrackError::DivisionByZero,
            SolveFailure::SingularJacobian => TrackError::SingularJacobian,
            SolveFailure::NonConvergence => TrackError::NonConvergence,
        }
    }
}
