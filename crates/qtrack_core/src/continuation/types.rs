//! Core types for path continuation.
//!
//! A trajectory is the ordered record of one seed followed along a drive
//! path: one point per sample, plus the samples where the corrector failed.

use crate::complex::RootVector;
use crate::error::SolveFailure;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ordered drive values the continuation sweeps through.
pub type DrivePath = [Complex64];

/// Converts `(re, im)` pairs into drive values, preserving order.
pub fn drive_path_from_pairs(pairs: &[(f64, f64)]) -> Vec<Complex64> {
    pairs.iter().map(|&(re, im)| Complex64::new(re, im)).collect()
}

/// The solved root vector at one drive sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub drive: Complex64,
    pub roots: RootVector,
    pub converged: bool,
    pub iterations: usize,
    pub residual_norm: f64,
}

/// A drive value at which the corrector did not converge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BadPoint {
    /// Sample index within the drive path.
    pub index: usize,
    pub drive: Complex64,
    pub reason: SolveFailure,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<TrajectoryPoint>,
    pub bad_points: Vec<BadPoint>,
    /// Set when the run stopped before the end of the path.
    #[serde(default)]
    pub cancelled: bool,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Root vector at the first sample.
    pub fn start(&self) -> Option<&RootVector> {
        self.points.first().map(|p| &p.roots)
    }

    /// Root vector at the last computed sample.
    pub fn end(&self) -> Option<&RootVector> {
        self.points.last().map(|p| &p.roots)
    }

    pub fn all_converged(&self) -> bool {
        self.bad_points.is_empty()
    }

    /// The root vectors in path order.
    pub fn root_vectors(&self) -> impl Iterator<Item = &RootVector> + '_ {
        self.points.iter().map(|p| &p.roots)
    }

    /// Values of one root component along the path.
    pub fn component(&self, index: usize) -> Vec<Complex64> {
        self.points.iter().filter_map(|p| p.roots.get(index).copied()).collect()
    }
}

/// Cooperative cancellation flag shared between a caller and running continuations.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
