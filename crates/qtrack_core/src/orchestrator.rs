//! Runs one continuation per seed and gathers the results.
//!
//! Trajectories are independent: the system, drive path and settings are
//! shared read-only and every worker owns its own root vector, so seeds are
//! fanned out over a rayon pool without locks. Results come back in seed order.

use crate::complex::RootVector;
use crate::continuation::{continue_path, CancellationToken, DrivePath, Trajectory};
use crate::error::{Result, TrackError};
use crate::newton::NewtonSettings;
use crate::seeds::format_seeds;
use crate::traits::RootSystem;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Upper bound on concurrently running trajectories. `None` uses the
    /// global rayon pool; `Some(1)` runs seeds one after another.
    pub max_concurrency: Option<usize>,
}

/// First and last root vector of one trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSnapshot {
    pub start: RootVector,
    pub end: RootVector,
}

/// Brace-notation text of the start and end root vectors of every seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointExport {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// One trajectory per seed, in seed order.
    pub trajectories: Vec<Trajectory>,
    /// Number of roots per seed (M).
    pub dimension: usize,
}

impl RunReport {
    /// Start/end snapshot per seed; `None` for a trajectory with no samples.
    pub fn snapshots(&self) -> Vec<Option<SeedSnapshot>> {
        self.trajectories
            .iter()
            .map(|t| {
                Some(SeedSnapshot {
                    start: t.start()?.clone(),
                    end: t.end()?.clone(),
                })
            })
            .collect()
    }

    /// Drive values of every bad point across all seeds, in seed order.
    pub fn bad_points(&self) -> Vec<Complex64> {
        self.trajectories
            .iter()
            .flat_map(|t| t.bad_points.iter().map(|b| b.drive))
            .collect()
    }

    pub fn all_converged(&self) -> bool {
        self.trajectories.iter().all(Trajectory::all_converged)
    }

    pub fn cancelled(&self) -> bool {
        self.trajectories.iter().any(|t| t.cancelled)
    }

    /// Formats the start and end seed sets for export.
    ///
    /// Fails with `DimensionMismatch` if any trajectory is empty, which is
    /// the case for an empty drive path.
    pub fn export_endpoints(&self) -> Result<EndpointExport> {
        let mut starts = Vec::with_capacity(self.trajectories.len());
        let mut ends = Vec::with_capacity(self.trajectories.len());
        for snapshot in self.snapshots() {
            let snapshot = snapshot.ok_or(TrackError::DimensionMismatch {
                what: "trajectory samples",
                expected: 1,
                found: 0,
            })?;
            starts.push(snapshot.start);
            ends.push(snapshot.end);
        }
        Ok(EndpointExport {
            start: format_seeds(&starts),
            end: format_seeds(&ends),
        })
    }
}

/// Checks that every seed has the same, non-zero number of roots and returns it.
pub fn validate_seeds(seeds: &[RootVector]) -> Result<usize> {
    let Some(first) = seeds.first() else {
        return Ok(0);
    };
    let dim = first.len();
    if dim == 0 {
        return Err(TrackError::DimensionMismatch {
            what: "seed",
            expected: 1,
            found: 0,
        });
    }
    if let Some(bad) = seeds.iter().find(|s| s.len() != dim) {
        return Err(TrackError::DimensionMismatch {
            what: "seed",
            expected: dim,
            found: bad.len(),
        });
    }
    Ok(dim)
}

/// Continues every seed along `path`.
///
/// Seeds are validated before any work starts. Solver failures never abort
/// the run; they show up as bad points on the affected trajectory.
#[instrument(skip_all, fields(seeds = seeds.len(), samples = path.len()))]
pub fn run_trajectories<S: RootSystem + Sync + ?Sized>(
    system: &S,
    seeds: &[RootVector],
    path: &DrivePath,
    settings: &NewtonSettings,
    options: &RunOptions,
    cancel: Option<&CancellationToken>,
) -> Result<RunReport> {
    let dimension = validate_seeds(seeds)?;
    info!(dimension, "starting trajectory run");

    let run_one = |seed: &RootVector| continue_path(system, seed, path, settings, cancel);

    let trajectories: Vec<Trajectory> = match options.max_concurrency {
        Some(0) | Some(1) => seeds.iter().map(run_one).collect(),
        Some(limit) => match rayon::ThreadPoolBuilder::new().num_threads(limit).build() {
            Ok(pool) => pool.install(|| seeds.par_iter().map(run_one).collect::<Vec<_>>()),
            Err(err) => {
                warn!(%err, "failed to build worker pool, running sequentially");
                seeds.iter().map(run_one).collect()
            }
        },
        None => seeds.par_iter().map(run_one).collect::<Vec<_>>(),
    };

    let report = RunReport {
        trajectories,
        dimension,
    };
    info!(
        bad_points = report.bad_points().len(),
        cancelled = report.cancelled(),
        "trajectory run finished"
    );
    Ok(report)
}
