pub mod types;

pub use types::{
    drive_path_from_pairs, BadPoint, CancellationToken, DrivePath, Trajectory, TrajectoryPoint,
};

use crate::complex::RootVector;
use crate::newton::{self, NewtonSettings};
use crate::traits::RootSystem;
use num_complex::Complex64;
use tracing::{trace, warn};

/// Warm-start continuation of one seed along a drive path, one sample at a time.
///
/// Sample k is corrected starting from the root vector produced at sample
/// k−1 (the seed for k = 0). A failed sample is still recorded and still
/// seeds the next one; its drive value is kept as a bad point.
pub struct ContinuationRunner<'a, S: RootSystem + ?Sized> {
    system: &'a S,
    path: &'a DrivePath,
    settings: NewtonSettings,
    current: RootVector,
    trajectory: Trajectory,
}

impl<'a, S: RootSystem + ?Sized> ContinuationRunner<'a, S> {
    pub fn new(system: &'a S, seed: &[Complex64], path: &'a DrivePath, settings: NewtonSettings) -> Self {
        Self {
            system,
            path,
            settings,
            current: seed.to_vec(),
            trajectory: Trajectory {
                points: Vec::with_capacity(path.len()),
                ..Trajectory::default()
            },
        }
    }

    pub fn is_done(&self) -> bool {
        self.trajectory.points.len() >= self.path.len()
    }

    /// (completed samples, total samples)
    pub fn progress(&self) -> (usize, usize) {
        (self.trajectory.points.len(), self.path.len())
    }

    /// Corrects the next sample. Returns `false` once the path is exhausted.
    pub fn step(&mut self) -> bool {
        let index = self.trajectory.points.len();
        let Some(&drive) = self.path.get(index) else {
            return false;
        };

        let outcome = newton::solve(self.system, &self.current, drive, &self.settings);
        trace!(index, converged = outcome.converged, residual = outcome.residual_norm, "sample corrected");

        if let Some(reason) = outcome.failure {
            warn!(index, re = drive.re, im = drive.im, ?reason, "bad point");
            self.trajectory.bad_points.push(BadPoint { index, drive, reason });
        }

        self.current.clone_from(&outcome.roots);
        self.trajectory.points.push(TrajectoryPoint {
            drive,
            roots: outcome.roots,
            converged: outcome.converged,
            iterations: outcome.iterations,
            residual_norm: outcome.residual_norm,
        });
        true
    }

    /// Runs up to `batch` samples and returns how many were processed.
    pub fn run_steps(&mut self, batch: usize) -> usize {
        let mut done = 0;
        while done < batch && self.step() {
            done += 1;
        }
        done
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Finishes the run, marking the trajectory cancelled if samples remain.
    pub fn into_trajectory(self) -> Trajectory {
        let mut trajectory = self.trajectory;
        trajectory.cancelled = trajectory.points.len() < self.path.len();
        trajectory
    }
}

/// Continues `seed` over the whole `path`.
///
/// The cancellation token is polled between samples; a cancelled run returns
/// the samples computed so far.
pub fn continue_path<S: RootSystem + ?Sized>(
    system: &S,
    seed: &[Complex64],
    path: &DrivePath,
    settings: &NewtonSettings,
    cancel: Option<&CancellationToken>,
) -> Trajectory {
    let mut runner = ContinuationRunner::new(system, seed, path, *settings);
    while !runner.is_done() {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            break;
        }
        runner.step();
    }
    runner.into_trajectory()
}
