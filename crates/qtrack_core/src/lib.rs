//! The `qtrack_core` crate is the numeric engine behind qtrack.
//! It follows the roots of a parametrized system of complex equations as the
//! drive parameter moves along a sampled curve.
//!
//! Key components:
//! - **Equation System**: the shifted-product family and its analytic Jacobian.
//! - **Newton**: fixed-step multivariate Newton corrector.
//! - **Continuation**: warm-started per-sample correction along a drive path.
//! - **Orchestrator**: one continuation per seed, run in parallel.
//! - **Seeds**: brace-notation import/export and the committed seed set.
pub mod autodiff;
pub mod complex;
pub mod config;
pub mod continuation;
pub mod equation_system;
pub mod error;
pub mod newton;
pub mod orchestrator;
pub mod seeds;
pub mod traits;

pub use complex::{Complex64, RootVector};
pub use continuation::{continue_path, BadPoint, CancellationToken, Trajectory, TrajectoryPoint};
pub use equation_system::{FixedParameters, ShiftedProductSystem};
pub use error::{SolveFailure, TrackError};
pub use newton::{solve, CorrectorOutcome, NewtonSettings};
pub use orchestrator::{run_trajectories, RunOptions, RunReport};
