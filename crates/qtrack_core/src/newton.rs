use crate::complex::{all_finite, checked_div, l2_norm, RootVector};
use crate::error::{SolveFailure, TrackError};
use crate::traits::RootSystem;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonSettings {
    /// Number of Newton steps per drive value.
    pub max_steps: usize,
    /// Opt-in early stop once ‖F‖₂ drops to this value. `None` always runs
    /// `max_steps` iterations.
    pub tolerance: Option<f64>,
    /// Pivots with a smaller modulus are treated as singular.
    pub pivot_epsilon: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_steps: 20,
            tolerance: None,
            pivot_epsilon: 1e-14,
        }
    }
}

impl NewtonSettings {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectorOutcome {
    /// Last finite iterate.
    pub roots: RootVector,
    pub converged: bool,
    pub iterations: usize,
    pub residual_norm: f64,
    pub failure: Option<SolveFailure>,
}

impl CorrectorOutcome {
    fn failed(roots: RootVector, iterations: usize, residual_norm: f64, failure: SolveFailure) -> Self {
        Self {
            roots,
            converged: false,
            iterations,
            residual_norm,
            failure: Some(failure),
        }
    }
}

/// Refines `initial` against `system` at a single drive value.
///
/// Each iteration solves `J·Δ = F` and updates `roots -= Δ`. Failures (a
/// singular Jacobian, a zero divisor, a non-finite iterate) end the solve and
/// are reported through `converged`/`failure`; this function never errors.
pub fn solve<S: RootSystem + ?Sized>(
    system: &S,
    initial: &[Complex64],
    drive: Complex64,
    settings: &NewtonSettings,
) -> CorrectorOutcome {
    let dim = initial.len();
    let mut roots = initial.to_vec();
    let mut residual = vec![Complex64::zero(); dim];
    system.residual(&roots, drive, &mut residual);

    if !all_finite(&roots) || !all_finite(&residual) {
        return CorrectorOutcome::failed(roots, 0, f64::NAN, SolveFailure::NonConvergence);
    }

    let mut residual_norm = l2_norm(&residual);
    let mut iterations = 0usize;
    let mut next_residual = vec![Complex64::zero(); dim];

    while iterations < settings.max_steps {
        if let Some(tol) = settings.tolerance {
            if residual_norm <= tol {
                break;
            }
        }

        let jacobian = system.jacobian(&roots, drive);
        let delta = match solve_linear_system(jacobian, &residual, settings.pivot_epsilon) {
            Ok(delta) => delta,
            Err(failure) => {
                debug!(iterations, ?failure, "linear solve failed during Newton iteration");
                return CorrectorOutcome::failed(roots, iterations, residual_norm, failure);
            }
        };

        let next: RootVector = roots.iter().zip(&delta).map(|(x, d)| x - d).collect();
        system.residual(&next, drive, &mut next_residual);
        if !all_finite(&next) || !all_finite(&next_residual) {
            debug!(iterations, "non-finite Newton iterate");
            return CorrectorOutcome::failed(
                roots,
                iterations,
                residual_norm,
                SolveFailure::NonConvergence,
            );
        }

        roots = next;
        std::mem::swap(&mut residual, &mut next_residual);
        residual_norm = l2_norm(&residual);
        iterations += 1;
    }

    let converged = settings.tolerance.map_or(true, |tol| residual_norm <= tol);
    CorrectorOutcome {
        roots,
        converged,
        iterations,
        residual_norm,
        failure: (!converged).then_some(SolveFailure::NonConvergence),
    }
}

/// Solves `J·Δ = rhs`. The scalar case is a direct quotient; larger systems
/// go through LU with partial pivoting.
pub fn solve_linear_system(
    jacobian: DMatrix<Complex64>,
    rhs: &[Complex64],
    pivot_epsilon: f64,
) -> Result<Vec<Complex64>, SolveFailure> {
    let dim = rhs.len();
    if jacobian.shape() != (dim, dim) {
        return Err(SolveFailure::SingularJacobian);
    }

    if dim == 1 {
        let pivot = jacobian[(0, 0)];
        if !pivot.is_finite() || pivot.norm() < pivot_epsilon {
            return Err(SolveFailure::SingularJacobian);
        }
        return checked_div(rhs[0], pivot)
            .map(|delta| vec![delta])
            .map_err(|err| match err {
                TrackError::DivisionByZero => SolveFailure::DivisionByZero,
                _ => SolveFailure::SingularJacobian,
            });
    }

    let lu = jacobian.lu();
    let degenerate = lu
        .u()
        .diagonal()
        .iter()
        .any(|p| !p.is_finite() || p.norm() < pivot_epsilon);
    if degenerate {
        return Err(SolveFailure::SingularJacobian);
    }

    let rhs = DVector::from_column_slice(rhs);
    lu.solve(&rhs)
        .map(|v| v.iter().cloned().collect())
        .ok_or(SolveFailure::SingularJacobian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::real;
    use crate::equation_system::{FixedParameters, ShiftedProductSystem};

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn unit_drive_converges_to_four_from_origin() {
        let system = ShiftedProductSystem::default();
        let outcome = solve(&system, &[c(0.0, 0.0)], real(1.0), &NewtonSettings::default());
        assert!(outcome.converged);
        assert_eq!(outcome.failure, None);
        assert_eq!(outcome.iterations, 20);
        assert!((outcome.roots[0] - real(4.0)).norm() < 1e-6);
    }

    #[test]
    fn residual_is_non_increasing_near_a_root() {
        let system = ShiftedProductSystem::default();
        let target = (17.0 - 73.0_f64.sqrt()) / 2.0;
        let start = [real(target + 0.3)];

        let mut previous = f64::INFINITY;
        for steps in 0..8 {
            let settings = NewtonSettings {
                max_steps: steps,
                ..NewtonSettings::default()
            };
            let outcome = solve(&system, &start, real(2.0), &settings);
            assert!(outcome.converged);
            assert!(
                outcome.residual_norm <= previous + 1e-12,
                "step {}: {} > {}",
                steps,
                outcome.residual_norm,
                previous
            );
            previous = outcome.residual_norm;
        }
        let outcome = solve(&system, &start, real(2.0), &NewtonSettings::default());
        assert!((outcome.roots[0] - real(target)).norm() < 1e-10);
    }

    #[test]
    fn singular_jacobian_is_reported_not_raised() {
        // d/du (u^2 - 17u + 54) vanishes at u = 8.5.
        let system = ShiftedProductSystem::default();
        let outcome = solve(&system, &[real(8.5)], real(2.0), &NewtonSettings::default());
        assert!(!outcome.converged);
        assert_eq!(outcome.failure, Some(SolveFailure::SingularJacobian));
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.roots, vec![real(8.5)]);
    }

    #[test]
    fn zero_pivot_without_epsilon_is_division_by_zero() {
        let system = ShiftedProductSystem::default();
        let settings = NewtonSettings {
            pivot_epsilon: 0.0,
            ..NewtonSettings::default()
        };
        let outcome = solve(&system, &[real(8.5)], real(2.0), &settings);
        assert_eq!(outcome.failure, Some(SolveFailure::DivisionByZero));
    }

    #[test]
    fn non_finite_seed_is_not_converged() {
        let system = ShiftedProductSystem::default();
        let outcome = solve(&system, &[c(f64::NAN, 0.0)], real(1.0), &NewtonSettings::default());
        assert!(!outcome.converged);
        assert_eq!(outcome.failure, Some(SolveFailure::NonConvergence));
    }

    #[test]
    fn tolerance_stops_early() {
        let system = ShiftedProductSystem::default();
        let settings = NewtonSettings::default().with_tolerance(1e-9);
        let outcome = solve(&system, &[c(0.0, 0.0)], real(1.0), &settings);
        assert!(outcome.converged);
        // The unit-drive residual is linear, so one step lands on the root.
        assert!(outcome.iterations <= 2);
        assert!(outcome.residual_norm <= 1e-9);
    }

    #[test]
    fn unmet_tolerance_reports_non_convergence() {
        let system = ShiftedProductSystem::default();
        let settings = NewtonSettings {
            max_steps: 1,
            tolerance: Some(1e-30),
            ..NewtonSettings::default()
        };
        let outcome = solve(&system, &[c(30.0, 5.0)], real(2.0), &settings);
        assert!(!outcome.converged);
        assert_eq!(outcome.failure, Some(SolveFailure::NonConvergence));
    }

    #[test]
    fn two_roots_converge_through_lu_path() {
        // At q = 1 the pair (4 - sqrt(2.5), 4 + sqrt(2.5)) solves the default family.
        let system = ShiftedProductSystem::default();
        let outcome = solve(&system, &[real(1.0), real(7.0)], real(1.0), &NewtonSettings::default());
        assert!(outcome.converged);
        let offset = 2.5_f64.sqrt();
        assert!((outcome.roots[0] - real(4.0 - offset)).norm() < 1e-9);
        assert!((outcome.roots[1] - real(4.0 + offset)).norm() < 1e-9);
        assert!(outcome.residual_norm < 1e-9);
    }

    #[test]
    fn translation_invariant_family_has_singular_jacobian() {
        // Without anchors the residual only sees x0 - x1.
        let params =
            FixedParameters::new(Vec::new(), Vec::new(), [real(1.0), real(2.0), real(3.0)]).unwrap();
        let system = ShiftedProductSystem::new(params).unwrap();
        let outcome = solve(&system, &[real(1.0), real(0.0)], real(2.0), &NewtonSettings::default());
        assert!(!outcome.converged);
        assert_eq!(outcome.failure, Some(SolveFailure::SingularJacobian));
        assert_eq!(outcome.roots, vec![real(1.0), real(0.0)]);
    }

    #[test]
    fn lu_path_solves_known_system() {
        let j = DMatrix::from_row_slice(2, 2, &[c(2.0, 0.0), c(1.0, 1.0), c(0.0, -1.0), c(3.0, 0.0)]);
        let x = [c(1.0, -2.0), c(0.5, 0.5)];
        let rhs = [j[(0, 0)] * x[0] + j[(0, 1)] * x[1], j[(1, 0)] * x[0] + j[(1, 1)] * x[1]];
        let delta = solve_linear_system(j, &rhs, 1e-14).unwrap();
        assert!((delta[0] - x[0]).norm() < 1e-12);
        assert!((delta[1] - x[1]).norm() < 1e-12);
    }

    #[test]
    fn lu_path_rejects_rank_deficient_matrix() {
        let j = DMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(2.0, 0.0), c(2.0, 0.0), c(4.0, 0.0)]);
        let err = solve_linear_system(j, &[c(1.0, 0.0), c(1.0, 0.0)], 1e-14).unwrap_err();
        assert_eq!(err, SolveFailure::SingularJacobian);
    }
}
