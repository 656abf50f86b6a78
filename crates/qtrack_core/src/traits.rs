use nalgebra::DMatrix;
use num_complex::Complex64;

/// A square system of complex equations parametrized by one complex drive value.
///
/// Implementations must be pure: the same `(roots, drive)` always produces the
/// same output, so one instance can be shared by concurrent trajectories.
pub trait RootSystem {
    /// Evaluates the residual F(roots; drive).
    /// roots: current unknowns (length M)
    /// drive: the scalar parameter q
    /// out: buffer of length M to write F into
    fn residual(&self, roots: &[Complex64], drive: Complex64, out: &mut [Complex64]);

    /// Returns the M×M matrix of partial derivatives ∂F_i/∂roots_j.
    fn jacobian(&self, roots: &[Complex64], drive: Complex64) -> DMatrix<Complex64>;
}
