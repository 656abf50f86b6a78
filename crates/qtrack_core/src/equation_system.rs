use crate::autodiff::ComplexDual;
use crate::complex::real;
use crate::error::{Result, TrackError};
use crate::traits::RootSystem;
use nalgebra::DMatrix;
use num_complex::Complex64;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Constants of the equation family.
///
/// `left_anchors` (AL) and `right_anchors` (AR) must have the same length N.
/// `shifts` are E1, E2, E3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedParameters {
    pub left_anchors: Vec<Complex64>,
    pub right_anchors: Vec<Complex64>,
    pub shifts: [Complex64; 3],
}

impl Default for FixedParameters {
    fn default() -> Self {
        Self {
            left_anchors: vec![real(6.0), real(5.0)],
            right_anchors: vec![real(3.0), real(2.0)],
            shifts: [real(2.0), real(3.0), real(-5.0)],
        }
    }
}

impl FixedParameters {
    pub fn new(
        left_anchors: Vec<Complex64>,
        right_anchors: Vec<Complex64>,
        shifts: [Complex64; 3],
    ) -> Result<Self> {
        let params = Self {
            left_anchors,
            right_anchors,
            shifts,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.left_anchors.len() != self.right_anchors.len() {
            return Err(TrackError::DimensionMismatch {
                what: "right anchor list",
                expected: self.left_anchors.len(),
                found: self.right_anchors.len(),
            });
        }
        Ok(())
    }

    /// Number of anchor pairs (N).
    pub fn anchor_count(&self) -> usize {
        self.left_anchors.len()
    }
}

/// The shifted-product equation family. For each root index i:
///
/// ```text
/// F_i = q · Π_k (x_i − AL_k) · Π_{j≠i} Π_m (x_i − x_j + E_m)
///         − Π_k (x_i − AR_k) · Π_{j≠i} Π_m (x_i − x_j − E_m)
/// ```
///
/// The system is immutable after construction and safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct ShiftedProductSystem {
    params: FixedParameters,
}

impl ShiftedProductSystem {
    pub fn new(params: FixedParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &FixedParameters {
        &self.params
    }

    /// Residual vector of length M.
    pub fn evaluate_residual(&self, roots: &[Complex64], drive: Complex64) -> Vec<Complex64> {
        let mut out = vec![Complex64::zero(); roots.len()];
        self.residual(roots, drive, &mut out);
        out
    }

    /// Full analytic Jacobian, diagonal included.
    pub fn evaluate_jacobian(&self, roots: &[Complex64], drive: Complex64) -> DMatrix<Complex64> {
        self.jacobian(roots, drive)
    }

    fn residual_row(&self, roots: &[Complex64], drive: Complex64, i: usize) -> Complex64 {
        let xi = roots[i];
        let mut left = drive;
        let mut right = Complex64::one();

        for (al, ar) in self.params.left_anchors.iter().zip(&self.params.right_anchors) {
            left *= xi - al;
            right *= xi - ar;
        }

        for (k, &xk) in roots.iter().enumerate() {
            if k == i {
                continue;
            }
            let diff = xi - xk;
            for shift in &self.params.shifts {
                left *= diff + shift;
                right *= diff - shift;
            }
        }

        left - right
    }

    /// Row `i` of the residual carried as a dual number seeded on root `j`.
    /// `.val` is F_i and `.eps` is ∂F_i/∂x_j.
    fn row_with_tangent(
        &self,
        roots: &[Complex64],
        drive: Complex64,
        i: usize,
        j: usize,
    ) -> ComplexDual {
        let xi = ComplexDual::seeded(roots[i], i == j);
        let mut left = ComplexDual::constant(drive);
        let mut right = ComplexDual::one();

        for (al, ar) in self.params.left_anchors.iter().zip(&self.params.right_anchors) {
            left *= xi - *al;
            right *= xi - *ar;
        }

        for (k, &root) in roots.iter().enumerate() {
            if k == i {
                continue;
            }
            // Off the diagonal only the factors pairing i with j carry a tangent.
            if i != j && k != j {
                let diff = xi.val - root;
                let (l, r) = self.shift_products(diff);
                left = left * l;
                right = right * r;
                continue;
            }
            let diff = xi - ComplexDual::seeded(root, k == j);
            for shift in &self.params.shifts {
                left *= diff + *shift;
                right *= diff - *shift;
            }
        }

        left - right
    }

    fn shift_products(&self, diff: Complex64) -> (Complex64, Complex64) {
        self.params
            .shifts
            .iter()
            .fold((Complex64::one(), Complex64::one()), |(l, r), shift| {
                (l * (diff + shift), r * (diff - shift))
            })
    }
}

impl RootSystem for ShiftedProductSystem {
    fn residual(&self, roots: &[Complex64], drive: Complex64, out: &mut [Complex64]) {
        for i in 0..roots.len() {
            out[i] = self.residual_row(roots, drive, i);
        }
    }

    fn jacobian(&self, roots: &[Complex64], drive: Complex64) -> DMatrix<Complex64> {
        let dim = roots.len();
        DMatrix::from_fn(dim, dim, |i, j| self.row_with_tangent(roots, drive, i, j).eps)
    }
}
