use num_complex::Complex64;
use num_traits::{One, Zero};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Complex dual number for forward mode AD.
/// val: value
/// eps: derivative with respect to the seeded variable
///
/// Only the ring operations are implemented; the equation family is a
/// polynomial, so products and sums are all the Jacobian ever needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexDual {
    pub val: Complex64,
    pub eps: Complex64,
}

impl ComplexDual {
    pub fn new(val: Complex64, eps: Complex64) -> Self {
        Self { val, eps }
    }

    /// A value that does not depend on the seeded variable.
    pub fn constant(val: Complex64) -> Self {
        Self::new(val, Complex64::zero())
    }

    /// The seeded variable itself (unit tangent).
    pub fn variable(val: Complex64) -> Self {
        Self::new(val, Complex64::one())
    }

    /// Either `variable` or `constant` depending on `seeded`.
    pub fn seeded(val: Complex64, seeded: bool) -> Self {
        if seeded {
            Self::variable(val)
        } else {
            Self::constant(val)
        }
    }
}

impl Zero for ComplexDual {
    fn zero() -> Self {
        Self::constant(Complex64::zero())
    }
    fn is_zero(&self) -> bool {
        self.val.is_zero() && self.eps.is_zero()
    }
}

impl One for ComplexDual {
    fn one() -> Self {
        Self::constant(Complex64::one())
    }
}

impl Add for ComplexDual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.eps + rhs.eps)
    }
}

impl Sub for ComplexDual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.eps - rhs.eps)
    }
}

impl Mul for ComplexDual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.val * rhs.val, self.val * rhs.eps + self.eps * rhs.val)
    }
}

impl Neg for ComplexDual {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.val, -self.eps)
    }
}

// Mixed operations with plain constants.

impl Add<Complex64> for ComplexDual {
    type Output = Self;
    fn add(self, rhs: Complex64) -> Self {
        Self::new(self.val + rhs, self.eps)
    }
}

impl Sub<Complex64> for ComplexDual {
    type Output = Self;
    fn sub(self, rhs: Complex64) -> Self {
        Self::new(self.val - rhs, self.eps)
    }
}

impl Mul<Complex64> for ComplexDual {
    type Output = Self;
    fn mul(self, rhs: Complex64) -> Self {
        Self::new(self.val * rhs, self.eps * rhs)
    }
}

impl AddAssign for ComplexDual {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for ComplexDual {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for ComplexDual {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
