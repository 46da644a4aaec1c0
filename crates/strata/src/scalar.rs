use core::fmt;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_complex::Complex64;

/// Element type of every strata vector and matrix.
///
/// Implemented for `f32`, `f64` and `Complex64`. Routines are written once against this
/// trait and monomorphized per element type; conjugation is the identity on real types,
/// so the same code path serves real-symmetric and complex-Hermitian problems.
pub trait Scalar:
    Copy
    + Clone
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + Default
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + 'static
{
    /// The real type underlying this scalar (`Self` for real types).
    type Real: RealScalar;

    const ZERO: Self;
    const ONE: Self;
    const IS_COMPLEX: bool;

    fn from_real(re: Self::Real) -> Self;
    fn from_f64(v: f64) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;
    /// Imaginary part (zero for real types).
    fn im(self) -> Self::Real;
    /// Complex conjugate (identity for real types).
    fn conj(self) -> Self;
    /// Absolute value / complex modulus.
    fn modulus(self) -> Self::Real;
    /// Squared modulus, without the square root.
    fn modulus_sq(self) -> Self::Real;
    /// Multiply by a real factor.
    fn scale(self, factor: Self::Real) -> Self;

    fn sqrt(self) -> Self;
    fn recip(self) -> Self;
    fn is_finite(self) -> bool;
    fn is_nan(self) -> bool;
}

/// Real scalars: ordered, with machine constants.
pub trait RealScalar: Scalar<Real = Self> + PartialOrd {
    const TWO: Self;
    const HALF: Self;
    const EPSILON: Self;
    const MIN_POSITIVE: Self;
    const INFINITY: Self;
    const NAN: Self;

    fn abs(self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
    fn ln(self) -> Self;
    fn hypot(self, other: Self) -> Self;

    /// Distance from `|self|` to the next representable value above it.
    ///
    /// Used to derive default rank tolerances from the largest eigen/singular value.
    fn ulp(self) -> Self;

    fn to_f64(self) -> f64;
    fn from_usize(n: usize) -> Self;
}

macro_rules! impl_real {
    ($t:ty, $bits:ty) => {
        impl Scalar for $t {
            type Real = $t;

            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const IS_COMPLEX: bool = false;

            #[inline] fn from_real(re: Self) -> Self { re }
            #[inline] fn from_f64(v: f64) -> Self { v as $t }

            #[inline] fn re(self) -> Self { self }
            #[inline] fn im(self) -> Self { 0.0 }
            #[inline] fn conj(self) -> Self { self }
            #[inline] fn modulus(self) -> Self { <$t>::abs(self) }
            #[inline] fn modulus_sq(self) -> Self { self * self }
            #[inline] fn scale(self, factor: Self) -> Self { self * factor }

            #[inline] fn sqrt(self) -> Self { <$t>::sqrt(self) }
            #[inline] fn recip(self) -> Self { <$t>::recip(self) }
            #[inline] fn is_finite(self) -> bool { <$t>::is_finite(self) }
            #[inline] fn is_nan(self) -> bool { <$t>::is_nan(self) }
        }

        impl RealScalar for $t {
            const TWO: Self = 2.0;
            const HALF: Self = 0.5;
            const EPSILON: Self = <$t>::EPSILON;
            const MIN_POSITIVE: Self = <$t>::MIN_POSITIVE;
            const INFINITY: Self = <$t>::INFINITY;
            const NAN: Self = <$t>::NAN;

            #[inline] fn abs(self) -> Self { <$t>::abs(self) }
            #[inline] fn min(self, other: Self) -> Self { if self < other { self } else { other } }
            #[inline] fn max(self, other: Self) -> Self { if self > other { self } else { other } }
            #[inline] fn ln(self) -> Self { <$t>::ln(self) }
            #[inline] fn hypot(self, other: Self) -> Self { <$t>::hypot(self, other) }

            fn ulp(self) -> Self {
                let a = <$t>::abs(self);
                if !<$t>::is_finite(a) || a == <$t>::MAX {
                    return a;
                }
                <$t>::from_bits(a.to_bits() + 1 as $bits) - a
            }

            #[inline] fn to_f64(self) -> f64 { self as f64 }
            #[inline] fn from_usize(n: usize) -> Self { n as $t }
        }
    };
}

impl_real!(f32, u32);
impl_real!(f64, u64);

impl Scalar for Complex64 {
    type Real = f64;

    const ZERO: Self = Complex64::new(0.0, 0.0);
    const ONE: Self = Complex64::new(1.0, 0.0);
    const IS_COMPLEX: bool = true;

    #[inline] fn from_real(re: f64) -> Self { Complex64::new(re, 0.0) }
    #[inline] fn from_f64(v: f64) -> Self { Complex64::new(v, 0.0) }

    #[inline] fn re(self) -> f64 { self.re }
    #[inline] fn im(self) -> f64 { self.im }
    #[inline] fn conj(self) -> Self { Complex64::new(self.re, -self.im) }
    #[inline] fn modulus(self) -> f64 { self.re.hypot(self.im) }
    #[inline] fn modulus_sq(self) -> f64 { self.re * self.re + self.im * self.im }
    #[inline] fn scale(self, factor: f64) -> Self { self * factor }

    #[inline] fn sqrt(self) -> Self { Complex64::sqrt(self) }
    #[inline] fn recip(self) -> Self { Complex64::new(1.0, 0.0) / self }
    #[inline] fn is_finite(self) -> bool { self.re.is_finite() && self.im.is_finite() }
    #[inline] fn is_nan(self) -> bool { self.re.is_nan() || self.im.is_nan() }
}
