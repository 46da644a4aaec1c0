//! Element traits for dense linear algebra.
//!
//! Every vector, matrix and kernel in the stack is generic over [`Scalar`], which is
//! implemented for `f32`, `f64` and [`Complex64`]. Real-only quantities (norms,
//! eigenvalues of Hermitian matrices, singular values, tolerances) use the associated
//! [`Scalar::Real`] type, bounded by [`RealScalar`].

mod scalar;

pub use num_complex::Complex64;
pub use scalar::{RealScalar, Scalar};

/// Shorthand constructor for a `Complex64`.
#[inline]
pub const fn c64(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}
