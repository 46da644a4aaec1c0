//! Dense linear algebra over strided views: Vector, Matrix, ops, decompositions.
//!
//! [`Vector`] and [`Matrix`] are cheap views (offset, dimensions, stride) over shared
//! reference-counted [`Storage`]. Sub-views, rows, columns and diagonals alias their
//! parent, so writing through one is visible through all of them. Views are
//! single-threaded (`!Send`).
//!
//! Operations in [`ops`] write into caller-supplied destinations and validate every
//! shape before touching them. The factorizations ([`Lu`], [`Cholesky`], [`Qr`],
//! [`Evd`], [`Gevd`], [`Svd`]) compute once in their constructor and expose read-only
//! results. Numerical work is delegated to `strata-kernel`.
//!
//! ```
//! use strata_la::{Lu, Matrix, Vector};
//!
//! let a = Matrix::from_rows(&[[2.0_f64, 1.0], [1.0, 3.0]])?;
//! let b = Vector::from_slice(&[5.0, 5.0])?;
//! let x = Lu::new(&a)?.solve(&b)?;
//! assert!((x.get(0)? - 2.0).abs() < 1e-12);
//! # Ok::<(), strata_la::Error>(())
//! ```

mod arith;
mod cholesky;
mod error;
mod evd;
mod gevd;
mod lu;
mod matrix;
pub mod ops;
mod qr;
pub mod scratch;
mod special;
pub mod stats;
mod storage;
mod svd;
mod vector;

pub use cholesky::Cholesky;
pub use error::{Error, Result};
pub use evd::Evd;
pub use gevd::Gevd;
pub use lu::Lu;
pub use matrix::{LineIter, Lines, Matrix};
pub use qr::Qr;
pub use scratch::Element;
pub use special::Special;
pub use storage::Storage;
pub use svd::Svd;
pub use vector::Vector;

pub use strata::{c64, Complex64, RealScalar, Scalar};
pub use strata_kernel::Op;
