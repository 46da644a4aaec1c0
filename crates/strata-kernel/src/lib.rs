//! Numeric kernels for the strata stack: the BLAS/LAPACK-equivalent layer.
//!
//! Every routine works on column-major matrices stored in `&[Cell<T>]` slices with an
//! explicit leading dimension, so that callers holding aliasing views over shared
//! storage can hand them to a kernel without copying. Factorization routines follow the
//! LAPACK convention of returning an `info` code:
//!
//! * `0`: success,
//! * `> 0`: numerical failure (singular pivot, non-positive-definite minor, failed
//!   convergence), usually the 1-based position where it was detected,
//! * `< 0`: the `-info`-th argument was illegal.
//!
//! Kernels never panic on numerical trouble. They may allocate internal workspace.

use core::cell::Cell;
use strata::Scalar;

mod blas;
mod cholesky;
mod eigen;
mod lu;
mod qr;
mod svd;

pub use blas::{gemm, gemv, trsv};
pub use cholesky::potrf;
pub use eigen::{syev, sygv};
pub use lu::{getrf, getri};
pub use qr::{geqrf, ungqr};
pub use svd::{gesvd, SvdJob};

/// How an operand enters a product: as stored, transposed, conjugated, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Op {
    /// Use the matrix as stored.
    #[default]
    None,
    /// Use the ordinary transpose.
    Transpose,
    /// Use the element-wise conjugate (identity on real types).
    Conjugate,
    /// Use the conjugate transpose.
    ConjugateTranspose,
}

impl Op {
    /// Build from the transpose / conjugate flag pair.
    pub fn new(transpose: bool, conjugate: bool) -> Self {
        match (transpose, conjugate) {
            (false, false) => Self::None,
            (true, false) => Self::Transpose,
            (false, true) => Self::Conjugate,
            (true, true) => Self::ConjugateTranspose,
        }
    }

    /// Return whether rows and columns are swapped.
    pub fn is_transpose(&self) -> bool {
        matches!(self, Self::Transpose | Self::ConjugateTranspose)
    }

    /// Return whether elements are conjugated.
    pub fn is_conjugate(&self) -> bool {
        matches!(self, Self::Conjugate | Self::ConjugateTranspose)
    }

    /// Forward one of the arguments, depending on whether `self` transposes.
    pub fn forward<T>(&self, if_plain: T, if_transpose: T) -> T {
        if self.is_transpose() {
            if_transpose
        } else {
            if_plain
        }
    }

    /// Element `(i, j)` of `op(A)` for a column-major `A` with leading dimension `lda`.
    #[inline(always)]
    pub fn element<T: Scalar>(&self, a: &[Cell<T>], lda: usize, i: usize, j: usize) -> T {
        match self {
            Self::None => a[j * lda + i].get(),
            Self::Transpose => a[i * lda + j].get(),
            Self::Conjugate => a[j * lda + i].get().conj(),
            Self::ConjugateTranspose => a[i * lda + j].get().conj(),
        }
    }
}

/// Which triangle of a matrix a routine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uplo {
    Upper,
    Lower,
}

/// Whether a triangular matrix has an implicit unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diag {
    Unit,
    NonUnit,
}

#[inline(always)]
pub(crate) fn get<T: Copy>(a: &[Cell<T>], lda: usize, i: usize, j: usize) -> T {
    a[j * lda + i].get()
}

#[inline(always)]
pub(crate) fn set<T: Copy>(a: &[Cell<T>], lda: usize, i: usize, j: usize, value: T) {
    a[j * lda + i].set(value)
}

/// Fresh contiguous workspace of `len` cells, all set to `value`.
pub(crate) fn workspace<T: Copy>(len: usize, value: T) -> Vec<Cell<T>> {
    (0..len).map(|_| Cell::new(value)).collect()
}

/// Minimum slice length holding an `rows × cols` matrix with leading dimension `ld`.
#[inline]
pub(crate) fn required_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        ld * (cols - 1) + rows
    }
}
