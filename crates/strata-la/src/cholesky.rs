use crate::ops::check_square;
use crate::scratch::{Element, Scratch};
use crate::{Error, Matrix, Result, Vector};
use strata::{RealScalar, Scalar};
use strata_kernel::{potrf, trsv, Diag, Op, Uplo};
use tracing::debug;

/// Cholesky decomposition A = L·Lᴴ of a Hermitian positive-definite matrix.
///
/// Only the lower triangle of A is read.
pub struct Cholesky<T> {
    l: Matrix<T>,
}

impl<T: Element> Cholesky<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        check_square("Cholesky", a)?;
        let n = a.nrows();
        let l = a.copy();
        Error::kernel("potrf", potrf(Uplo::Lower, n, l.cells(), l.stride()))?;
        for c in 1..n {
            for r in 0..c {
                l.put(r, c, T::ZERO);
            }
        }
        debug!(n, "cholesky factorization");
        Ok(Self { l })
    }

    /// The lower-triangular factor L, with a positive real diagonal.
    pub fn l(&self) -> &Matrix<T> {
        &self.l
    }

    /// (Π diag L)²
    pub fn determinant(&self) -> T::Real {
        let p = self.l.diagonal().iter().fold(T::Real::ONE, |acc, d| acc * d.re());
        p * p
    }

    /// 2 · Σ ln diag L, finite even where the determinant would overflow.
    pub fn log_determinant(&self) -> T::Real {
        let s = self.l.diagonal().iter().fold(T::Real::ZERO, |acc, d| acc + d.re().ln());
        s + s
    }

    /// Solve A·x = b.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let x = Vector::new(self.l.nrows())?;
        self.solve_into(b, &x)?;
        Ok(x)
    }

    /// Solve A·x = b into `dst`, which may alias `b`.
    pub fn solve_into(&self, b: &Vector<T>, dst: &Vector<T>) -> Result<()> {
        let n = self.l.nrows();
        if b.len() != n {
            return Err(Error::dims("Cholesky::solve right-hand side", n, b.len()));
        }
        if dst.len() != n {
            return Err(Error::dims("Cholesky::solve destination", n, dst.len()));
        }

        let scratch = Scratch::<T>::acquire(n);
        let x = scratch.vector(n);
        b.copy_to(&x)?;
        let l = &self.l;
        for op in [Op::None, Op::ConjugateTranspose] {
            let info = trsv(Uplo::Lower, op, Diag::NonUnit, n, l.cells(), l.stride(), x.cells(), 1);
            Error::kernel("trsv", info)?;
        }
        x.copy_to(dst)
    }
}
