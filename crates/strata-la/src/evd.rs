use crate::ops::check_square;
use crate::scratch::{Element, Scratch};
use crate::{Error, Matrix, Result, Vector};
use strata::{RealScalar, Scalar};
use strata_kernel::{gemv, syev, Op};
use tracing::debug;

/// Eigendecomposition of a Hermitian matrix: A = V·diag(D)·Vᴴ.
///
/// Only the lower triangle of A is read. Eigenvalues are real and ascending; `V` is
/// unitary with the matching eigenvectors as columns.
pub struct Evd<T: Scalar> {
    d: Vector<T::Real>,
    v: Matrix<T>,
}

impl<T: Element> Evd<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        check_square("Evd", a)?;
        let n = a.nrows();
        let v = a.copy();
        let mut w = vec![T::Real::ZERO; n];
        Error::kernel("syev", syev(n, v.cells(), v.stride(), &mut w))?;
        debug!(n, "hermitian eigendecomposition");
        Ok(Self { d: Vector::from_vec(w)?, v })
    }

    /// Eigenvalues, ascending.
    pub fn d(&self) -> &Vector<T::Real> {
        &self.d
    }

    /// Eigenvectors as columns.
    pub fn v(&self) -> &Matrix<T> {
        &self.v
    }

    /// Π D
    pub fn determinant(&self) -> T::Real {
        self.d.iter().fold(T::Real::ONE, |acc, x| acc * x)
    }

    /// Σ ln D; NaN when an eigenvalue is negative.
    pub fn log_determinant(&self) -> T::Real {
        self.d.iter().fold(T::Real::ZERO, |acc, x| acc + x.ln())
    }

    /// Number of eigenvalues above `tolerance` (default `ulp(max |D|) · n`).
    pub fn rank(&self, tolerance: Option<T::Real>) -> usize {
        let tol = tolerance.unwrap_or_else(|| {
            let max = self.d.iter().fold(T::Real::ZERO, |acc, x| acc.max(x.abs()));
            max.ulp() * T::Real::from_usize(self.d.len())
        });
        self.d.iter().filter(|&x| x > tol).count()
    }

    /// Solve A·x = b as V·diag(1/D)·Vᴴ·b.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let x = Vector::new(self.d.len())?;
        self.solve_into(b, &x)?;
        Ok(x)
    }

    /// Solve into `dst`, which may alias `b`. A zero eigenvalue is reported as
    /// [`Error::IllConditioned`].
    pub fn solve_into(&self, b: &Vector<T>, dst: &Vector<T>) -> Result<()> {
        let n = self.d.len();
        if b.len() != n {
            return Err(Error::dims("Evd::solve right-hand side", n, b.len()));
        }
        if dst.len() != n {
            return Err(Error::dims("Evd::solve destination", n, dst.len()));
        }
        if let Some(i) = self.d.iter().position(|x| x == T::Real::ZERO) {
            return Err(Error::IllConditioned { routine: "syev", info: i as i32 + 1 });
        }

        let scratch = Scratch::<T>::acquire(2 * n);
        let y = scratch.vector(n);
        let x = Vector::from_parts(scratch.storage().clone(), n, n, 1);
        let v = &self.v;
        gemv(
            Op::ConjugateTranspose,
            n,
            n,
            T::ONE,
            v.cells(),
            v.stride(),
            b.cells(),
            b.stride(),
            T::ZERO,
            y.cells(),
            1,
        );
        for (i, d) in self.d.iter().enumerate() {
            y.put(i, y.at(i).scale(d.recip()));
        }
        gemv(Op::None, n, n, T::ONE, v.cells(), v.stride(), y.cells(), 1, T::ZERO, x.cells(), 1);
        x.copy_to(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;
    use approx::assert_abs_diff_eq;
    use strata::c64;

    #[test]
    fn reconstructs_symmetric() {
        let a = Matrix::from_rows(&[[4.0, 1.0, 2.0], [1.0, 3.0, 0.5], [2.0, 0.5, 6.0]]).unwrap();
        let evd = Evd::new(&a).unwrap();
        let d = evd.d().to_vec();
        assert!(d.windows(2).all(|w| w[0] <= w[1]));

        // V·diag(D)·Vᵀ
        let vd = evd.v().copy();
        for (j, col) in vd.cols().into_iter().enumerate() {
            ops::mul_scalar(&col, d[j], &col).unwrap();
        }
        let back = Matrix::new(3, 3).unwrap();
        ops::mul_mat(&vd, evd.v(), &back, Op::None, Op::Transpose).unwrap();
        for (x, y) in back.iter().zip(a.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-11);
        }
        assert_abs_diff_eq!(evd.determinant(), ops::determinant(&a).unwrap(), epsilon = 1e-10);
    }

    #[test]
    fn solve_and_rank() {
        let a = Matrix::from_rows(&[[2.0, 1.0], [1.0, 2.0]]).unwrap();
        let evd = Evd::new(&a).unwrap();
        assert_abs_diff_eq!(evd.d().get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(evd.d().get(1).unwrap(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(evd.log_determinant(), 3.0_f64.ln(), epsilon = 1e-12);
        assert_eq!(evd.rank(None), 2);
        assert_eq!(evd.rank(Some(2.0)), 1);

        let b = Vector::from_slice(&[3.0, 3.0]).unwrap();
        let x = evd.solve(&b).unwrap();
        assert_abs_diff_eq!(x.get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get(1).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_solve_fails() {
        let a = Matrix::from_rows(&[[0.0, 0.0], [0.0, 1.0]]).unwrap();
        let evd = Evd::new(&a).unwrap();
        assert_eq!(evd.rank(None), 1);
        let b = Vector::from_slice(&[1.0, 1.0]).unwrap();
        assert!(matches!(evd.solve(&b), Err(Error::IllConditioned { routine: "syev", info: 1 })));
    }

    #[test]
    fn complex_hermitian() {
        let a = Matrix::from_rows(&[
            [c64(2.0, 0.0), c64(1.0, -1.0)],
            [c64(1.0, 1.0), c64(3.0, 0.0)],
        ])
        .unwrap();
        let evd = Evd::new(&a).unwrap();
        assert_abs_diff_eq!(evd.d().get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(evd.d().get(1).unwrap(), 4.0, epsilon = 1e-12);

        let av = Matrix::new(2, 2).unwrap();
        ops::mul_mat(&a, evd.v(), &av, Op::None, Op::None).unwrap();
        for j in 0..2 {
            let lambda = evd.d().get(j).unwrap();
            for i in 0..2 {
                let want = evd.v().get(i, j).unwrap() * c64(lambda, 0.0);
                let got = av.get(i, j).unwrap();
                assert_abs_diff_eq!(got.re, want.re, epsilon = 1e-12);
                assert_abs_diff_eq!(got.im, want.im, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn rejects_non_square() {
        let a = Matrix::<f64>::new(2, 3).unwrap();
        assert!(matches!(Evd::new(&a), Err(Error::DimensionMismatch(_))));
    }
}
