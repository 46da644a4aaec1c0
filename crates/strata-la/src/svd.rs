use crate::scratch::{Element, Scratch};
use crate::{Error, Matrix, Result, Vector};
use strata::{RealScalar, Scalar};
use strata_kernel::{gemm, gemv, gesvd, Op, SvdJob};
use tracing::debug;

/// Singular values at or below `ulp(smax) · dim` count as zero.
pub(crate) fn default_tolerance<R: RealScalar>(smax: R, dim: usize) -> R {
    smax.ulp() * R::from_usize(dim)
}

/// Singular value decomposition A = U·Σ·Vᴴ.
///
/// For an m×n matrix, `U` is m×m unitary, `VT` holds Vᴴ (n×n, not V) and `S` the
/// `min(m, n)` singular values in descending order.
pub struct Svd<T: Scalar> {
    u: Matrix<T>,
    s: Vector<T::Real>,
    vt: Matrix<T>,
}

impl<T: Element> Svd<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        let (m, n) = a.shape();
        let u = Matrix::new(m, m)?;
        let vt = Matrix::new(n, n)?;
        let mut s = vec![T::Real::ZERO; m.min(n)];
        let (lda, ldu, ldvt) = (a.stride(), u.stride(), vt.stride());
        let info =
            gesvd(SvdJob::All, m, n, a.cells(), lda, &mut s, u.cells(), ldu, vt.cells(), ldvt);
        Error::kernel("gesvd", info)?;
        debug!(rows = m, cols = n, "singular value decomposition");
        Ok(Self { u, s: Vector::from_vec(s)?, vt })
    }

    /// Singular values of `a` alone, descending.
    pub fn singular_values(a: &Matrix<T>) -> Result<Vector<T::Real>> {
        let (m, n) = a.shape();
        let mut s = vec![T::Real::ZERO; m.min(n)];
        let info = gesvd(SvdJob::ValuesOnly, m, n, a.cells(), a.stride(), &mut s, &[], 1, &[], 1);
        Error::kernel("gesvd", info)?;
        Vector::from_vec(s)
    }

    /// Left singular vectors (m×m).
    pub fn u(&self) -> &Matrix<T> {
        &self.u
    }

    pub fn s(&self) -> &Vector<T::Real> {
        &self.s
    }

    /// Vᴴ (n×n).
    pub fn vt(&self) -> &Matrix<T> {
        &self.vt
    }

    /// Largest over smallest singular value; infinite when A is rank deficient.
    pub fn condition_number(&self) -> T::Real {
        let smin = self.s.at(self.s.len() - 1);
        if smin == T::Real::ZERO {
            return T::Real::INFINITY;
        }
        self.s.at(0) / smin
    }

    /// ‖A‖₂, the largest singular value.
    pub fn norm2(&self) -> T::Real {
        self.s.at(0)
    }

    /// Number of singular values above `tolerance` (default `ulp(s_max) · max(m, n)`).
    pub fn rank(&self, tolerance: Option<T::Real>) -> usize {
        let tol = self.tolerance(tolerance);
        self.s.iter().filter(|&v| v > tol).count()
    }

    /// Minimum-norm least-squares solution x = V·Σ⁺·Uᴴ·b.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let x = Vector::new(self.vt.nrows())?;
        self.solve_into(b, &x)?;
        Ok(x)
    }

    /// Solve into `dst` (length n), which may alias `b`.
    pub fn solve_into(&self, b: &Vector<T>, dst: &Vector<T>) -> Result<()> {
        let m = self.u.nrows();
        let n = self.vt.nrows();
        let k = self.s.len();
        if b.len() != m {
            return Err(Error::dims("Svd::solve right-hand side", m, b.len()));
        }
        if dst.len() != n {
            return Err(Error::dims("Svd::solve destination", n, dst.len()));
        }

        let tol = self.tolerance(None);
        let scratch = Scratch::<T>::acquire(k + n);
        let y = scratch.vector(k);
        let x = Vector::from_parts(scratch.storage().clone(), k, n, 1);
        let (u, vt) = (&self.u, &self.vt);

        // y = Σ⁺ · (first k columns of U)ᴴ · b
        gemv(
            Op::ConjugateTranspose,
            m,
            k,
            T::ONE,
            u.cells(),
            u.stride(),
            b.cells(),
            b.stride(),
            T::ZERO,
            y.cells(),
            1,
        );
        for (i, s) in self.s.iter().enumerate() {
            let scaled = if s > tol { y.at(i).scale(s.recip()) } else { T::ZERO };
            y.put(i, scaled);
        }
        // x = (first k rows of Vᴴ)ᴴ · y
        gemv(
            Op::ConjugateTranspose,
            k,
            n,
            T::ONE,
            vt.cells(),
            vt.stride(),
            y.cells(),
            1,
            T::ZERO,
            x.cells(),
            1,
        );
        x.copy_to(dst)
    }

    /// The Moore–Penrose pseudo-inverse A⁺ (n×m).
    pub fn pseudo_inverse(&self, tolerance: Option<T::Real>) -> Result<Matrix<T>> {
        let dst = Matrix::new(self.vt.nrows(), self.u.nrows())?;
        self.pseudo_inverse_into(&dst, tolerance)?;
        Ok(dst)
    }

    /// A⁺ = V·Σ⁺·Uᴴ into `dst`, which must be n×m.
    pub fn pseudo_inverse_into(&self, dst: &Matrix<T>, tolerance: Option<T::Real>) -> Result<()> {
        let m = self.u.nrows();
        let n = self.vt.nrows();
        let k = self.s.len();
        if dst.shape() != (n, m) {
            return Err(Error::dims("Svd::pseudo_inverse", format!("{n}x{m}"), dst.shape_str()));
        }

        let tol = self.tolerance(tolerance);
        let scratch = Scratch::<T>::acquire(n * k);
        let vs = scratch.matrix(n, k);
        for (l, s) in self.s.iter().enumerate() {
            let inv = if s > tol { s.recip() } else { T::Real::ZERO };
            for i in 0..n {
                vs.put(i, l, self.vt.at(l, i).conj().scale(inv));
            }
        }
        let u = &self.u;
        gemm(
            Op::None,
            Op::ConjugateTranspose,
            n,
            m,
            k,
            T::ONE,
            vs.cells(),
            vs.stride(),
            u.cells(),
            u.stride(),
            T::ZERO,
            dst.cells(),
            dst.stride(),
        );
        Ok(())
    }

    fn tolerance(&self, tolerance: Option<T::Real>) -> T::Real {
        let dim = self.u.nrows().max(self.vt.nrows());
        tolerance.unwrap_or_else(|| default_tolerance(self.s.at(0), dim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;
    use approx::assert_abs_diff_eq;
    use strata::c64;

    fn reconstruct<T: Element>(svd: &Svd<T>) -> Matrix<T> {
        let (m, n) = (svd.u().nrows(), svd.vt().nrows());
        let us = svd.u().copy();
        for (j, s) in svd.s().iter().enumerate() {
            let col = us.col(j).unwrap();
            ops::mul_scalar(&col, T::from_real(s), &col).unwrap();
        }
        let k = svd.s().len();
        let us = us.submatrix(0, 0, m, k).unwrap();
        let vt = svd.vt().submatrix(0, 0, k, n).unwrap();
        let out = Matrix::new(m, n).unwrap();
        ops::mul_mat(&us, &vt, &out, Op::None, Op::None).unwrap();
        out
    }

    #[test]
    fn tall_reconstructs() {
        let a = Matrix::from_rows(&[[3.0, 2.0], [2.0, 3.0], [2.0, -2.0]]).unwrap();
        let svd = Svd::new(&a).unwrap();
        assert_abs_diff_eq!(svd.s().get(0).unwrap(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(svd.s().get(1).unwrap(), 3.0, epsilon = 1e-12);
        assert_eq!(svd.u().shape(), (3, 3));
        assert_eq!(svd.vt().shape(), (2, 2));
        for (x, y) in reconstruct(&svd).iter().zip(a.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(svd.norm2(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(svd.condition_number(), 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn complex_reconstructs() {
        let a = Matrix::from_rows(&[
            [c64(1.0, 2.0), c64(0.0, -1.0), c64(3.0, 0.0)],
            [c64(2.0, 0.0), c64(1.0, 1.0), c64(-1.0, 1.0)],
        ])
        .unwrap();
        let svd = Svd::new(&a).unwrap();
        for (x, y) in reconstruct(&svd).iter().zip(a.iter()) {
            assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-12);
            assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn rank_and_values_only() {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [1.0, 0.0, 1.0]]).unwrap();
        let svd = Svd::new(&a).unwrap();
        assert_eq!(svd.rank(Some(1e-10)), 2);
        let s = Svd::singular_values(&a).unwrap();
        for (x, y) in s.iter().zip(svd.s().iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }

        let diag = Matrix::from_rows(&[[2.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]]).unwrap();
        let svd = Svd::new(&diag).unwrap();
        assert_eq!(svd.s().to_vec(), vec![2.0, 1.0, 0.0]);
        assert_eq!(svd.rank(None), 2);
        assert_eq!(svd.condition_number(), f64::INFINITY);
    }

    #[test]
    fn minimum_norm_solution() {
        // x + y = 2 has minimum-norm solution (1, 1)
        let a = Matrix::from_rows(&[[1.0, 1.0]]).unwrap();
        let b = Vector::from_slice(&[2.0]).unwrap();
        let x = Svd::new(&a).unwrap().solve(&b).unwrap();
        assert_abs_diff_eq!(x.get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get(1).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pseudo_inverse_of_rank_one() {
        // [[1, 2], [2, 4]]⁺ = A / 25
        let a = Matrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]]).unwrap();
        let pinv = Svd::new(&a).unwrap().pseudo_inverse(Some(1e-10)).unwrap();
        for (x, y) in pinv.iter().zip(a.iter()) {
            assert_abs_diff_eq!(x, y / 25.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn pseudo_inverse_checks_destination() {
        let a = Matrix::from_rows(&[[1.0, 0.0, 0.0], [0.0, 2.0, 0.0]]).unwrap();
        let svd = Svd::new(&a).unwrap();
        let wrong = Matrix::new(2, 3).unwrap();
        assert!(matches!(svd.pseudo_inverse_into(&wrong, None), Err(Error::DimensionMismatch(_))));
        let pinv = svd.pseudo_inverse(None).unwrap();
        assert_eq!(pinv.shape(), (3, 2));
        assert_abs_diff_eq!(pinv.get(1, 1).unwrap(), 0.5, epsilon = 1e-12);
    }
}
