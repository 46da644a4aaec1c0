use crate::scratch::{Element, Scratch};
use crate::{Error, Matrix, Result, Vector};
use strata_kernel::{gemv, geqrf, trsv, ungqr, Diag, Op, Uplo};
use tracing::debug;

/// Householder QR decomposition A = Q·R.
///
/// For an m×n matrix with k = min(m, n), `Q` is m×k with orthonormal columns and `R`
/// is k×n upper-triangular.
pub struct Qr<T> {
    q: Matrix<T>,
    r: Matrix<T>,
}

impl<T: Element> Qr<T> {
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        let (m, n) = a.shape();
        let k = m.min(n);

        let scratch = Scratch::<T>::acquire(m * n);
        let work = scratch.matrix(m, n);
        a.copy_to(&work)?;
        let mut tau = vec![T::ZERO; k];
        Error::kernel("geqrf", geqrf(m, n, work.cells(), work.stride(), &mut tau))?;

        let q = Matrix::new(m, k)?;
        let info = ungqr(m, k, k, work.cells(), work.stride(), &tau, q.cells(), q.stride());
        Error::kernel("ungqr", info)?;
        let r = Matrix::from_fn(k, n, |i, j| if i <= j { work.at(i, j) } else { T::ZERO })?;

        debug!(rows = m, cols = n, "qr factorization");
        Ok(Self { q, r })
    }

    /// Orthonormal factor (m×k).
    pub fn q(&self) -> &Matrix<T> {
        &self.q
    }

    /// Upper-triangular factor (k×n).
    pub fn r(&self) -> &Matrix<T> {
        &self.r
    }

    /// Least-squares solution of A·x ≈ b, exact when A is square and nonsingular.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let x = Vector::new(self.r.ncols())?;
        self.solve_into(b, &x)?;
        Ok(x)
    }

    /// Least-squares solve into `dst` (length n). Requires m ≥ n.
    pub fn solve_into(&self, b: &Vector<T>, dst: &Vector<T>) -> Result<()> {
        let (m, k) = self.q.shape();
        let n = self.r.ncols();
        if m < n {
            return Err(Error::InvalidOperation(format!(
                "QR solve needs at least as many rows as columns, factored {m}x{n}"
            )));
        }
        if b.len() != m {
            return Err(Error::dims("Qr::solve right-hand side", m, b.len()));
        }
        if dst.len() != n {
            return Err(Error::dims("Qr::solve destination", n, dst.len()));
        }

        // x = R⁻¹ · Qᴴ · b
        let scratch = Scratch::<T>::acquire(k);
        let y = scratch.vector(k);
        let q = &self.q;
        let r = &self.r;
        gemv(
            Op::ConjugateTranspose,
            m,
            k,
            T::ONE,
            q.cells(),
            q.stride(),
            b.cells(),
            b.stride(),
            T::ZERO,
            y.cells(),
            1,
        );
        let info =
            trsv(Uplo::Upper, Op::None, Diag::NonUnit, n, r.cells(), r.stride(), y.cells(), 1);
        Error::kernel("trsv", info)?;
        y.copy_to(dst)
    }
}
