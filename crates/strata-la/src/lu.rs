use crate::scratch::{Element, Scratch};
use crate::{Error, Matrix, Result, Vector};
use strata_kernel::{getrf, trsv, Diag, Op, Uplo};
use tracing::debug;

/// LU decomposition with partial pivoting: P·A = L·U.
///
/// For an m×n matrix with k = min(m, n), `L` is m×k unit lower-triangular and `U` is
/// k×n upper-triangular. Exactly singular matrices factor fine; the zero shows up on
/// the diagonal of `U` and in the determinant.
pub struct Lu<T> {
    l: Matrix<T>,
    u: Matrix<T>,
    /// Row `i` of P·A is row `permutation[i]` of A.
    permutation: Vec<usize>,
    sign: i32,
}

impl<T: Element> Lu<T> {
    /// Factor a copy of `a`.
    pub fn new(a: &Matrix<T>) -> Result<Self> {
        let (m, n) = a.shape();
        let k = m.min(n);
        let l = Matrix::new(m, k)?;
        let u = Matrix::new(k, n)?;
        let mut permutation = vec![0; m];
        let sign = Self::decompose(a, &l, &u, &mut permutation)?;
        debug!(rows = m, cols = n, sign, "lu factorization");
        Ok(Self { l, u, permutation, sign })
    }

    /// Factor `a` into caller-supplied destinations and return the pivot sign (±1).
    ///
    /// `l` must be m×k, `u` k×n and `permutation` of length m. The packed factor is
    /// built in pooled scratch; only the k pivot indices are allocated per call.
    pub fn decompose(
        a: &Matrix<T>,
        l: &Matrix<T>,
        u: &Matrix<T>,
        permutation: &mut [usize],
    ) -> Result<i32> {
        let (m, n) = a.shape();
        let k = m.min(n);
        if l.shape() != (m, k) {
            return Err(Error::dims("Lu::decompose L", format!("{m}x{k}"), l.shape_str()));
        }
        if u.shape() != (k, n) {
            return Err(Error::dims("Lu::decompose U", format!("{k}x{n}"), u.shape_str()));
        }
        if permutation.len() != m {
            return Err(Error::dims("Lu::decompose permutation", m, permutation.len()));
        }

        let scratch = Scratch::<T>::acquire(m * n);
        let lu = scratch.matrix(m, n);
        a.copy_to(&lu)?;

        let mut ipiv = vec![0usize; k];
        let info = getrf(m, n, lu.cells(), lu.stride(), &mut ipiv);
        if info < 0 {
            Error::kernel("getrf", info)?;
        }

        let mut sign = 1;
        for (i, p) in permutation.iter_mut().enumerate() {
            *p = i;
        }
        for (i, &p) in ipiv.iter().enumerate() {
            if p != i {
                permutation.swap(i, p);
                sign = -sign;
            }
        }

        for c in 0..k {
            for r in 0..m {
                let v = match r.cmp(&c) {
                    core::cmp::Ordering::Greater => lu.at(r, c),
                    core::cmp::Ordering::Equal => T::ONE,
                    core::cmp::Ordering::Less => T::ZERO,
                };
                l.put(r, c, v);
            }
        }
        for c in 0..n {
            for r in 0..k {
                u.put(r, c, if r <= c { lu.at(r, c) } else { T::ZERO });
            }
        }

        Ok(sign)
    }

    /// Unit lower-triangular factor (m×k).
    pub fn l(&self) -> &Matrix<T> {
        &self.l
    }

    /// Upper-triangular factor (k×n).
    pub fn u(&self) -> &Matrix<T> {
        &self.u
    }

    /// Row order of P·A: row `i` is row `permutation()[i]` of A.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// +1 for an even number of row swaps, −1 for odd.
    pub fn pivot_sign(&self) -> i32 {
        self.sign
    }

    /// The dense m×m permutation matrix P with P·A = L·U.
    pub fn permutation_matrix(&self) -> Result<Matrix<T>> {
        let m = self.permutation.len();
        let p = Matrix::new(m, m)?;
        for (i, &src) in self.permutation.iter().enumerate() {
            p.put(i, src, T::ONE);
        }
        Ok(p)
    }

    /// sign · Π diag(U)
    pub fn determinant(&self) -> Result<T> {
        if !self.l.is_square() || !self.u.is_square() {
            return Err(Error::DimensionMismatch(format!(
                "determinant requires a square matrix, got {}x{}",
                self.l.nrows(),
                self.u.ncols()
            )));
        }
        let det = self.u.diagonal().iter().fold(T::ONE, |acc, d| acc * d);
        Ok(if self.sign < 0 { -det } else { det })
    }

    /// Solve A·x = b.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let x = Vector::new(self.u.ncols())?;
        self.solve_into(b, &x)?;
        Ok(x)
    }

    /// Solve A·x = b into `dst`, which may alias `b`.
    pub fn solve_into(&self, b: &Vector<T>, dst: &Vector<T>) -> Result<()> {
        let n = self.permutation.len();
        if self.u.ncols() != n {
            return Err(Error::InvalidOperation(format!(
                "LU solve needs a square matrix, factored {}x{}",
                n,
                self.u.ncols()
            )));
        }
        if b.len() != n {
            return Err(Error::dims("Lu::solve right-hand side", n, b.len()));
        }
        if dst.len() != n {
            return Err(Error::dims("Lu::solve destination", n, dst.len()));
        }

        let scratch = Scratch::<T>::acquire(n);
        let x = scratch.vector(n);
        for (i, &src) in self.permutation.iter().enumerate() {
            x.put(i, b.at(src));
        }
        let l = &self.l;
        let u = &self.u;
        let info = trsv(Uplo::Lower, Op::None, Diag::Unit, n, l.cells(), l.stride(), x.cells(), 1);
        Error::kernel("trsv", info)?;
        let info =
            trsv(Uplo::Upper, Op::None, Diag::NonUnit, n, u.cells(), u.stride(), x.cells(), 1);
        Error::kernel("trsv", info)?;
        x.copy_to(dst)
    }
}
