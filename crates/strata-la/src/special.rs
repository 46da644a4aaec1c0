use crate::{Error, Matrix, Result, Vector};
use strata::Scalar;

/// Reorderings and other adjustments of factorization results.
pub struct Special;

impl Special {
    /// Reverse the eigenvalues in `d` and the matching columns of `v` in place, turning
    /// the ascending order of [`Evd`](crate::Evd) and [`Gevd`](crate::Gevd) into
    /// descending order.
    ///
    /// The accessors of a factorization return aliasing views, so passing them here
    /// reorders the factorization itself.
    pub fn reverse_eigen_value_order<T: Scalar>(d: &Vector<T::Real>, v: &Matrix<T>) -> Result<()> {
        let n = d.len();
        if v.ncols() != n {
            return Err(Error::DimensionMismatch(format!(
                "reverse_eigen_value_order: {n} eigenvalues but {} eigenvector columns",
                v.ncols()
            )));
        }
        for i in 0..n / 2 {
            let j = n - 1 - i;
            let (di, dj) = (d.at(i), d.at(j));
            d.put(i, dj);
            d.put(j, di);
            for r in 0..v.nrows() {
                let (a, b) = (v.at(r, i), v.at(r, j));
                v.put(r, i, b);
                v.put(r, j, a);
            }
        }
        Ok(())
    }
}
