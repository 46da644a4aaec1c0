//! Sample mean and covariance over a sequence of observation vectors.
//!
//! Each observation is one [`Vector`]; all must have the same length. The sequences
//! are walked twice for the covariance, so their iterators must be `Clone` (slices and
//! `Vec` iterators are).

use crate::{Error, Matrix, Result, Vector};
use strata::{RealScalar, Scalar};

/// Mean of the observations.
pub fn mean<'a, T, I>(observations: I) -> Result<Vector<T>>
where
    T: Scalar,
    I: IntoIterator<Item = &'a Vector<T>>,
{
    let mut iter = observations.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| Error::InvalidArgument("mean of an empty sequence".into()))?;
    let acc = first.copy();
    let mut count = 1usize;
    for x in iter {
        if x.len() != acc.len() {
            return Err(Error::dims("mean observation", acc.len(), x.len()));
        }
        for i in 0..acc.len() {
            acc.put(i, acc.at(i) + x.at(i));
        }
        count += 1;
    }
    let inv = T::Real::from_usize(count).recip();
    for i in 0..acc.len() {
        acc.put(i, acc.at(i).scale(inv));
    }
    Ok(acc)
}

/// Sample covariance Σ (x − μ)(x − μ)ᴴ / (count − ddof).
///
/// `ddof = 1` gives the unbiased estimator, `ddof = 0` the maximum-likelihood one.
pub fn covariance<'a, T, I>(observations: I, ddof: usize) -> Result<Matrix<T>>
where
    T: Scalar,
    I: IntoIterator<Item = &'a Vector<T>>,
    I::IntoIter: Clone,
{
    mean_and_covariance(observations, ddof).map(|(_, cov)| cov)
}

/// Mean and covariance in one call; the mean is computed only once.
pub fn mean_and_covariance<'a, T, I>(observations: I, ddof: usize) -> Result<(Vector<T>, Matrix<T>)>
where
    T: Scalar,
    I: IntoIterator<Item = &'a Vector<T>>,
    I::IntoIter: Clone,
{
    let iter = observations.into_iter();
    let mu = mean(iter.clone())?;
    let count = iter.clone().count();
    if count <= ddof {
        return Err(Error::InvalidArgument(format!(
            "covariance needs more than {ddof} observations, got {count}"
        )));
    }

    let n = mu.len();
    let cov: Matrix<T> = Matrix::new(n, n)?;
    let diff = Vector::new(n)?;
    for x in iter {
        for i in 0..n {
            diff.put(i, x.at(i) - mu.at(i));
        }
        for c in 0..n {
            let dc = diff.at(c).conj();
            for r in 0..n {
                cov.put(r, c, cov.at(r, c) + diff.at(r) * dc);
            }
        }
    }
    let inv = T::Real::from_usize(count - ddof).recip();
    for c in 0..n {
        for r in 0..n {
            cov.put(r, c, cov.at(r, c).scale(inv));
        }
    }
    Ok((mu, cov))
}
