use crate::{get, required_len, set, Uplo};
use core::cell::Cell;
use strata::Scalar;

/// Cholesky factorization of a Hermitian positive-definite matrix, in place.
///
/// With `Uplo::Lower`, A = L·Lᴴ and L overwrites the lower triangle; with
/// `Uplo::Upper`, A = Uᴴ·U and U overwrites the upper triangle. The other triangle
/// is neither read nor written.
///
/// Returns `j + 1` if the leading minor of order `j + 1` is not positive definite.
pub fn potrf<T: Scalar>(uplo: Uplo, n: usize, a: &[Cell<T>], lda: usize) -> i32 {
    if lda < n.max(1) {
        return -4;
    }
    if a.len() < required_len(n, n, lda) {
        return -3;
    }

    match uplo {
        Uplo::Lower => {
            for j in 0..n {
                let mut d = get(a, lda, j, j).re();
                for k in 0..j {
                    d -= get(a, lda, j, k).modulus_sq();
                }
                if !(d > T::Real::ZERO) {
                    return j as i32 + 1;
                }
                let l_jj = d.sqrt();
                set(a, lda, j, j, T::from_real(l_jj));

                let inv = T::from_real(l_jj.recip());
                for i in (j + 1)..n {
                    let mut s = get(a, lda, i, j);
                    for k in 0..j {
                        s -= get(a, lda, i, k) * get(a, lda, j, k).conj();
                    }
                    set(a, lda, i, j, s * inv);
                }
            }
        }
        Uplo::Upper => {
            for j in 0..n {
                let mut d = get(a, lda, j, j).re();
                for k in 0..j {
                    d -= get(a, lda, k, j).modulus_sq();
                }
                if !(d > T::Real::ZERO) {
                    return j as i32 + 1;
                }
                let u_jj = d.sqrt();
                set(a, lda, j, j, T::from_real(u_jj));

                let inv = T::from_real(u_jj.recip());
                for i in (j + 1)..n {
                    let mut s = get(a, lda, j, i);
                    for k in 0..j {
                        s -= get(a, lda, k, j).conj() * get(a, lda, k, i);
                    }
                    set(a, lda, j, i, s * inv);
                }
            }
        }
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::{workspace, Op};
    use approx::assert_abs_diff_eq;
    use strata::c64;

    fn lower_part<T: Scalar>(a: &[Cell<T>], n: usize) -> Vec<Cell<T>> {
        let l = workspace(n * n, T::ZERO);
        for j in 0..n {
            for i in j..n {
                set(&l, n, i, j, get(a, n, i, j));
            }
        }
        l
    }

    #[test]
    fn lower_reconstructs() {
        let a = cells_from_rows(&[[4.0, 2.0, -2.0], [2.0, 10.0, 2.0], [-2.0, 2.0, 5.0]]);
        let f = a.clone();
        assert_eq!(potrf(Uplo::Lower, 3, &f, 3), 0);
        assert_abs_diff_eq!(get(&f, 3, 0, 0), 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(get(&f, 3, 1, 0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(get(&f, 3, 1, 1), 3.0, epsilon = 1e-15);

        let l = lower_part(&f, 3);
        let llt = product(3, 3, 3, &l, Op::None, &l, Op::ConjugateTranspose);
        assert!(max_abs_diff(&llt, &a) < 1e-12);
    }

    #[test]
    fn upper_leaves_lower_triangle_alone() {
        let a = cells_from_rows(&[[4.0, 2.0], [99.0, 10.0]]);
        assert_eq!(potrf(Uplo::Upper, 2, &a, 2), 0);
        assert_eq!(get(&a, 2, 0, 0), 2.0);
        assert_eq!(get(&a, 2, 0, 1), 1.0);
        assert_eq!(get(&a, 2, 1, 1), 3.0);
        assert_eq!(get(&a, 2, 1, 0), 99.0);
    }

    #[test]
    fn complex_hermitian() {
        let a = cells_from_rows(&[[c64(4.0, 0.0), c64(2.0, -2.0)], [c64(2.0, 2.0), c64(6.0, 0.0)]]);
        let f = a.clone();
        assert_eq!(potrf(Uplo::Lower, 2, &f, 2), 0);
        let l = lower_part(&f, 2);
        let llh = product(2, 2, 2, &l, Op::None, &l, Op::ConjugateTranspose);
        assert!(max_abs_diff(&llh, &a) < 1e-12);
        assert_eq!(get(&f, 2, 1, 1).im, 0.0);
    }

    #[test]
    fn indefinite_reports_failing_minor() {
        let a = cells_from_rows(&[[1.0, 2.0], [2.0, 1.0]]);
        assert_eq!(potrf(Uplo::Lower, 2, &a, 2), 2);

        let a = cells_from_rows(&[[-1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(potrf(Uplo::Lower, 2, &a, 2), 1);

        let a = cells_from_rows(&[[f64::NAN]]);
        assert_eq!(potrf(Uplo::Lower, 1, &a, 1), 1);
    }
}
