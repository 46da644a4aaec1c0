use crate::{get, required_len, set, workspace};
use core::cell::Cell;
use strata::Scalar;

/// LU factorization with partial pivoting: P·A = L·U, in place.
///
/// A is m×n. On return the strict lower triangle holds L (unit diagonal implied) and
/// the upper triangle holds U. `ipiv[k]` is the row swapped with row `k` at step `k`
/// (0-based, length `min(m, n)`).
///
/// Returns `k + 1` if `U[k, k]` is exactly zero. The factorization is still completed,
/// so a singular matrix yields a valid factor with a zero on the diagonal of U.
pub fn getrf<T: Scalar>(m: usize, n: usize, a: &[Cell<T>], lda: usize, ipiv: &mut [usize]) -> i32 {
    let kmax = m.min(n);
    if lda < m.max(1) {
        return -4;
    }
    if a.len() < required_len(m, n, lda) {
        return -3;
    }
    if ipiv.len() < kmax {
        return -5;
    }

    let mut info = 0;

    for k in 0..kmax {
        // Find pivot: largest |a[i][k]| for i >= k
        let mut max_val = T::Real::ZERO;
        let mut max_row = k;
        for i in k..m {
            let v = get(a, lda, i, k).modulus();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }
        ipiv[k] = max_row;

        if max_val == T::Real::ZERO {
            if info == 0 {
                info = k as i32 + 1;
            }
            continue;
        }

        if max_row != k {
            for j in 0..n {
                a[j * lda + k].swap(&a[j * lda + max_row]);
            }
        }

        // Compute multipliers for column k
        let pivot_inv = get(a, lda, k, k).recip();
        for i in (k + 1)..m {
            set(a, lda, i, k, get(a, lda, i, k) * pivot_inv);
        }

        // Rank-1 update of the trailing submatrix
        for j in (k + 1)..n {
            let u_kj = get(a, lda, k, j);
            if u_kj == T::ZERO {
                continue;
            }
            for i in (k + 1)..m {
                let v = get(a, lda, i, j) - get(a, lda, i, k) * u_kj;
                set(a, lda, i, j, v);
            }
        }
    }

    info
}

/// Inverse of a matrix from its [`getrf`] factors, in place.
///
/// Returns `i + 1` (and leaves `a` untouched) if `U[i, i]` is exactly zero.
pub fn getri<T: Scalar>(n: usize, a: &[Cell<T>], lda: usize, ipiv: &[usize]) -> i32 {
    if lda < n.max(1) {
        return -3;
    }
    if ipiv.len() < n {
        return -4;
    }
    for i in 0..n {
        if get(a, lda, i, i) == T::ZERO {
            return i as i32 + 1;
        }
    }

    let lu = workspace(n * n, T::ZERO);
    for j in 0..n {
        for i in 0..n {
            set(&lu, n, i, j, get(a, lda, i, j));
        }
    }

    // A·X = I  ⇔  L·U·X = P·I
    for j in 0..n {
        for i in 0..n {
            set(a, lda, i, j, if i == j { T::ONE } else { T::ZERO });
        }
    }
    for (k, &p) in ipiv.iter().enumerate().take(n) {
        if p != k {
            for j in 0..n {
                a[j * lda + k].swap(&a[j * lda + p]);
            }
        }
    }

    for j in 0..n {
        // Forward substitution with unit-lower L
        for i in 0..n {
            let mut s = get(a, lda, i, j);
            for l in 0..i {
                s -= get(&lu, n, i, l) * get(a, lda, l, j);
            }
            set(a, lda, i, j, s);
        }
        // Back substitution with U
        for i in (0..n).rev() {
            let mut s = get(a, lda, i, j);
            for l in (i + 1)..n {
                s -= get(&lu, n, i, l) * get(a, lda, l, j);
            }
            set(a, lda, i, j, s / get(&lu, n, i, i));
        }
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::Op;
    use strata::c64;

    #[test]
    fn factor_and_reconstruct() {
        let a = cells_from_rows(&[[2.0, 1.0, 1.0], [4.0, 3.0, 3.0], [8.0, 7.0, 9.0]]);
        let original = a.clone();
        let mut ipiv = [0usize; 3];
        assert_eq!(getrf(3, 3, &a, 3, &mut ipiv), 0);
        assert_eq!(ipiv[0], 2);

        let l = workspace(9, 0.0);
        let u = workspace(9, 0.0);
        for j in 0..3 {
            for i in 0..3 {
                if i > j {
                    set(&l, 3, i, j, get(&a, 3, i, j));
                } else {
                    set(&u, 3, i, j, get(&a, 3, i, j));
                }
            }
            set(&l, 3, j, j, 1.0);
        }
        let lu = product(3, 3, 3, &l, Op::None, &u, Op::None);

        // Apply the same row swaps to the original and compare
        for (k, &p) in ipiv.iter().enumerate() {
            for j in 0..3 {
                original[j * 3 + k].swap(&original[j * 3 + p]);
            }
        }
        assert!(max_abs_diff(&lu, &original) < 1e-12);
    }

    #[test]
    fn singular_reports_zero_pivot() {
        let a = cells_from_rows(&[[1.0, 2.0], [2.0, 4.0]]);
        let mut ipiv = [0usize; 2];
        assert_eq!(getrf(2, 2, &a, 2, &mut ipiv), 2);
        assert_eq!(getri(2, &a, 2, &ipiv), 2);
    }

    #[test]
    fn rectangular_factor() {
        let a = cells_from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let mut ipiv = [0usize; 2];
        assert_eq!(getrf(2, 3, &a, 2, &mut ipiv), 0);
        assert_eq!(ipiv, [1, 1]);
        assert_eq!(get(&a, 2, 0, 0), 4.0);
        assert_eq!(get(&a, 2, 1, 0), 0.25);
    }

    #[test]
    fn invert_roundtrip() {
        let a = cells_from_rows(&[[2.0, 1.0, 1.0], [1.0, 3.0, 2.0], [1.0, 0.0, 0.0]]);
        let inv = a.clone();
        let mut ipiv = [0usize; 3];
        assert_eq!(getrf(3, 3, &inv, 3, &mut ipiv), 0);
        assert_eq!(getri(3, &inv, 3, &ipiv), 0);
        let prod = product(3, 3, 3, &a, Op::None, &inv, Op::None);
        let eye = cells_from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(max_abs_diff(&prod, &eye) < 1e-12);
    }

    #[test]
    fn invert_complex() {
        let a = cells_from_rows(&[[c64(1.0, 1.0), c64(2.0, 0.0)], [c64(0.0, -1.0), c64(3.0, 2.0)]]);
        let inv = a.clone();
        let mut ipiv = [0usize; 2];
        assert_eq!(getrf(2, 2, &inv, 2, &mut ipiv), 0);
        assert_eq!(getri(2, &inv, 2, &ipiv), 0);
        let prod = product(2, 2, 2, &inv, Op::None, &a, Op::None);
        let eye =
            cells_from_rows(&[[c64(1.0, 0.0), c64(0.0, 0.0)], [c64(0.0, 0.0), c64(1.0, 0.0)]]);
        assert!(max_abs_diff(&prod, &eye) < 1e-12);
    }

    #[test]
    fn illegal_leading_dimension() {
        let a = workspace(4, 1.0);
        let mut ipiv = [0usize; 2];
        assert_eq!(getrf(2, 2, &a, 1, &mut ipiv), -4);
    }
}
