//! Hermitian eigensolvers: `syev` (standard) and `sygv` (generalized).

use crate::{get, potrf, required_len, set, trsv, workspace, Diag, Op, Uplo};
use core::cell::Cell;
use strata::{RealScalar, Scalar};

const MAX_SWEEPS: usize = 100;

/// Eigendecomposition of a Hermitian matrix: A = V · diag(w) · Vᴴ.
///
/// Only the lower triangle of A is read; the imaginary parts of its diagonal are
/// ignored. On success `w` holds the eigenvalues in ascending order and A is
/// overwritten with the orthonormal eigenvectors as columns, in the same order.
///
/// Uses cyclic Jacobi rotations, phase-corrected for complex input. Returns a positive
/// value if the iteration fails to converge; A and `w` are unspecified in that case.
pub fn syev<T: Scalar>(n: usize, a: &[Cell<T>], lda: usize, w: &mut [T::Real]) -> i32 {
    if lda < n.max(1) {
        return -3;
    }
    if a.len() < required_len(n, n, lda) {
        return -2;
    }
    if w.len() < n {
        return -4;
    }
    if n == 0 {
        return 0;
    }

    let d = workspace(n * n, T::ZERO);
    for j in 0..n {
        set(&d, n, j, j, T::from_real(get(a, lda, j, j).re()));
        for i in (j + 1)..n {
            let v = get(a, lda, i, j);
            set(&d, n, i, j, v);
            set(&d, n, j, i, v.conj());
        }
    }

    // V accumulates in A
    for j in 0..n {
        for i in 0..n {
            set(a, lda, i, j, if i == j { T::ONE } else { T::ZERO });
        }
    }

    let mut frob_sq = T::Real::ZERO;
    for c in d.iter() {
        frob_sq += c.get().modulus_sq();
    }
    let threshold = T::Real::EPSILON * T::Real::from_usize(n) * frob_sq.sqrt();

    let off_norm = |d: &[Cell<T>]| {
        let mut s = T::Real::ZERO;
        for j in 0..n {
            for i in (j + 1)..n {
                s += get(d, n, i, j).modulus_sq();
            }
        }
        (s + s).sqrt()
    };

    let mut converged = false;
    for _ in 0..MAX_SWEEPS {
        if !(off_norm(&d) > threshold) {
            converged = true;
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let g = get(&d, n, p, q);
                let gm = g.modulus();
                if gm <= T::Real::MIN_POSITIVE {
                    continue;
                }

                // Rotate the phase of column/row q so that d[p, q] becomes real and positive.
                let e = g.scale(gm.recip());
                let ec = e.conj();
                if e != T::ONE {
                    for i in 0..n {
                        set(&d, n, i, q, get(&d, n, i, q) * ec);
                    }
                    for j in 0..n {
                        set(&d, n, q, j, get(&d, n, q, j) * e);
                    }
                    for i in 0..n {
                        set(a, lda, i, q, get(a, lda, i, q) * ec);
                    }
                }

                let app = get(&d, n, p, p).re();
                let aqq = get(&d, n, q, q).re();
                let theta = (aqq - app) / (T::Real::TWO * gm);
                let t = {
                    let r = theta.abs() + T::Real::ONE.hypot(theta);
                    if theta >= T::Real::ZERO {
                        r.recip()
                    } else {
                        -r.recip()
                    }
                };
                let c = (T::Real::ONE + t * t).sqrt().recip();
                let s = t * c;

                for i in 0..n {
                    let dip = get(&d, n, i, p);
                    let diq = get(&d, n, i, q);
                    set(&d, n, i, p, dip.scale(c) - diq.scale(s));
                    set(&d, n, i, q, dip.scale(s) + diq.scale(c));
                }
                for j in 0..n {
                    let dpj = get(&d, n, p, j);
                    let dqj = get(&d, n, q, j);
                    set(&d, n, p, j, dpj.scale(c) - dqj.scale(s));
                    set(&d, n, q, j, dpj.scale(s) + dqj.scale(c));
                }
                set(&d, n, p, q, T::ZERO);
                set(&d, n, q, p, T::ZERO);
                set(&d, n, p, p, T::from_real(get(&d, n, p, p).re()));
                set(&d, n, q, q, T::from_real(get(&d, n, q, q).re()));

                for i in 0..n {
                    let vip = get(a, lda, i, p);
                    let viq = get(a, lda, i, q);
                    set(a, lda, i, p, vip.scale(c) - viq.scale(s));
                    set(a, lda, i, q, vip.scale(s) + viq.scale(c));
                }
            }
        }
    }

    if !converged {
        return 1;
    }

    // Sort ascending and permute the eigenvector columns to match
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&x, &y| {
        let (dx, dy) = (get(&d, n, x, x).re(), get(&d, n, y, y).re());
        dx.partial_cmp(&dy).unwrap_or(core::cmp::Ordering::Equal)
    });

    let v = workspace(n * n, T::ZERO);
    for j in 0..n {
        for i in 0..n {
            set(&v, n, i, j, get(a, lda, i, j));
        }
    }
    for (j, &src) in order.iter().enumerate() {
        w[j] = get(&d, n, src, src).re();
        for i in 0..n {
            set(a, lda, i, j, get(&v, n, i, src));
        }
    }

    0
}

/// Generalized Hermitian-definite eigenproblem A·x = λ·B·x.
///
/// Only the lower triangles of A and B are read. B must be positive definite; on
/// success it is overwritten with its Cholesky factor L. `w` holds the eigenvalues in
/// ascending order and A the eigenvectors, normalized so that Vᴴ·B·V = I.
///
/// Returns `i` in `1..=n` if the eigensolver failed to converge, and `n + i` if the
/// leading minor of order `i` of B is not positive definite.
pub fn sygv<T: Scalar>(
    n: usize,
    a: &[Cell<T>],
    lda: usize,
    b: &[Cell<T>],
    ldb: usize,
    w: &mut [T::Real],
) -> i32 {
    if lda < n.max(1) {
        return -3;
    }
    if a.len() < required_len(n, n, lda) {
        return -2;
    }
    if ldb < n.max(1) {
        return -5;
    }
    if b.len() < required_len(n, n, ldb) {
        return -4;
    }
    if w.len() < n {
        return -6;
    }
    if n == 0 {
        return 0;
    }

    let info = potrf(Uplo::Lower, n, b, ldb);
    if info != 0 {
        return n as i32 + info;
    }

    // C = L⁻¹ · A · L⁻ᴴ, built as L⁻¹ · (L⁻¹ · A)ᴴ since A is Hermitian
    let x = workspace(n * n, T::ZERO);
    for j in 0..n {
        set(&x, n, j, j, T::from_real(get(a, lda, j, j).re()));
        for i in (j + 1)..n {
            let v = get(a, lda, i, j);
            set(&x, n, i, j, v);
            set(&x, n, j, i, v.conj());
        }
    }
    for j in 0..n {
        trsv(Uplo::Lower, Op::None, Diag::NonUnit, n, b, ldb, &x[j * n..], 1);
    }
    let c = workspace(n * n, T::ZERO);
    for j in 0..n {
        for i in 0..n {
            set(&c, n, i, j, get(&x, n, j, i).conj());
        }
    }
    for j in 0..n {
        trsv(Uplo::Lower, Op::None, Diag::NonUnit, n, b, ldb, &c[j * n..], 1);
    }

    let info = syev(n, &c, n, w);
    if info != 0 {
        return info;
    }

    // x = L⁻ᴴ · y
    for j in 0..n {
        trsv(Uplo::Lower, Op::ConjugateTranspose, Diag::NonUnit, n, b, ldb, &c[j * n..], 1);
        for i in 0..n {
            set(a, lda, i, j, get(&c, n, i, j));
        }
    }

    0
}
