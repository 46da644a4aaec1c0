use crate::{get, required_len, set};
use core::cell::Cell;
use strata::Scalar;

/// Householder QR factorization A = Q·R, in place.
///
/// A is m×n. On return the upper triangle holds R and the part below the diagonal of
/// column `k` holds the reflector vector `v_k` (with an implicit leading one), so that
/// Q = H₀·H₁·…·H_{k-1} with H_k = I − τ_k·v_k·v_kᴴ. `tau` receives `min(m, n)` scalars.
///
/// The diagonal of R is real; for real input it is the negated signed column norm.
pub fn geqrf<T: Scalar>(m: usize, n: usize, a: &[Cell<T>], lda: usize, tau: &mut [T]) -> i32 {
    let kmax = m.min(n);
    if lda < m.max(1) {
        return -4;
    }
    if a.len() < required_len(m, n, lda) {
        return -3;
    }
    if tau.len() < kmax {
        return -5;
    }

    for k in 0..kmax {
        let alpha = get(a, lda, k, k);
        let mut xnorm_sq = T::Real::ZERO;
        for i in (k + 1)..m {
            xnorm_sq += get(a, lda, i, k).modulus_sq();
        }

        if xnorm_sq == T::Real::ZERO && alpha.im() == T::Real::ZERO {
            tau[k] = T::ZERO;
            continue;
        }

        let norm = (alpha.modulus_sq() + xnorm_sq).sqrt();
        let beta = if alpha.re() >= T::Real::ZERO { -norm } else { norm };
        let beta_t = T::from_real(beta);
        tau[k] = (beta_t - alpha) / beta_t;

        let scale = (alpha - beta_t).recip();
        for i in (k + 1)..m {
            set(a, lda, i, k, get(a, lda, i, k) * scale);
        }
        set(a, lda, k, k, beta_t);

        // Apply Hᴴ to the trailing columns
        let tau_conj = tau[k].conj();
        for j in (k + 1)..n {
            let mut w = get(a, lda, k, j);
            for i in (k + 1)..m {
                w += get(a, lda, i, k).conj() * get(a, lda, i, j);
            }
            if w == T::ZERO {
                continue;
            }
            let f = tau_conj * w;
            set(a, lda, k, j, get(a, lda, k, j) - f);
            for i in (k + 1)..m {
                set(a, lda, i, j, get(a, lda, i, j) - f * get(a, lda, i, k));
            }
        }
    }

    0
}

/// Form the first `ncols` columns of Q from the `k` reflectors left by [`geqrf`].
///
/// `a`/`tau` are the outputs of `geqrf` on an m×(≥k) matrix; Q is written to the
/// m×ncols matrix `q`. `ncols == k` gives the thin factor, `ncols == m` the full one.
#[allow(clippy::too_many_arguments)]
pub fn ungqr<T: Scalar>(
    m: usize,
    ncols: usize,
    k: usize,
    a: &[Cell<T>],
    lda: usize,
    tau: &[T],
    q: &[Cell<T>],
    ldq: usize,
) -> i32 {
    if ncols > m {
        return -2;
    }
    if k > ncols {
        return -3;
    }
    if lda < m.max(1) {
        return -5;
    }
    if tau.len() < k {
        return -6;
    }
    if ldq < m.max(1) || q.len() < required_len(m, ncols, ldq) {
        return -8;
    }

    for j in 0..ncols {
        for i in 0..m {
            set(q, ldq, i, j, if i == j { T::ONE } else { T::ZERO });
        }
    }

    for i in (0..k).rev() {
        let t = tau[i];
        if t == T::ZERO {
            continue;
        }
        for j in i..ncols {
            let mut w = get(q, ldq, i, j);
            for r in (i + 1)..m {
                w += get(a, lda, r, i).conj() * get(q, ldq, r, j);
            }
            if w == T::ZERO {
                continue;
            }
            let f = t * w;
            set(q, ldq, i, j, get(q, ldq, i, j) - f);
            for r in (i + 1)..m {
                set(q, ldq, r, j, get(q, ldq, r, j) - f * get(a, lda, r, i));
            }
        }
    }

    0
}
