use crate::{get, required_len, set, workspace};
use core::cell::Cell;
use strata::{RealScalar, Scalar};

const MAX_SWEEPS: usize = 100;

/// What [`gesvd`] computes besides the singular values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvdJob {
    /// Full U (m×m) and Vᴴ (n×n).
    All,
    /// Singular values only; `u` and `vt` are not touched and may be empty.
    ValuesOnly,
}

/// Singular value decomposition A = U · Σ · Vᴴ.
///
/// A is m×n and is left unchanged. `s` receives the `min(m, n)` singular values in
/// descending order. With [`SvdJob::All`], `u` receives the m×m unitary U and `vt`
/// the n×n unitary Vᴴ (not V).
///
/// One-sided Jacobi (Hestenes) on the tall orientation of A, with a phase rotation per
/// column pair so that complex input is handled by the same real rotation. Returns a
/// positive value if the sweeps fail to converge.
#[allow(clippy::too_many_arguments)]
pub fn gesvd<T: Scalar>(
    job: SvdJob,
    m: usize,
    n: usize,
    a: &[Cell<T>],
    lda: usize,
    s: &mut [T::Real],
    u: &[Cell<T>],
    ldu: usize,
    vt: &[Cell<T>],
    ldvt: usize,
) -> i32 {
    let k = m.min(n);
    if lda < m.max(1) {
        return -5;
    }
    if a.len() < required_len(m, n, lda) {
        return -4;
    }
    if s.len() < k {
        return -6;
    }
    if job == SvdJob::All {
        if ldu < m.max(1) || u.len() < required_len(m, m, ldu) {
            return -8;
        }
        if ldvt < n.max(1) || vt.len() < required_len(n, n, ldvt) {
            return -10;
        }
    }

    // Work on the tall orientation: W = A (m ≥ n) or W = Aᴴ (m < n).
    let wide = m < n;
    let (rows, cols) = if wide { (n, m) } else { (m, n) };
    let w = workspace(rows * cols, T::ZERO);
    for j in 0..cols {
        for i in 0..rows {
            let v = if wide { get(a, lda, j, i).conj() } else { get(a, lda, i, j) };
            set(&w, rows, i, j, v);
        }
    }
    let v = workspace(cols * cols, T::ZERO);
    for j in 0..cols {
        set(&v, cols, j, j, T::ONE);
    }

    let tol = T::Real::EPSILON * T::Real::from_usize(rows.max(10));
    // Columns whose squared norm is below this are round-off against ‖A‖_F and never rotate.
    let mut frob_sq = T::Real::ZERO;
    for c in w.iter() {
        frob_sq += c.get().modulus_sq();
    }
    let negligible = tol * tol * frob_sq;
    let mut converged = false;

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;

        for p in 0..cols {
            for q in (p + 1)..cols {
                let mut alpha = T::Real::ZERO;
                let mut beta = T::Real::ZERO;
                let mut gamma = T::ZERO;
                for i in 0..rows {
                    let wp = get(&w, rows, i, p);
                    let wq = get(&w, rows, i, q);
                    alpha += wp.modulus_sq();
                    beta += wq.modulus_sq();
                    gamma += wp.conj() * wq;
                }

                let gm = gamma.modulus();
                let orthogonal = gm == T::Real::ZERO || gm <= tol * (alpha * beta).sqrt();
                if orthogonal || alpha.min(beta) <= negligible {
                    continue;
                }
                rotated = true;

                let ec = gamma.scale(gm.recip()).conj();
                if ec != T::ONE {
                    for i in 0..rows {
                        set(&w, rows, i, q, get(&w, rows, i, q) * ec);
                    }
                    for i in 0..cols {
                        set(&v, cols, i, q, get(&v, cols, i, q) * ec);
                    }
                }

                let zeta = (beta - alpha) / (T::Real::TWO * gm);
                let t = {
                    let r = zeta.abs() + T::Real::ONE.hypot(zeta);
                    if zeta >= T::Real::ZERO {
                        r.recip()
                    } else {
                        -r.recip()
                    }
                };
                let c = (T::Real::ONE + t * t).sqrt().recip();
                let sn = t * c;

                for i in 0..rows {
                    let wp = get(&w, rows, i, p);
                    let wq = get(&w, rows, i, q);
                    set(&w, rows, i, p, wp.scale(c) - wq.scale(sn));
                    set(&w, rows, i, q, wp.scale(sn) + wq.scale(c));
                }
                for i in 0..cols {
                    let vp = get(&v, cols, i, p);
                    let vq = get(&v, cols, i, q);
                    set(&v, cols, i, p, vp.scale(c) - vq.scale(sn));
                    set(&v, cols, i, q, vp.scale(sn) + vq.scale(c));
                }
            }
        }

        if !rotated {
            converged = true;
            break;
        }
    }

    if !converged {
        return 1;
    }

    // Singular values are the column norms of W
    let mut sigma = Vec::with_capacity(cols);
    for j in 0..cols {
        let mut norm_sq = T::Real::ZERO;
        for i in 0..rows {
            norm_sq += get(&w, rows, i, j).modulus_sq();
        }
        let norm = norm_sq.sqrt();
        sigma.push(norm);
        if norm > T::Real::MIN_POSITIVE {
            let inv = norm.recip();
            for i in 0..rows {
                set(&w, rows, i, j, get(&w, rows, i, j).scale(inv));
            }
        }
    }

    let mut order: Vec<usize> = (0..cols).collect();
    order.sort_by(|&x, &y| sigma[y].partial_cmp(&sigma[x]).unwrap_or(core::cmp::Ordering::Equal));
    for (i, &src) in order.iter().enumerate() {
        s[i] = sigma[src];
    }

    if job == SvdJob::ValuesOnly {
        return 0;
    }

    // Left factor of the tall problem, completed to a square unitary basis
    let smax = if k > 0 { s[0] } else { T::Real::ZERO };
    let cutoff = smax * T::Real::EPSILON * T::Real::from_usize(rows);
    let left = workspace(rows * rows, T::ZERO);
    let mut valid = vec![false; rows];
    for (j, &src) in order.iter().enumerate() {
        if s[j] > cutoff && s[j] > T::Real::ZERO {
            for i in 0..rows {
                set(&left, rows, i, j, get(&w, rows, i, src));
            }
            valid[j] = true;
        }
    }
    complete_basis(rows, &left, &mut valid);

    if wide {
        // Aᴴ = W·Σ·V'ᴴ, so A = V'·Σ·Wᴴ: U = V', Vᴴ = (completed W)ᴴ
        for (j, &src) in order.iter().enumerate() {
            for i in 0..m {
                set(u, ldu, i, j, get(&v, cols, i, src));
            }
        }
        for j in 0..n {
            for i in 0..n {
                set(vt, ldvt, i, j, get(&left, rows, j, i).conj());
            }
        }
    } else {
        for j in 0..m {
            for i in 0..m {
                set(u, ldu, i, j, get(&left, rows, i, j));
            }
        }
        for (i, &src) in order.iter().enumerate() {
            for j in 0..n {
                set(vt, ldvt, i, j, get(&v, cols, j, src).conj());
            }
        }
    }

    0
}

/// Fill every column of the n×n matrix `q` not marked `valid` with a unit vector
/// orthogonal to all valid columns.
fn complete_basis<T: Scalar>(n: usize, q: &[Cell<T>], valid: &mut [bool]) {
    for j in 0..n {
        if valid[j] {
            continue;
        }

        // Standard basis vector with the largest component outside the current span
        let mut best = 0;
        let mut best_residual = -T::Real::ONE;
        for r in 0..n {
            let mut captured = T::Real::ZERO;
            for l in (0..n).filter(|&l| valid[l]) {
                captured += get(q, n, r, l).modulus_sq();
            }
            let residual = T::Real::ONE - captured;
            if residual > best_residual {
                best_residual = residual;
                best = r;
            }
        }

        let x = workspace(n, T::ZERO);
        x[best].set(T::ONE);
        for _ in 0..2 {
            for l in (0..n).filter(|&l| valid[l]) {
                let mut proj = T::ZERO;
                for i in 0..n {
                    proj += get(q, n, i, l).conj() * x[i].get();
                }
                for i in 0..n {
                    x[i].set(x[i].get() - get(q, n, i, l) * proj);
                }
            }
        }

        let mut norm_sq = T::Real::ZERO;
        for c in x.iter() {
            norm_sq += c.get().modulus_sq();
        }
        let inv = norm_sq.sqrt().recip();
        for i in 0..n {
            set(q, n, i, j, x[i].get().scale(inv));
        }
        valid[j] = true;
    }
}
