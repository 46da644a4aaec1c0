//! Level 2/3 BLAS: `gemm`, `gemv`, `trsv`.

use crate::{get, set, Diag, Op, Uplo};
use core::cell::Cell;
use strata::Scalar;

/// C = alpha · op(A) · op(B) + beta · C  (column-major)
///
/// op(A) is m×k, op(B) is k×n, C is m×n. When `beta` is zero, C is overwritten
/// without being read, so it may hold NaN on entry.
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: Scalar>(
    transa: Op,
    transb: Op,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[Cell<T>],
    lda: usize,
    b: &[Cell<T>],
    ldb: usize,
    beta: T,
    c: &[Cell<T>],
    ldc: usize,
) {
    for j in 0..n {
        if beta == T::ZERO {
            for i in 0..m {
                set(c, ldc, i, j, T::ZERO);
            }
        } else if beta != T::ONE {
            for i in 0..m {
                set(c, ldc, i, j, get(c, ldc, i, j) * beta);
            }
        }

        if alpha == T::ZERO {
            continue;
        }

        for l in 0..k {
            let b_lj = transb.element(b, ldb, l, j);
            if b_lj == T::ZERO {
                continue;
            }
            let t = alpha * b_lj;
            for i in 0..m {
                let v = get(c, ldc, i, j) + transa.element(a, lda, i, l) * t;
                set(c, ldc, i, j, v);
            }
        }
    }
}

/// y = alpha · op(A) · x + beta · y
///
/// A is stored m×n; op(A) is n×m when `trans` transposes. `incx`/`incy` are the
/// element strides of x and y.
#[allow(clippy::too_many_arguments)]
pub fn gemv<T: Scalar>(
    trans: Op,
    m: usize,
    n: usize,
    alpha: T,
    a: &[Cell<T>],
    lda: usize,
    x: &[Cell<T>],
    incx: usize,
    beta: T,
    y: &[Cell<T>],
    incy: usize,
) {
    let (rows, cols) = trans.forward((m, n), (n, m));

    for i in 0..rows {
        let yi = &y[i * incy];
        if beta == T::ZERO {
            yi.set(T::ZERO);
        } else if beta != T::ONE {
            yi.set(yi.get() * beta);
        }
    }

    if alpha == T::ZERO {
        return;
    }

    for l in 0..cols {
        let t = alpha * x[l * incx].get();
        if t == T::ZERO {
            continue;
        }
        for i in 0..rows {
            let yi = &y[i * incy];
            yi.set(yi.get() + trans.element(a, lda, i, l) * t);
        }
    }
}

/// Solve op(A) · x = b in place, where A is n×n triangular.
///
/// Only the `uplo` triangle of A is read. Returns `i + 1` if the (non-unit) diagonal
/// element `i` is exactly zero; x is left untouched in that case.
#[allow(clippy::too_many_arguments)]
pub fn trsv<T: Scalar>(
    uplo: Uplo,
    trans: Op,
    diag: Diag,
    n: usize,
    a: &[Cell<T>],
    lda: usize,
    x: &[Cell<T>],
    incx: usize,
) -> i32 {
    if lda < n.max(1) {
        return -6;
    }
    if incx == 0 {
        return -8;
    }

    if diag == Diag::NonUnit {
        for i in 0..n {
            if get(a, lda, i, i) == T::ZERO {
                return i as i32 + 1;
            }
        }
    }

    // Transposing swaps which triangle op(A) lives in.
    let lower = (uplo == Uplo::Lower) != trans.is_transpose();

    let solve_row = |i: usize, range: core::ops::Range<usize>| {
        let mut s = x[i * incx].get();
        for j in range {
            s -= trans.element(a, lda, i, j) * x[j * incx].get();
        }
        if diag == Diag::NonUnit {
            s /= trans.element(a, lda, i, i);
        }
        x[i * incx].set(s);
    };

    if lower {
        for i in 0..n {
            solve_row(i, 0..i);
        }
    } else {
        for i in (0..n).rev() {
            solve_row(i, (i + 1)..n);
        }
    }

    0
}
