//! Property-based tests: factorization identities over random input, full rank and not.

use proptest::prelude::*;
use strata_la::{ops, Cholesky, Evd, Lu, Matrix, Op, Qr, Svd, Vector};

fn max_diff(a: &Matrix<f64>, b: &Matrix<f64>) -> f64 {
    a.iter().zip(b.iter()).fold(0.0, |acc, (x, y)| acc.max((x - y).abs()))
}

fn matrix(rows: usize, cols: usize) -> impl Strategy<Value = Matrix<f64>> {
    prop::collection::vec(-10.0..10.0f64, rows * cols)
        .prop_map(move |values| Matrix::from_column_major(rows, cols, &values).unwrap())
}

fn shaped() -> impl Strategy<Value = Matrix<f64>> {
    (1usize..6, 1usize..6).prop_flat_map(|(m, n)| matrix(m, n))
}

/// Diagonally dominant, hence nonsingular.
fn nonsingular() -> impl Strategy<Value = Matrix<f64>> {
    (1usize..6).prop_flat_map(|n| matrix(n, n)).prop_map(|a| {
        let n = a.nrows();
        for i in 0..n {
            let row_sum: f64 = a.row(i).unwrap().iter().map(f64::abs).sum();
            a.set(i, i, row_sum + 1.0).unwrap();
        }
        a
    })
}

/// Aᵀ·A + n·I
fn positive_definite() -> impl Strategy<Value = Matrix<f64>> {
    (1usize..6).prop_flat_map(|n| matrix(n, n)).prop_map(|a| {
        let n = a.nrows();
        let out = Matrix::new(n, n).unwrap();
        ops::mul_mat(&a, &a, &out, Op::Transpose, Op::None).unwrap();
        for i in 0..n {
            out.set(i, i, out.get(i, i).unwrap() + n as f64).unwrap();
        }
        out
    })
}

/// L·R with L m×r and R r×n, r < min(m, n); returned with r.
fn rank_deficient() -> impl Strategy<Value = (Matrix<f64>, usize)> {
    (2usize..9, 2usize..9)
        .prop_flat_map(|(m, n)| (1..m.min(n)).prop_flat_map(move |r| (matrix(m, r), matrix(r, n))))
        .prop_map(|(l, r)| {
            let out = Matrix::new(l.nrows(), r.ncols()).unwrap();
            ops::mul_mat(&l, &r, &out, Op::None, Op::None).unwrap();
            (out, l.ncols())
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lu_reconstructs_permuted_input(a in shaped()) {
        let lu = Lu::new(&a).unwrap();
        let pa = &lu.permutation_matrix().unwrap() * &a;
        let prod = lu.l() * lu.u();
        prop_assert!(max_diff(&pa, &prod) < 1e-9);
    }

    #[test]
    fn qr_reconstructs_input(a in shaped()) {
        let qr = Qr::new(&a).unwrap();
        prop_assert!(max_diff(&(qr.q() * qr.r()), &a) < 1e-9);
        let k = qr.q().ncols();
        let qtq = &qr.q().transpose().unwrap() * qr.q();
        prop_assert!(max_diff(&qtq, &Matrix::identity(k).unwrap()) < 1e-10);
    }

    #[test]
    fn svd_reconstructs_input(a in shaped()) {
        let (m, n) = a.shape();
        let svd = Svd::new(&a).unwrap();
        let s = svd.s().to_vec();
        prop_assert!(s.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(s.iter().all(|&v| v >= 0.0));

        let k = s.len();
        let us = svd.u().submatrix(0, 0, m, k).unwrap().copy();
        for (col, sigma) in us.cols().into_iter().zip(s.iter()) {
            ops::mul_scalar(&col, *sigma, &col).unwrap();
        }
        let back = &us * &svd.vt().submatrix(0, 0, k, n).unwrap();
        prop_assert!(max_diff(&back, &a) < 1e-9);
    }

    #[test]
    fn cholesky_reconstructs_input(a in positive_definite()) {
        let chol = Cholesky::new(&a).unwrap();
        let llt = chol.l() * &chol.l().transpose().unwrap();
        prop_assert!(max_diff(&llt, &a) < 1e-8 * a.frobenius_norm().max(1.0));
    }

    #[test]
    fn evd_reconstructs_input(a in positive_definite()) {
        let evd = Evd::new(&a).unwrap();
        let d = evd.d().to_vec();
        prop_assert!(d.windows(2).all(|w| w[0] <= w[1]));
        let vd = evd.v().copy();
        for (col, lambda) in vd.cols().into_iter().zip(d.iter()) {
            ops::mul_scalar(&col, *lambda, &col).unwrap();
        }
        let back = &vd * &evd.v().transpose().unwrap();
        prop_assert!(max_diff(&back, &a) < 1e-8 * a.frobenius_norm().max(1.0));
    }

    #[test]
    fn inverse_of_inverse(a in nonsingular()) {
        let twice = a.inverse().unwrap().inverse().unwrap();
        prop_assert!(max_diff(&twice, &a) < 1e-8 * a.frobenius_norm().max(1.0));
    }

    #[test]
    fn solve_recovers_x(a in nonsingular(), seed in prop::collection::vec(-5.0..5.0f64, 5)) {
        let n = a.nrows();
        let x = Vector::from_slice(&seed[..n]).unwrap();
        let b = &a * &x;
        let got = Lu::new(&a).unwrap().solve(&b).unwrap();
        for (g, w) in got.iter().zip(x.iter()) {
            prop_assert!((g - w).abs() < 1e-8);
        }
        let got = Qr::new(&a).unwrap().solve(&b).unwrap();
        for (g, w) in got.iter().zip(x.iter()) {
            prop_assert!((g - w).abs() < 1e-8);
        }
    }

    #[test]
    fn svd_handles_rank_deficiency((a, r) in rank_deficient()) {
        let (m, n) = a.shape();
        let svd = Svd::new(&a).unwrap();
        let s = svd.s().to_vec();
        let scale = a.frobenius_norm().max(1.0);
        prop_assert!(s[r..].iter().all(|&v| v < 1e-10 * scale));

        let us = svd.u().submatrix(0, 0, m, s.len()).unwrap().copy();
        for (col, sigma) in us.cols().into_iter().zip(s.iter()) {
            ops::mul_scalar(&col, *sigma, &col).unwrap();
        }
        let back = &us * &svd.vt().submatrix(0, 0, s.len(), n).unwrap();
        prop_assert!(max_diff(&back, &a) < 1e-10 * scale);

        let values = Svd::singular_values(&a).unwrap().to_vec();
        prop_assert_eq!(values, s);
        prop_assert!(ops::rank(&a, Some(1e-8 * scale)).unwrap() <= r);
    }
}
