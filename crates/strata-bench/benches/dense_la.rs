use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strata_bench::*;
use strata_la::{ops, Cholesky, Evd, Lu, Matrix, Op, Qr, Svd};

const SIZES: &[usize] = &[32, 64, 128, 256];
const JACOBI_SIZES: &[usize] = &[16, 32, 64]; // Jacobi sweeps are slow for large

fn gemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm");

    for &n in SIZES {
        group.throughput(Throughput::Elements((n * n * n) as u64));

        group.bench_with_input(BenchmarkId::new("f64", n), &n, |b, &n| {
            let a = random_matrix(n, n);
            let v = random_matrix(n, n);
            let dst = Matrix::new(n, n).unwrap();
            b.iter(|| ops::mul_mat(black_box(&a), black_box(&v), &dst, Op::None, Op::None).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("c64_conj_transpose", n), &n, |b, &n| {
            let a = random_complex_matrix(n, n);
            let dst = Matrix::new(n, n).unwrap();
            b.iter(|| {
                ops::mul_mat(black_box(&a), black_box(&a), &dst, Op::ConjugateTranspose, Op::None)
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn lu_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("lu_solve");

    for &n in SIZES {
        group.bench_with_input(BenchmarkId::new("f64", n), &n, |b, &n| {
            let a = random_matrix(n, n);
            let rhs = random_vector(n);
            b.iter(|| {
                let lu = Lu::new(&a).unwrap();
                black_box(lu.solve(&rhs))
            })
        });
    }

    group.finish();
}

fn cholesky_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("cholesky_solve");

    for &n in SIZES {
        group.bench_with_input(BenchmarkId::new("f64", n), &n, |b, &n| {
            let a = random_spd_matrix(n);
            let rhs = random_vector(n);
            b.iter(|| {
                let ch = Cholesky::new(&a).unwrap();
                black_box(ch.solve(&rhs))
            })
        });
    }

    group.finish();
}

fn qr(c: &mut Criterion) {
    let mut group = c.benchmark_group("qr");

    for &n in SIZES {
        group.bench_with_input(BenchmarkId::new("tall", n), &n, |b, &n| {
            let a = random_matrix(2 * n, n);
            b.iter(|| black_box(Qr::new(&a).unwrap()))
        });
    }

    group.finish();
}

fn svd(c: &mut Criterion) {
    let mut group = c.benchmark_group("svd");

    for &n in JACOBI_SIZES {
        group.bench_with_input(BenchmarkId::new("full", n), &n, |b, &n| {
            let a = random_matrix(n, n);
            b.iter(|| black_box(Svd::new(&a).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("values_only", n), &n, |b, &n| {
            let a = random_matrix(n, n);
            b.iter(|| black_box(Svd::singular_values(&a).unwrap()))
        });
    }

    group.finish();
}

fn hermitian_eigen(c: &mut Criterion) {
    let mut group = c.benchmark_group("hermitian_eigen");

    for &n in JACOBI_SIZES {
        group.bench_with_input(BenchmarkId::new("f64", n), &n, |b, &n| {
            let a = random_spd_matrix(n);
            b.iter(|| black_box(Evd::new(&a).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, gemm, lu_solve, cholesky_solve, qr, svd, hermitian_eigen);
criterion_main!(benches);
