//! Shared helpers for strata benchmarks: seeded RNG, input generators.

use strata::{c64, Complex64};
use strata_la::{ops, Matrix, Op, Vector};

/// xoshiro256** PRNG for reproducible inputs.
pub struct Rng {
    s: [u64; 4],
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        // SplitMix64 to expand seed into state
        let mut z = seed;
        let mut s = [0u64; 4];
        for slot in &mut s {
            z = z.wrapping_add(0x9e3779b97f4a7c15);
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
            *slot = z ^ (z >> 31);
        }
        Self { s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.s[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 17;
        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];
        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);
        result
    }

    /// Uniform f64 in [-1, 1]
    pub fn f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64) * 2.0 - 1.0
    }

    /// Real and imaginary parts uniform in [-1, 1]
    pub fn c64(&mut self) -> Complex64 {
        c64(self.f64(), self.f64())
    }
}

pub fn make_rng() -> Rng {
    Rng::new(0xDEAD_BEEF_CAFE_BABE)
}

/// Random `rows × cols` matrix, column-major fill order.
pub fn random_matrix(rows: usize, cols: usize) -> Matrix<f64> {
    let mut rng = make_rng();
    let values: Vec<f64> = (0..rows * cols).map(|_| rng.f64()).collect();
    Matrix::from_column_major(rows, cols, &values).expect("non-empty benchmark shape")
}

pub fn random_complex_matrix(rows: usize, cols: usize) -> Matrix<Complex64> {
    let mut rng = make_rng();
    let values: Vec<Complex64> = (0..rows * cols).map(|_| rng.c64()).collect();
    Matrix::from_column_major(rows, cols, &values).expect("non-empty benchmark shape")
}

pub fn random_vector(len: usize) -> Vector<f64> {
    let mut rng = make_rng();
    Vector::from_fn(len, |_| rng.f64()).expect("non-empty benchmark length")
}

/// Symmetric positive-definite matrix: AᵀA + 0.1·I
pub fn random_spd_matrix(size: usize) -> Matrix<f64> {
    let a = random_matrix(size, size);
    let ata = Matrix::new(size, size).expect("non-empty benchmark shape");
    ops::mul_mat(&a, &a, &ata, Op::Transpose, Op::None).expect("square operands");
    let diag = ata.diagonal();
    for i in 0..size {
        let v = diag.get(i).expect("index within diagonal");
        diag.set(i, v + 0.1).expect("index within diagonal");
    }
    ata
}
