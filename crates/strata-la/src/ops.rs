//! Element-wise and BLAS-level operations on views.
//!
//! Every function takes its sources and a destination view explicitly and validates
//! all shapes before writing anything, so a failed call leaves the destination as it
//! was. Element-wise functions accept a destination that is one of their sources.
//! Products and transposes reject a destination that overlaps a source.

use crate::scratch::{Element, Scratch};
use crate::{Error, Matrix, Op, Result, Svd, Vector};
use strata::{RealScalar, Scalar};
use strata_kernel::{gemm, gemv, getrf, getri};

fn check_same_len<T: Scalar>(what: &str, x: &Vector<T>, y: &Vector<T>) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch(format!(
            "{what}: vector lengths {} and {} differ",
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

fn check_same_shape<T: Scalar>(what: &str, a: &Matrix<T>, b: &Matrix<T>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::DimensionMismatch(format!(
            "{what}: matrix shapes {} and {} differ",
            a.shape_str(),
            b.shape_str()
        )));
    }
    Ok(())
}

pub(crate) fn check_square<T: Scalar>(what: &str, a: &Matrix<T>) -> Result<()> {
    if !a.is_square() {
        return Err(Error::DimensionMismatch(format!(
            "{what} requires a square matrix, got {}",
            a.shape_str()
        )));
    }
    Ok(())
}

fn check_disjoint<T: Scalar>(what: &str, dst: &Matrix<T>, src: &Matrix<T>) -> Result<()> {
    if dst.overlaps(src) {
        return Err(Error::InvalidArgument(format!("{what}: destination overlaps a source")));
    }
    Ok(())
}

fn check_disjoint_vector<T: Scalar>(what: &str, dst: &Matrix<T>, src: &Vector<T>) -> Result<()> {
    if dst.overlaps_vector(src) {
        return Err(Error::InvalidArgument(format!("{what}: destination overlaps a source")));
    }
    Ok(())
}

fn zip_with<T: Scalar>(
    what: &str,
    x: &Vector<T>,
    y: &Vector<T>,
    dst: &Vector<T>,
    f: impl Fn(T, T) -> T,
) -> Result<()> {
    check_same_len(what, x, y)?;
    check_same_len(what, x, dst)?;
    for i in 0..x.len() {
        dst.put(i, f(x.at(i), y.at(i)));
    }
    Ok(())
}

fn zip_with_mat<T: Scalar>(
    what: &str,
    a: &Matrix<T>,
    b: &Matrix<T>,
    dst: &Matrix<T>,
    f: impl Fn(T, T) -> T,
) -> Result<()> {
    check_same_shape(what, a, b)?;
    check_same_shape(what, a, dst)?;
    for c in 0..a.ncols() {
        for r in 0..a.nrows() {
            dst.put(r, c, f(a.at(r, c), b.at(r, c)));
        }
    }
    Ok(())
}

/// dst = x + y
pub fn add<T: Scalar>(x: &Vector<T>, y: &Vector<T>, dst: &Vector<T>) -> Result<()> {
    zip_with("add", x, y, dst, |a, b| a + b)
}

/// dst = x − y
pub fn sub<T: Scalar>(x: &Vector<T>, y: &Vector<T>, dst: &Vector<T>) -> Result<()> {
    zip_with("sub", x, y, dst, |a, b| a - b)
}

/// dst[i] = x[i] · y[i]
pub fn pointwise_mul<T: Scalar>(x: &Vector<T>, y: &Vector<T>, dst: &Vector<T>) -> Result<()> {
    zip_with("pointwise_mul", x, y, dst, |a, b| a * b)
}

/// dst[i] = x[i] / y[i]
pub fn pointwise_div<T: Scalar>(x: &Vector<T>, y: &Vector<T>, dst: &Vector<T>) -> Result<()> {
    zip_with("pointwise_div", x, y, dst, |a, b| a / b)
}

/// dst = s · x
pub fn mul_scalar<T: Scalar>(x: &Vector<T>, s: T, dst: &Vector<T>) -> Result<()> {
    check_same_len("mul_scalar", x, dst)?;
    for i in 0..x.len() {
        dst.put(i, x.at(i) * s);
    }
    Ok(())
}

/// dst = conj(x)
pub fn conjugate<T: Scalar>(x: &Vector<T>, dst: &Vector<T>) -> Result<()> {
    check_same_len("conjugate", x, dst)?;
    for i in 0..x.len() {
        dst.put(i, x.at(i).conj());
    }
    Ok(())
}

/// Σ xᵢ·yᵢ, without conjugation.
pub fn dot<T: Scalar>(x: &Vector<T>, y: &Vector<T>) -> Result<T> {
    check_same_len("dot", x, y)?;
    Ok(x.iter().zip(y.iter()).fold(T::ZERO, |acc, (a, b)| acc + a * b))
}

/// Σ conj(xᵢ)·yᵢ
pub fn dot_conj<T: Scalar>(x: &Vector<T>, y: &Vector<T>) -> Result<T> {
    check_same_len("dot_conj", x, y)?;
    Ok(x.iter().zip(y.iter()).fold(T::ZERO, |acc, (a, b)| acc + a.conj() * b))
}

/// dst = x·yᵀ, or x·yᴴ when `conjugate_y` is set.
pub fn outer<T: Scalar>(
    x: &Vector<T>,
    y: &Vector<T>,
    dst: &Matrix<T>,
    conjugate_y: bool,
) -> Result<()> {
    if dst.shape() != (x.len(), y.len()) {
        return Err(Error::dims("outer", format!("{}x{}", x.len(), y.len()), dst.shape_str()));
    }
    check_disjoint_vector("outer", dst, x)?;
    check_disjoint_vector("outer", dst, y)?;
    for c in 0..y.len() {
        let yc = if conjugate_y { y.at(c).conj() } else { y.at(c) };
        for r in 0..x.len() {
            dst.put(r, c, x.at(r) * yc);
        }
    }
    Ok(())
}

/// Euclidean norm.
pub fn norm<T: Scalar>(x: &Vector<T>) -> T::Real {
    x.iter().fold(T::Real::ZERO, |acc, v| acc + v.modulus_sq()).sqrt()
}

/// Σ |xᵢ|
pub fn l1_norm<T: Scalar>(x: &Vector<T>) -> T::Real {
    x.iter().fold(T::Real::ZERO, |acc, v| acc + v.modulus())
}

/// max |xᵢ|
pub fn infinity_norm<T: Scalar>(x: &Vector<T>) -> T::Real {
    x.iter().fold(T::Real::ZERO, |acc, v| acc.max(v.modulus()))
}

pub fn sum<T: Scalar>(x: &Vector<T>) -> T {
    x.iter().fold(T::ZERO, |acc, v| acc + v)
}

/// dst = a + b
pub fn add_mat<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>, dst: &Matrix<T>) -> Result<()> {
    zip_with_mat("add_mat", a, b, dst, |x, y| x + y)
}

/// dst = a − b
pub fn sub_mat<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>, dst: &Matrix<T>) -> Result<()> {
    zip_with_mat("sub_mat", a, b, dst, |x, y| x - y)
}

pub fn pointwise_mul_mat<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>, dst: &Matrix<T>) -> Result<()> {
    zip_with_mat("pointwise_mul_mat", a, b, dst, |x, y| x * y)
}

pub fn pointwise_div_mat<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>, dst: &Matrix<T>) -> Result<()> {
    zip_with_mat("pointwise_div_mat", a, b, dst, |x, y| x / y)
}

/// dst = s · a
pub fn mul_mat_scalar<T: Scalar>(a: &Matrix<T>, s: T, dst: &Matrix<T>) -> Result<()> {
    check_same_shape("mul_mat_scalar", a, dst)?;
    for c in 0..a.ncols() {
        for r in 0..a.nrows() {
            dst.put(r, c, a.at(r, c) * s);
        }
    }
    Ok(())
}

/// dst = op(a) · x
pub fn mul_vec<T: Scalar>(a: &Matrix<T>, x: &Vector<T>, dst: &Vector<T>, op: Op) -> Result<()> {
    let (m, n) = a.shape();
    let (rows, cols) = op.forward((m, n), (n, m));
    if x.len() != cols {
        return Err(Error::dims("mul_vec operand", cols, x.len()));
    }
    if dst.len() != rows {
        return Err(Error::dims("mul_vec destination", rows, dst.len()));
    }
    if a.overlaps_vector(dst) || dst.overlaps(x) {
        return Err(Error::InvalidArgument("mul_vec: destination overlaps a source".into()));
    }
    gemv(
        op,
        m,
        n,
        T::ONE,
        a.cells(),
        a.stride(),
        x.cells(),
        x.stride(),
        T::ZERO,
        dst.cells(),
        dst.stride(),
    );
    Ok(())
}

/// dst = op_x(x) · op_y(y)
pub fn mul_mat<T: Scalar>(
    x: &Matrix<T>,
    y: &Matrix<T>,
    dst: &Matrix<T>,
    op_x: Op,
    op_y: Op,
) -> Result<()> {
    let (m, k) = op_x.forward(x.shape(), (x.ncols(), x.nrows()));
    let (k2, n) = op_y.forward(y.shape(), (y.ncols(), y.nrows()));
    if k != k2 {
        return Err(Error::DimensionMismatch(format!(
            "mul_mat: inner dimensions {k} and {k2} differ"
        )));
    }
    if dst.shape() != (m, n) {
        return Err(Error::dims("mul_mat destination", format!("{m}x{n}"), dst.shape_str()));
    }
    check_disjoint("mul_mat", dst, x)?;
    check_disjoint("mul_mat", dst, y)?;
    gemm(
        op_x,
        op_y,
        m,
        n,
        k,
        T::ONE,
        x.cells(),
        x.stride(),
        y.cells(),
        y.stride(),
        T::ZERO,
        dst.cells(),
        dst.stride(),
    );
    Ok(())
}

fn transpose_with<T: Scalar>(
    what: &str,
    a: &Matrix<T>,
    dst: &Matrix<T>,
    f: impl Fn(T) -> T,
) -> Result<()> {
    if dst.shape() != (a.ncols(), a.nrows()) {
        return Err(Error::dims(what, format!("{}x{}", a.ncols(), a.nrows()), dst.shape_str()));
    }
    check_disjoint(what, dst, a)?;
    for c in 0..a.ncols() {
        for r in 0..a.nrows() {
            dst.put(c, r, f(a.at(r, c)));
        }
    }
    Ok(())
}

/// dst = aᵀ. The destination must not overlap `a`.
pub fn transpose<T: Scalar>(a: &Matrix<T>, dst: &Matrix<T>) -> Result<()> {
    transpose_with("transpose", a, dst, |v| v)
}

/// dst = aᴴ. The destination must not overlap `a`.
pub fn conjugate_transpose<T: Scalar>(a: &Matrix<T>, dst: &Matrix<T>) -> Result<()> {
    transpose_with("conjugate_transpose", a, dst, |v| v.conj())
}

/// dst = conj(a); may run in place.
pub fn conjugate_mat<T: Scalar>(a: &Matrix<T>, dst: &Matrix<T>) -> Result<()> {
    check_same_shape("conjugate_mat", a, dst)?;
    for c in 0..a.ncols() {
        for r in 0..a.nrows() {
            dst.put(r, c, a.at(r, c).conj());
        }
    }
    Ok(())
}

/// dst = a⁻¹ via LU.
///
/// `dst` doubles as the factorization workspace, so it holds unspecified values when
/// `a` is singular and [`Error::IllConditioned`] is returned.
pub fn inverse<T: Scalar>(a: &Matrix<T>, dst: &Matrix<T>) -> Result<()> {
    check_square("inverse", a)?;
    check_same_shape("inverse", a, dst)?;
    a.copy_to(dst)?;

    let n = a.nrows();
    let mut ipiv = vec![0usize; n];
    Error::kernel("getrf", getrf(n, n, dst.cells(), dst.stride(), &mut ipiv))?;
    Error::kernel("getri", getri(n, dst.cells(), dst.stride(), &ipiv))
}

/// Sum of the diagonal.
pub fn trace<T: Scalar>(a: &Matrix<T>) -> Result<T> {
    check_square("trace", a)?;
    Ok(sum(&a.diagonal()))
}

/// sqrt(Σ |aᵢⱼ|²)
pub fn frobenius_norm<T: Scalar>(a: &Matrix<T>) -> T::Real {
    a.iter().fold(T::Real::ZERO, |acc, v| acc + v.modulus_sq()).sqrt()
}

/// Determinant via LU on a scratch copy of `a`. Exactly singular input gives zero.
pub fn determinant<T: Element>(a: &Matrix<T>) -> Result<T> {
    check_square("determinant", a)?;
    let n = a.nrows();
    let scratch = Scratch::<T>::acquire(n * n);
    let lu = scratch.matrix(n, n);
    a.copy_to(&lu)?;

    let mut ipiv = vec![0usize; n];
    let info = getrf(n, n, lu.cells(), lu.stride(), &mut ipiv);
    if info < 0 {
        Error::kernel("getrf", info)?;
    }

    let mut det = T::ONE;
    for (k, &p) in ipiv.iter().enumerate() {
        det *= lu.at(k, k);
        if p != k {
            det = -det;
        }
    }
    Ok(det)
}

/// Number of singular values above `tolerance` (default `ulp(s_max) · max(m, n)`).
pub fn rank<T: Element>(a: &Matrix<T>, tolerance: Option<T::Real>) -> Result<usize> {
    let s = Svd::singular_values(a)?;
    let dim = a.nrows().max(a.ncols());
    let tol = tolerance.unwrap_or_else(|| crate::svd::default_tolerance(s.at(0), dim));
    Ok(s.iter().filter(|&v| v > tol).count())
}

/// dst = a⁺, the Moore–Penrose pseudo-inverse. `dst` is n×m for an m×n `a`.
///
/// Singular values at or below `tolerance` (default `ulp(s_max) · max(m, n)`) are
/// treated as zero.
pub fn pseudo_inverse<T: Element>(
    a: &Matrix<T>,
    dst: &Matrix<T>,
    tolerance: Option<T::Real>,
) -> Result<()> {
    if dst.shape() != (a.ncols(), a.nrows()) {
        let expected = format!("{}x{}", a.ncols(), a.nrows());
        return Err(Error::dims("pseudo_inverse", expected, dst.shape_str()));
    }
    Svd::new(a)?.pseudo_inverse_into(dst, tolerance)
}
