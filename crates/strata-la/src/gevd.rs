use crate::ops::check_square;
use crate::scratch::{Element, Scratch};
use crate::{Error, Matrix, Result, Vector};
use strata::Scalar;
use strata_kernel::sygv;
use tracing::debug;

/// Generalized Hermitian-definite eigenproblem A·v = λ·B·v.
///
/// A is Hermitian and B Hermitian positive definite; only their lower triangles are
/// read. The eigenvalues are real and ascending and the eigenvectors are normalized so
/// that Vᴴ·B·V = I.
pub struct Gevd<T: Scalar> {
    d: Vector<T::Real>,
    v: Matrix<T>,
}

impl<T: Element> Gevd<T> {
    pub fn new(a: &Matrix<T>, b: &Matrix<T>) -> Result<Self> {
        check_square("Gevd", a)?;
        check_square("Gevd", b)?;
        let n = a.nrows();
        if b.nrows() != n {
            return Err(Error::dims("Gevd B", format!("{n}x{n}"), b.shape_str()));
        }

        let v = a.copy();
        let scratch = Scratch::<T>::acquire(n * n);
        let work = scratch.matrix(n, n);
        b.copy_to(&work)?;
        let mut w = vec![T::Real::ZERO; n];
        Error::kernel("sygv", sygv(n, v.cells(), v.stride(), work.cells(), work.stride(), &mut w))?;
        debug!(n, "generalized eigendecomposition");
        Ok(Self { d: Vector::from_vec(w)?, v })
    }

    /// Eigenvalues, ascending.
    pub fn d(&self) -> &Vector<T::Real> {
        &self.d
    }

    /// B-orthonormal eigenvectors as columns.
    pub fn v(&self) -> &Matrix<T> {
        &self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;
    use crate::Op;
    use approx::assert_abs_diff_eq;

    fn product(x: &Matrix<f64>, op_x: Op, y: &Matrix<f64>) -> Matrix<f64> {
        let rows = if op_x.is_transpose() { x.ncols() } else { x.nrows() };
        let out = Matrix::new(rows, y.ncols()).unwrap();
        ops::mul_mat(x, y, &out, op_x, Op::None).unwrap();
        out
    }

    #[test]
    fn av_equals_bvd() {
        let a = Matrix::from_rows(&[[2.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(&[[4.0, 1.0, 0.0], [1.0, 3.0, 0.5], [0.0, 0.5, 2.0]]).unwrap();
        let gevd = Gevd::new(&a, &b).unwrap();
        let d = gevd.d().to_vec();
        assert!(d.windows(2).all(|w| w[0] <= w[1]));

        let av = product(&a, Op::None, gevd.v());
        let bv = product(&b, Op::None, gevd.v());
        for j in 0..3 {
            for i in 0..3 {
                let expected = bv.get(i, j).unwrap() * d[j];
                assert_abs_diff_eq!(av.get(i, j).unwrap(), expected, epsilon = 1e-10);
            }
        }

        let vtbv = product(gevd.v(), Op::Transpose, &bv);
        let eye = Matrix::<f64>::identity(3).unwrap();
        for (x, y) in vtbv.iter().zip(eye.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-10);
        }
    }

    #[test]
    fn identity_b_matches_standard_problem() {
        let a = Matrix::from_rows(&[[2.0, 1.0], [1.0, 2.0]]).unwrap();
        let gevd = Gevd::new(&a, &Matrix::identity(2).unwrap()).unwrap();
        assert_abs_diff_eq!(gevd.d().get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gevd.d().get(1).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn b_must_be_positive_definite() {
        let a = Matrix::<f64>::identity(2).unwrap();
        let b = Matrix::from_rows(&[[1.0, 2.0], [2.0, 1.0]]).unwrap();
        let err = Gevd::new(&a, &b).err().unwrap();
        assert!(matches!(err, Error::FactorizationFailed { routine: "sygv", info: 4, .. }));
    }

    #[test]
    fn shapes_must_agree() {
        let a = Matrix::<f64>::identity(2).unwrap();
        let b = Matrix::<f64>::identity(3).unwrap();
        assert!(matches!(Gevd::new(&a, &b), Err(Error::DimensionMismatch(_))));
    }
}
