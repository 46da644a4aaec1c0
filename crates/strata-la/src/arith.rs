//! Allocating conveniences over [`ops`](crate::ops): methods that return fresh views,
//! and arithmetic operators on references.
//!
//! Operators cannot return `Result`, so they panic with the error message when the
//! operand dimensions disagree. Use the methods or the `ops` functions to handle the
//! error instead.

use crate::scratch::Element;
use crate::{ops, Error, Matrix, Op, Result, Vector};
use core::ops::{Add, Mul, Neg, Sub};
use strata::Scalar;

fn check<T>(result: Result<T>) -> T {
    result.unwrap_or_else(|err| panic!("{err}"))
}

impl<T: Scalar> Vector<T> {
    /// Σ xᵢ·yᵢ, unconjugated.
    pub fn dot(&self, other: &Vector<T>) -> Result<T> {
        ops::dot(self, other)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> T::Real {
        ops::norm(self)
    }

    /// A new unit-norm vector in the direction of `self`.
    pub fn normalized(&self) -> Result<Vector<T>> {
        let norm = self.norm();
        if norm == T::Real::ZERO {
            return Err(Error::InvalidOperation("cannot normalize a zero vector".into()));
        }
        let out = Vector::new(self.len())?;
        ops::mul_scalar(self, T::from_real(norm.recip()), &out)?;
        Ok(out)
    }
}

impl<T: Scalar> Matrix<T> {
    pub fn transpose(&self) -> Result<Matrix<T>> {
        let out = Matrix::new(self.ncols(), self.nrows())?;
        ops::transpose(self, &out)?;
        Ok(out)
    }

    pub fn conjugate_transpose(&self) -> Result<Matrix<T>> {
        let out = Matrix::new(self.ncols(), self.nrows())?;
        ops::conjugate_transpose(self, &out)?;
        Ok(out)
    }

    /// self · rhs
    #[allow(clippy::should_implement_trait)]
    pub fn mul(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        let out = Matrix::new(self.nrows(), rhs.ncols())?;
        ops::mul_mat(self, rhs, &out, Op::None, Op::None)?;
        Ok(out)
    }

    /// self · x
    pub fn mul_vec(&self, x: &Vector<T>) -> Result<Vector<T>> {
        let out = Vector::new(self.nrows())?;
        ops::mul_vec(self, x, &out, Op::None)?;
        Ok(out)
    }

    pub fn inverse(&self) -> Result<Matrix<T>> {
        let out = Matrix::new(self.nrows(), self.ncols())?;
        ops::inverse(self, &out)?;
        Ok(out)
    }

    pub fn trace(&self) -> Result<T> {
        ops::trace(self)
    }

    pub fn frobenius_norm(&self) -> T::Real {
        ops::frobenius_norm(self)
    }
}

impl<T: Element> Matrix<T> {
    pub fn determinant(&self) -> Result<T> {
        ops::determinant(self)
    }

    pub fn rank(&self, tolerance: Option<T::Real>) -> Result<usize> {
        ops::rank(self, tolerance)
    }

    pub fn pseudo_inverse(&self, tolerance: Option<T::Real>) -> Result<Matrix<T>> {
        let out = Matrix::new(self.ncols(), self.nrows())?;
        ops::pseudo_inverse(self, &out, tolerance)?;
        Ok(out)
    }
}

impl<T: Scalar> Add for &Vector<T> {
    type Output = Vector<T>;
    fn add(self, rhs: &Vector<T>) -> Vector<T> {
        let out = check(Vector::new(self.len()));
        check(ops::add(self, rhs, &out));
        out
    }
}

impl<T: Scalar> Sub for &Vector<T> {
    type Output = Vector<T>;
    fn sub(self, rhs: &Vector<T>) -> Vector<T> {
        let out = check(Vector::new(self.len()));
        check(ops::sub(self, rhs, &out));
        out
    }
}

impl<T: Scalar> Neg for &Vector<T> {
    type Output = Vector<T>;
    fn neg(self) -> Vector<T> {
        let out = self.copy();
        check(ops::mul_scalar(&out, -T::ONE, &out));
        out
    }
}

impl<T: Scalar> Mul<T> for &Vector<T> {
    type Output = Vector<T>;
    fn mul(self, s: T) -> Vector<T> {
        let out = check(Vector::new(self.len()));
        check(ops::mul_scalar(self, s, &out));
        out
    }
}

impl<T: Scalar> Add for &Matrix<T> {
    type Output = Matrix<T>;
    fn add(self, rhs: &Matrix<T>) -> Matrix<T> {
        let out = check(Matrix::new(self.nrows(), self.ncols()));
        check(ops::add_mat(self, rhs, &out));
        out
    }
}

impl<T: Scalar> Sub for &Matrix<T> {
    type Output = Matrix<T>;
    fn sub(self, rhs: &Matrix<T>) -> Matrix<T> {
        let out = check(Matrix::new(self.nrows(), self.ncols()));
        check(ops::sub_mat(self, rhs, &out));
        out
    }
}

impl<T: Scalar> Neg for &Matrix<T> {
    type Output = Matrix<T>;
    fn neg(self) -> Matrix<T> {
        let out = self.copy();
        check(ops::mul_mat_scalar(&out, -T::ONE, &out));
        out
    }
}

impl<T: Scalar> Mul for &Matrix<T> {
    type Output = Matrix<T>;
    fn mul(self, rhs: &Matrix<T>) -> Matrix<T> {
        check(Matrix::mul(self, rhs))
    }
}

impl<T: Scalar> Mul<&Vector<T>> for &Matrix<T> {
    type Output = Vector<T>;
    fn mul(self, rhs: &Vector<T>) -> Vector<T> {
        check(self.mul_vec(rhs))
    }
}
