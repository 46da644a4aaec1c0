use thiserror::Error;

/// Errors reported by views, operations and factorizations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed construction parameters, overlapping destinations, or an illegal
    /// argument rejected by a kernel routine.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operand shapes are incompatible, or a square-only operation got a non-square
    /// matrix.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An index or sub-view window exceeds the bounds of its view.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// The operation is not defined for this object, e.g. solving with the LU factors
    /// of a rectangular matrix.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A factorization kernel reported a numerical failure.
    #[error("{routine} failed (info = {info}): {reason}")]
    FactorizationFailed {
        routine: &'static str,
        info: i32,
        reason: &'static str,
    },

    /// A kernel hit an exactly singular pivot.
    #[error("{routine}: the matrix is ill-conditioned (info = {info})")]
    IllConditioned { routine: &'static str, info: i32 },
}

/// Result alias used throughout `strata-la`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Map a kernel `info` code to an error, or `Ok(())` when it is zero.
    ///
    /// Negative codes name an illegal argument and become [`Error::InvalidArgument`].
    /// Positive codes become [`Error::FactorizationFailed`] for routines whose failure
    /// is a property of the input (`potrf`, `syev`, `sygv`, `gesvd`) and
    /// [`Error::IllConditioned`] for singular pivots (`getrf`, `getri`, `trsv`).
    pub fn kernel(routine: &'static str, info: i32) -> Result<()> {
        if info == 0 {
            return Ok(());
        }
        let err = if info < 0 {
            Error::InvalidArgument(format!("{routine}: argument {} had an illegal value", -info))
        } else {
            match routine {
                "potrf" => Error::FactorizationFailed {
                    routine,
                    info,
                    reason: "the matrix must be positive definite",
                },
                "syev" | "gesvd" => Error::FactorizationFailed {
                    routine,
                    info,
                    reason: "the algorithm failed to converge",
                },
                "sygv" => Error::FactorizationFailed {
                    routine,
                    info,
                    reason: "B must be positive definite and the algorithm must converge",
                },
                _ => Error::IllConditioned { routine, info },
            }
        };
        tracing::debug!(routine, info, error = %err, "kernel failure");
        Err(err)
    }

    /// Whether this is a numerical failure of the input, as opposed to a usage error.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Error::FactorizationFailed { .. } | Error::IllConditioned { .. })
    }

    pub(crate) fn dims(
        what: &str,
        expected: impl core::fmt::Display,
        got: impl core::fmt::Display,
    ) -> Self {
        Error::DimensionMismatch(format!("{what}: expected {expected}, got {got}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_codes() {
        assert_eq!(Error::kernel("getrf", 0), Ok(()));
        assert_eq!(
            Error::kernel("getri", 2),
            Err(Error::IllConditioned { routine: "getri", info: 2 })
        );
        let err = Error::kernel("potrf", 3).unwrap_err();
        assert!(err.is_numerical());
        assert!(err.to_string().contains("positive definite"));

        let err = Error::kernel("gemm", -4).unwrap_err();
        assert!(!err.is_numerical());
        assert_eq!(err.to_string(), "invalid argument: gemm: argument 4 had an illegal value");
    }

    #[test]
    fn display() {
        let err = Error::DimensionMismatch("add: lengths 2 and 3".into());
        assert_eq!(err.to_string(), "dimension mismatch: add: lengths 2 and 3");
        let err = Error::IllConditioned { routine: "trsv", info: 1 };
        assert_eq!(err.to_string(), "trsv: the matrix is ill-conditioned (info = 1)");
    }
}
