//! Error types for field and curve arithmetic.

use thiserror::Error;

/// Errors raised by checked field and curve operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    /// Inversion of the additive identity.
    #[error("division by zero")]
    DivisionByZero,
    /// Raw coordinates that do not satisfy the curve equation.
    #[error("point is not on the curve")]
    NotOnCurve,
    /// The identity was supplied where a finite point is required.
    #[error("point at infinity is not allowed here")]
    PointAtInfinity,
    /// An encoded integer is not below the field modulus.
    #[error("value is not below the field modulus")]
    NonCanonical,
}
