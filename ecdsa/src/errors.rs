//! Error types for the ECDSA implementation.

use thiserror::Error;

/// Errors that can occur while decoding keys and signatures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum EcdsaError {
    /// A point that cannot serve as a public key was encountered.
    ///
    /// This error occurs when:
    /// - The coordinates are not canonical base field elements
    /// - The point does not satisfy the curve equation
    /// - The point is the point at infinity
    #[error("invalid public key point")]
    InvalidPoint,
    /// A scalar is zero or not below the group order.
    ///
    /// Applies to signing keys and both signature components.
    #[error("scalar is zero or out of range")]
    InvalidScalar,
}
