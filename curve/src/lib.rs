//! NIST P-256 (secp256r1) elliptic curve arithmetic.
//!
//! The curve `y^2 = x^3 - 3x + b` has prime order `n` slightly below its
//! coordinate field modulus `p`. Field elements come from `ark-secp256r1`;
//! the group law is implemented here with affine and complete projective
//! formulas. The crate also provides canonical big-endian encodings for both
//! fields and helpers for random sampling. The curve parameters and
//! generators are fixed to the values in the `affine` module.

mod affine;
mod basefield;
mod errors;
mod field;
mod group;
mod msm;
mod projective;
mod random;
mod scalarfield;

pub use affine::{Affine, COEFF_A, COEFF_B};
pub use basefield::{base_from_be_bytes, base_to_be_bytes, BaseField};
pub use errors::CurveError;
pub use field::checked_inverse;
pub use group::{Group, ScalarBits};
pub use msm::double_scalar_mul;
pub use projective::Projective;
pub use random::RandomField;
pub use scalarfield::{
    base_to_scalar, scalar_from_be_bytes, scalar_from_be_bytes_reduced, scalar_to_be_bytes,
    ScalarField,
};
