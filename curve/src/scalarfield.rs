//! Scalar field of the curve: integers modulo the group order.
//! n = 0xffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551
//!
//! The group order is smaller than the coordinate field modulus, by less
//! than 2^127, so an x-coordinate maps to a scalar by one conditional
//! subtraction of `n`.

use ark_ff::PrimeField;

use crate::basefield::{base_to_be_bytes, BaseField};
use crate::errors::CurveError;
use crate::field::{from_be_bytes_canonical, to_be_bytes};

/// Scalar field element for the curve.
pub type ScalarField = ark_secp256r1::Fr;

/// Decode a big-endian integer that must already be below the group order.
pub fn scalar_from_be_bytes(bytes: &[u8]) -> Result<ScalarField, CurveError> {
    from_be_bytes_canonical(bytes)
}

/// Interpret arbitrary big-endian bytes as an integer reduced modulo the group order.
pub fn scalar_from_be_bytes_reduced(bytes: &[u8]) -> ScalarField {
    ScalarField::from_be_bytes_mod_order(bytes)
}

/// Encode a scalar as 32 big-endian bytes.
pub fn scalar_to_be_bytes(value: &ScalarField) -> [u8; 32] {
    to_be_bytes(value)
}

/// Map a coordinate to `x mod n`, the ECDSA `r` of a point with that x.
pub fn base_to_scalar(value: &BaseField) -> ScalarField {
    ScalarField::from_be_bytes_mod_order(&base_to_be_bytes(value))
}
