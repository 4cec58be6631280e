use ark_ff::{BigInteger, Field, PrimeField};
use num_bigint::BigUint;

use crate::errors::CurveError;

/// Multiplicative inverse that reports the additive identity as an error.
#[inline]
pub fn checked_inverse<F: Field>(value: &F) -> Result<F, CurveError> {
    value.inverse().ok_or(CurveError::DivisionByZero)
}

pub(crate) fn from_be_bytes_canonical<F: PrimeField>(bytes: &[u8]) -> Result<F, CurveError> {
    let value = BigUint::from_bytes_be(bytes);
    let modulus = BigUint::from_bytes_be(&F::MODULUS.to_bytes_be());
    if value >= modulus {
        return Err(CurveError::NonCanonical);
    }
    Ok(F::from_be_bytes_mod_order(bytes))
}

pub(crate) fn to_be_bytes<F: PrimeField>(value: &F) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    let start = bytes.len().saturating_sub(32);
    let tail = &bytes[start..];
    out[32 - tail.len()..].copy_from_slice(tail);
    out
}
