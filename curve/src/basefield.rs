use crate::errors::CurveError;
use crate::field::{from_be_bytes_canonical, to_be_bytes};

/// P-256 coordinate field,
/// p = 0xffffffff00000001000000000000000000000000ffffffffffffffffffffffff.
pub type BaseField = ark_secp256r1::Fq;

/// Decode a big-endian integer that must already be below the base field modulus.
///
/// Leading zero bytes are accepted, so inputs may be shorter or longer than
/// 32 bytes as long as the numeric value is canonical.
pub fn base_from_be_bytes(bytes: &[u8]) -> Result<BaseField, CurveError> {
    from_be_bytes_canonical(bytes)
}

/// Encode a base field element as 32 big-endian bytes.
pub fn base_to_be_bytes(value: &BaseField) -> [u8; 32] {
    to_be_bytes(value)
}
