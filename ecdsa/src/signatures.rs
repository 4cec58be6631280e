//! Signature type and message hashing for ECDSA.

use curve::{ScalarField, scalar_from_be_bytes, scalar_from_be_bytes_reduced, scalar_to_be_bytes};
use sha2::{Digest, Sha256};

use crate::constants::{DIGEST_SIZE, SIG_SIZE};
use crate::errors::EcdsaError;

/// An ECDSA signature `(r, s)`.
///
/// Both components are non-zero scalars below the group order. `r` is the
/// x-coordinate of the nonce point `k * G` reduced modulo `n`, and
/// `s = k^-1 * (z + r * sk)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: ScalarField,
    s: ScalarField,
}

impl Signature {
    /// Build a signature from its components, rejecting zero values.
    pub fn new(r: ScalarField, s: ScalarField) -> Result<Self, EcdsaError> {
        if r == ScalarField::from(0u64) || s == ScalarField::from(0u64) {
            return Err(EcdsaError::InvalidScalar);
        }
        Ok(Self { r, s })
    }

    /// The `r` component.
    pub fn r(&self) -> ScalarField {
        self.r
    }

    /// The `s` component.
    pub fn s(&self) -> ScalarField {
        self.s
    }

    /// Decode `r || s`, each 32 big-endian bytes.
    pub fn from_bytes(bytes: &[u8; SIG_SIZE]) -> Result<Self, EcdsaError> {
        let r = scalar_from_be_bytes(&bytes[..32]).map_err(|_| EcdsaError::InvalidScalar)?;
        let s = scalar_from_be_bytes(&bytes[32..]).map_err(|_| EcdsaError::InvalidScalar)?;
        Self::new(r, s)
    }

    /// Encode as `r || s`, each 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; SIG_SIZE] {
        let mut out = [0u8; SIG_SIZE];
        out[..32].copy_from_slice(&scalar_to_be_bytes(&self.r));
        out[32..].copy_from_slice(&scalar_to_be_bytes(&self.s));
        out
    }
}

/// SHA-256 digest of a message.
pub fn hash_message(msg: &[u8]) -> [u8; DIGEST_SIZE] {
    Sha256::digest(msg).into()
}

/// Interpret a digest as a big-endian integer reduced modulo the group order.
pub fn hash_to_scalar(digest: &[u8]) -> ScalarField {
    scalar_from_be_bytes_reduced(digest)
}
