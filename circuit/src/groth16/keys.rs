//! Groth16 key and proof types.
//!
//! The arkworks keys are wrapped together with the digest of the constraint
//! matrices they were generated for.

use ark_bn254::Bn254;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::groth16::ProofError;

/// Size of a compressed proof: two G1 points and one G2 point.
pub const PROOF_SIZE: usize = 128;

/// Groth16 verifying key, bound to one constraint system by its digest.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct VerifyingKey {
    /// SHA3-256 of the serialized constraint matrices.
    pub circuit_digest: [u8; 32],
    pub key: ark_groth16::VerifyingKey<Bn254>,
}

impl VerifyingKey {
    /// Number of public inputs the key accepts, excluding the constant one.
    pub fn num_public_inputs(&self) -> usize {
        self.key.gamma_abc_g1.len().saturating_sub(1)
    }
}

/// Groth16 proving key.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ProvingKey {
    pub circuit_digest: [u8; 32],
    pub key: ark_groth16::ProvingKey<Bn254>,
}

impl ProvingKey {
    /// The verifying half, carrying the same digest.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            circuit_digest: self.circuit_digest,
            key: self.key.vk.clone(),
        }
    }
}

/// A verifying key with the pairing-side precomputation done once.
#[derive(Clone, Debug)]
pub struct PreparedVerifyingKey {
    pub vk: VerifyingKey,
    pub prepared: ark_groth16::PreparedVerifyingKey<Bn254>,
}

pub fn prepare_verifying_key(vk: &VerifyingKey) -> PreparedVerifyingKey {
    PreparedVerifyingKey {
        vk: vk.clone(),
        prepared: ark_groth16::prepare_verifying_key(&vk.key),
    }
}

/// A Groth16 proof `(A, B, C)`.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof(pub ark_groth16::Proof<Bn254>);

impl Proof {
    /// Compressed encoding, [`PROOF_SIZE`] bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProofError> {
        let mut bytes = Vec::with_capacity(PROOF_SIZE);
        self.serialize_compressed(&mut bytes)
            .map_err(|e| ProofError::Malformed(e.to_string()))?;
        Ok(bytes)
    }

    /// Decode a compressed proof, checking that every point is on its curve
    /// and in the prime-order subgroup.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        if bytes.len() != PROOF_SIZE {
            return Err(ProofError::Malformed(format!(
                "expected {PROOF_SIZE} bytes, found {}",
                bytes.len()
            )));
        }
        Self::deserialize_compressed(bytes).map_err(|e| ProofError::Malformed(e.to_string()))
    }
}
