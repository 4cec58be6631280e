//! Binary artifact codec and key material loader.
//!
//! Every artifact is wrapped in a fixed envelope:
//!
//! ```text
//! magic "EZK1" | version u16 | kind u8 | reserved u8 | payload length u64
//! | SHA3-256(payload) [32] | payload
//! ```
//!
//! Integers are little-endian. The payload is the arkworks canonical
//! serialization of the artifact. Every header field is checked before the
//! payload is interpreted.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ark_bn254::Fr;
use ark_ec::AffineRepr;
use ark_relations::r1cs::ConstraintMatrices;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Valid};
use sha3::{Digest, Sha3_256};
use thiserror::Error;
use tracing::debug;

use crate::config::ArtifactPaths;
use crate::groth16::{prepare_verifying_key, PreparedVerifyingKey, ProvingKey, VerifyingKey};
use crate::r1cs::CircuitMatrices;

pub const MAGIC: [u8; 4] = *b"EZK1";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 4 + 2 + 1 + 1 + 8 + 32;

/// Errors raised while reading or checking artifacts.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Corrupt(String),
    #[error("{0}")]
    Mismatch(String),
}

/// What an envelope holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ArtifactKind {
    ConstraintSystem = 1,
    ProvingKey = 2,
    VerifyingKey = 3,
}

impl ArtifactKind {
    fn name(self) -> &'static str {
        match self {
            ArtifactKind::ConstraintSystem => "constraint system",
            ArtifactKind::ProvingKey => "proving key",
            ArtifactKind::VerifyingKey => "verifying key",
        }
    }
}

/// Wrap a payload in an envelope.
pub fn encode_envelope(kind: ArtifactKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.push(kind as u8);
    out.push(0);
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&Sha3_256::digest(payload));
    out.extend_from_slice(payload);
    out
}

/// Check an envelope and return its payload.
pub fn decode_envelope(kind: ArtifactKind, bytes: &[u8]) -> Result<&[u8], LoadError> {
    let corrupt = |detail: String| LoadError::Corrupt(format!("{}: {detail}", kind.name()));

    if bytes.len() < HEADER_LEN {
        return Err(corrupt(format!("truncated header ({} bytes)", bytes.len())));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if header[..4] != MAGIC {
        return Err(corrupt("bad magic".into()));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {version}")));
    }
    if header[6] != kind as u8 {
        return Err(corrupt(format!("unexpected artifact kind {}", header[6])));
    }
    if header[7] != 0 {
        return Err(corrupt("reserved byte is set".into()));
    }
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[8..16]);
    let declared = u64::from_le_bytes(len_bytes);
    if declared != payload.len() as u64 {
        return Err(corrupt(format!(
            "payload length {} does not match header {declared}",
            payload.len()
        )));
    }
    if Sha3_256::digest(payload).as_slice() != &header[16..48] {
        return Err(corrupt("payload digest mismatch".into()));
    }
    Ok(payload)
}

fn serialize<T: CanonicalSerialize>(
    kind: ArtifactKind,
    value: &T,
    compress: bool,
) -> Result<Vec<u8>, LoadError> {
    let mut payload = Vec::new();
    let result = if compress {
        value.serialize_compressed(&mut payload)
    } else {
        value.serialize_uncompressed(&mut payload)
    };
    result.map_err(|e| LoadError::Corrupt(format!("{}: {e}", kind.name())))?;
    Ok(encode_envelope(kind, &payload))
}

pub fn encode_constraint_system(matrices: &CircuitMatrices) -> Result<Vec<u8>, LoadError> {
    serialize(ArtifactKind::ConstraintSystem, matrices, true)
}

pub fn encode_proving_key(pk: &ProvingKey) -> Result<Vec<u8>, LoadError> {
    serialize(ArtifactKind::ProvingKey, pk, false)
}

pub fn encode_verifying_key(vk: &VerifyingKey) -> Result<Vec<u8>, LoadError> {
    serialize(ArtifactKind::VerifyingKey, vk, true)
}

/// Deserialize a payload, rejecting trailing bytes.
fn deserialize<T: CanonicalDeserialize>(
    kind: ArtifactKind,
    mut payload: &[u8],
    read: impl FnOnce(&mut &[u8]) -> Result<T, ark_serialize::SerializationError>,
) -> Result<T, LoadError> {
    let value = read(&mut payload).map_err(|e| LoadError::Corrupt(format!("{}: {e}", kind.name())))?;
    if !payload.is_empty() {
        return Err(LoadError::Corrupt(format!(
            "{}: {} trailing bytes",
            kind.name(),
            payload.len()
        )));
    }
    Ok(value)
}

pub fn load_constraint_system(bytes: &[u8]) -> Result<CircuitMatrices, LoadError> {
    let kind = ArtifactKind::ConstraintSystem;
    let payload = decode_envelope(kind, bytes)?;
    let matrices = deserialize(kind, payload, |r| CircuitMatrices::deserialize_compressed(r))?;
    matrices
        .validate()
        .map_err(|e| LoadError::Corrupt(format!("{}: {e}", kind.name())))?;
    Ok(matrices)
}

/// The proving key is decoded without the per-point checks of
/// `deserialize_uncompressed`, then every point is checked to be on its
/// curve and the head of each query to be in the prime-order subgroup.
pub fn load_proving_key(bytes: &[u8]) -> Result<ProvingKey, LoadError> {
    let kind = ArtifactKind::ProvingKey;
    let payload = decode_envelope(kind, bytes)?;
    let pk = deserialize(kind, payload, |r| {
        ProvingKey::deserialize_uncompressed_unchecked(r)
    })?;
    check_proving_key_points(&pk)
        .map_err(|detail| LoadError::Corrupt(format!("{}: {detail}", kind.name())))?;
    Ok(pk)
}

fn check_query<P: AffineRepr>(name: &str, query: &[P]) -> Result<(), String> {
    if let Some(index) = query.iter().position(|point| !point.is_on_curve()) {
        return Err(format!("{name}[{index}] is not on the curve"));
    }
    match query.first() {
        Some(head) if !head.is_in_correct_subgroup_assuming_on_curve() => {
            Err(format!("{name}[0] is not in the prime-order subgroup"))
        }
        _ => Ok(()),
    }
}

fn check_proving_key_points(pk: &ProvingKey) -> Result<(), String> {
    let key = &pk.key;
    key.vk.check().map_err(|e| format!("embedded verifying key: {e}"))?;
    key.beta_g1.check().map_err(|e| format!("beta_g1: {e}"))?;
    key.delta_g1.check().map_err(|e| format!("delta_g1: {e}"))?;
    check_query("a_query", &key.a_query)?;
    check_query("b_g1_query", &key.b_g1_query)?;
    check_query("b_g2_query", &key.b_g2_query)?;
    check_query("h_query", &key.h_query)?;
    check_query("l_query", &key.l_query)
}

pub fn load_verifying_key(bytes: &[u8]) -> Result<VerifyingKey, LoadError> {
    let kind = ArtifactKind::VerifyingKey;
    let payload = decode_envelope(kind, bytes)?;
    deserialize(kind, payload, |r| VerifyingKey::deserialize_compressed(r))
}

/// Read a whole artifact file.
pub fn read_artifact(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a whole artifact file.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), LoadError> {
    fs::write(path, bytes).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything the prover and verifier need, loaded and cross-checked.
pub struct KeyMaterial {
    /// The constraint matrices in the form the prover consumes.
    pub matrices: ConstraintMatrices<Fr>,
    pub circuit_digest: [u8; 32],
    pub pk: ProvingKey,
    pub pvk: PreparedVerifyingKey,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("constraints", &self.matrices.num_constraints)
            .field("instance_variables", &self.matrices.num_instance_variables)
            .field("witness_variables", &self.matrices.num_witness_variables)
            .field("circuit_digest", &hex::encode(self.circuit_digest))
            .finish()
    }
}

impl KeyMaterial {
    /// Assemble and cross-check already decoded artifacts.
    pub fn new(matrices: CircuitMatrices, pk: ProvingKey, vk: VerifyingKey) -> Result<Self, LoadError> {
        let digest = matrices
            .digest()
            .map_err(|e| LoadError::Corrupt(format!("constraint system: {e}")))?;
        if vk.circuit_digest != digest || pk.circuit_digest != digest {
            return Err(LoadError::Mismatch(
                "keys were generated for a different circuit".into(),
            ));
        }
        if pk.key.vk != vk.key {
            return Err(LoadError::Mismatch(
                "proving key and verifying key do not belong together".into(),
            ));
        }
        if vk.key.gamma_abc_g1.len() != matrices.num_instance_variables {
            return Err(LoadError::Mismatch(format!(
                "verifying key expects {} instance variables, constraint system has {}",
                vk.key.gamma_abc_g1.len(),
                matrices.num_instance_variables
            )));
        }
        if pk.key.a_query.len() != matrices.num_variables()
            || pk.key.l_query.len() != matrices.num_witness_variables
        {
            return Err(LoadError::Mismatch(format!(
                "proving key covers {} variables, constraint system has {}",
                pk.key.a_query.len(),
                matrices.num_variables()
            )));
        }

        let pvk = prepare_verifying_key(&vk);
        Ok(Self {
            matrices: matrices.into(),
            circuit_digest: digest,
            pk,
            pvk,
        })
    }

    /// Read, decode and cross-check the three binary artifacts.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, LoadError> {
        let matrices = load_constraint_system(&read_artifact(&paths.r1cs)?)?;
        let pk = load_proving_key(&read_artifact(&paths.proving_key)?)?;
        let vk = load_verifying_key(&read_artifact(&paths.verifying_key)?)?;
        debug!(
            constraints = matrices.num_constraints,
            variables = matrices.num_variables(),
            "artifacts loaded"
        );
        Self::new(matrices, pk, vk)
    }

    /// Write the three binary artifacts.
    pub fn write(&self, paths: &ArtifactPaths) -> Result<(), LoadError> {
        let matrices = CircuitMatrices::from(self.matrices.clone());
        write_artifact(&paths.r1cs, &encode_constraint_system(&matrices)?)?;
        write_artifact(&paths.proving_key, &encode_proving_key(&self.pk)?)?;
        write_artifact(&paths.verifying_key, &encode_verifying_key(&self.pvk.vk)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{scratch_dir, TOY};
    use ark_bn254::{Fq, G1Affine, G2Affine};
    use ark_ff::One;

    #[test]
    fn test_envelope_checks() {
        let payload = b"payload bytes".to_vec();
        let bytes = encode_envelope(ArtifactKind::VerifyingKey, &payload);
        assert_eq!(
            decode_envelope(ArtifactKind::VerifyingKey, &bytes).unwrap(),
            &payload[..]
        );

        let wrong_kind = decode_envelope(ArtifactKind::ProvingKey, &bytes);
        assert!(matches!(wrong_kind, Err(LoadError::Corrupt(_))));

        for index in [0, 4, 7, 8, 20, HEADER_LEN] {
            let mut tampered = bytes.clone();
            tampered[index] ^= 1;
            assert!(
                matches!(
                    decode_envelope(ArtifactKind::VerifyingKey, &tampered),
                    Err(LoadError::Corrupt(_))
                ),
                "byte {index}"
            );
        }

        let mut extended = bytes.clone();
        extended.push(0);
        assert!(decode_envelope(ArtifactKind::VerifyingKey, &extended).is_err());
        assert!(decode_envelope(ArtifactKind::VerifyingKey, &bytes[..10]).is_err());
    }

    fn toy_material() -> KeyMaterial {
        let (matrices, pk) = TOY.clone();
        let vk = pk.verifying_key();
        KeyMaterial::new(matrices, pk, vk).unwrap()
    }

    #[test]
    fn test_artifacts_roundtrip() {
        let (matrices, pk) = &*TOY;
        let vk = pk.verifying_key();
        let loaded_matrices =
            load_constraint_system(&encode_constraint_system(matrices).unwrap()).unwrap();
        let loaded_pk = load_proving_key(&encode_proving_key(pk).unwrap()).unwrap();
        let loaded_vk = load_verifying_key(&encode_verifying_key(&vk).unwrap()).unwrap();
        assert_eq!(&loaded_matrices, matrices);
        assert_eq!(&loaded_pk, pk);
        assert_eq!(loaded_vk, vk);

        let material = KeyMaterial::new(loaded_matrices, loaded_pk, loaded_vk).unwrap();
        assert_eq!(material.pvk.vk, vk);
        assert_eq!(material.circuit_digest, matrices.digest().unwrap());
    }

    #[test]
    fn test_write_and_load() {
        let dir = scratch_dir("artifacts-write");
        let paths = ArtifactPaths::in_dir(&dir);
        let material = toy_material();
        material.write(&paths).unwrap();
        let loaded = KeyMaterial::load(&paths).unwrap();
        assert_eq!(loaded.pk, material.pk);
        assert_eq!(loaded.circuit_digest, material.circuit_digest);
        assert_eq!(loaded.matrices.num_constraints, material.matrices.num_constraints);
    }

    #[test]
    fn test_mismatched_keys() {
        let (matrices, pk) = TOY.clone();
        let mut vk = pk.verifying_key();
        vk.circuit_digest = [0u8; 32];
        assert!(matches!(
            KeyMaterial::new(matrices.clone(), pk.clone(), vk),
            Err(LoadError::Mismatch(_))
        ));

        let mut other = pk.clone();
        other.key.vk.alpha_g1 = other.key.beta_g1;
        assert!(matches!(
            KeyMaterial::new(matrices.clone(), other, pk.verifying_key()),
            Err(LoadError::Mismatch(_))
        ));

        let mut short = pk.clone();
        short.key.l_query.pop();
        assert!(matches!(
            KeyMaterial::new(matrices, short, pk.verifying_key()),
            Err(LoadError::Mismatch(_))
        ));
    }

    /// Re-encode `pk` with one point replaced by a point off the curve.
    /// The envelope digest is recomputed, so only the point check can catch it.
    fn encode_with_bad_point(tamper: impl FnOnce(&mut ProvingKey)) -> Vec<u8> {
        let mut pk = TOY.1.clone();
        tamper(&mut pk);
        encode_proving_key(&pk).unwrap()
    }

    fn off_curve_g1() -> G1Affine {
        let g = G1Affine::generator();
        G1Affine::new_unchecked(g.x, g.y + Fq::one())
    }

    #[test]
    fn test_proving_key_off_curve_points_are_corrupt() {
        let cases: Vec<Box<dyn FnOnce(&mut ProvingKey)>> = vec![
            Box::new(|pk| pk.key.a_query[1] = off_curve_g1()),
            Box::new(|pk| pk.key.b_g1_query[0] = off_curve_g1()),
            Box::new(|pk| pk.key.h_query[0] = off_curve_g1()),
            Box::new(|pk| pk.key.l_query[0] = off_curve_g1()),
            Box::new(|pk| pk.key.delta_g1 = off_curve_g1()),
            Box::new(|pk| pk.key.vk.alpha_g1 = off_curve_g1()),
            Box::new(|pk| {
                let g = G2Affine::generator();
                pk.key.b_g2_query[0] = G2Affine::new_unchecked(g.x, g.y + g.y);
            }),
        ];
        for (case, tamper) in cases.into_iter().enumerate() {
            let bytes = encode_with_bad_point(tamper);
            assert!(
                matches!(load_proving_key(&bytes), Err(LoadError::Corrupt(_))),
                "case {case}"
            );
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("ecdsa-verifier-no-such-artifact.bin");
        assert!(matches!(read_artifact(&path), Err(LoadError::Io { .. })));
    }
}
