//! Witness data for ECDSA verification.
//!
//! Turns the five hex strings of a request into typed values, derives the
//! public inputs, and synthesizes the full assignment for the prover.

use std::fs;
use std::path::{Path, PathBuf};

use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintMatrices, SynthesisError};
use curve::{
    base_from_be_bytes, base_to_scalar, checked_inverse, double_scalar_mul, scalar_from_be_bytes,
    scalar_from_be_bytes_reduced, ScalarField,
};
use ecdsa::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ecdsa_circuit::{public_inputs, EcdsaAssignment, EcdsaCircuit, NUM_PUBLIC_INPUTS};
use crate::r1cs::{check_assignment, synthesize_assignment, Assignment, MatrixError};

/// Errors raised while decoding a request or building its witness.
#[derive(Debug, Error)]
pub enum WitnessError {
    #[error("{field} is not valid hex: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },
    #[error("{field} must be a nonzero integer below the group order")]
    InvalidSignatureComponent { field: &'static str },
    #[error("{0}")]
    InvalidPublicKey(String),
    #[error("signature does not verify")]
    Unsatisfiable,
    #[error("witness does not match the loaded constraint system: {0}")]
    ShapeMismatch(String),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("circuit synthesis failed: {0}")]
    Synthesis(SynthesisError),
    #[error(transparent)]
    Matrix(MatrixError),
}

/// A verification request: five hex strings, big-endian, no `0x` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProveInput {
    #[serde(rename = "msgHash")]
    pub msg_hash: String,
    pub r: String,
    pub s: String,
    #[serde(rename = "pubX")]
    pub pub_x: String,
    #[serde(rename = "pubY")]
    pub pub_y: String,
}

impl ProveInput {
    /// Read a request from a JSON file such as `witness_input.json`.
    pub fn from_json_file(path: &Path) -> Result<Self, WitnessError> {
        let bytes = fs::read(path).map_err(|source| WitnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| WitnessError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the request as pretty-printed JSON.
    pub fn write_json_file(&self, path: &Path) -> Result<(), WitnessError> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| WitnessError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| WitnessError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Encode a digest, signature and public key as a request.
    pub fn from_parts(digest: &[u8], signature: &Signature, public_key: &VerifyingKey) -> Self {
        let sig = signature.to_bytes();
        let (x, y) = public_key.to_coordinates_be();
        Self {
            msg_hash: hex::encode(digest),
            r: hex::encode(&sig[..32]),
            s: hex::encode(&sig[32..]),
            pub_x: hex::encode(x),
            pub_y: hex::encode(y),
        }
    }
}

/// A request after hex decoding and range checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedInput {
    /// Message hash reduced modulo the group order.
    pub z: ScalarField,
    pub signature: Signature,
    pub public_key: VerifyingKey,
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, WitnessError> {
    if value.is_empty() {
        return Err(WitnessError::InvalidEncoding {
            field,
            reason: "empty string".into(),
        });
    }
    hex::decode(value).map_err(|e| WitnessError::InvalidEncoding {
        field,
        reason: e.to_string(),
    })
}

fn decode_signature_component(
    field: &'static str,
    bytes: &[u8],
) -> Result<ScalarField, WitnessError> {
    let scalar = scalar_from_be_bytes(bytes)
        .map_err(|_| WitnessError::InvalidSignatureComponent { field })?;
    if scalar == ScalarField::from(0u64) {
        return Err(WitnessError::InvalidSignatureComponent { field });
    }
    Ok(scalar)
}

/// Decode and range-check every field of a request.
///
/// All five fields are hex decoded before any range check, so an encoding
/// error is reported ahead of a value error.
pub fn decode(input: &ProveInput) -> Result<DecodedInput, WitnessError> {
    let msg_hash = decode_hex("msgHash", &input.msg_hash)?;
    let r = decode_hex("r", &input.r)?;
    let s = decode_hex("s", &input.s)?;
    let pub_x = decode_hex("pubX", &input.pub_x)?;
    let pub_y = decode_hex("pubY", &input.pub_y)?;

    let z = scalar_from_be_bytes_reduced(&msg_hash);
    let r = decode_signature_component("r", &r)?;
    let s = decode_signature_component("s", &s)?;
    let signature = Signature::new(r, s)
        .map_err(|_| WitnessError::InvalidSignatureComponent { field: "r" })?;

    let x = base_from_be_bytes(&pub_x).map_err(|_| {
        WitnessError::InvalidPublicKey("pubX is not below the field modulus".into())
    })?;
    let y = base_from_be_bytes(&pub_y).map_err(|_| {
        WitnessError::InvalidPublicKey("pubY is not below the field modulus".into())
    })?;
    let public_key = VerifyingKey::from_coordinates(x, y)
        .map_err(|_| WitnessError::InvalidPublicKey("public key is not on the curve".into()))?;

    Ok(DecodedInput {
        z,
        signature,
        public_key,
    })
}

/// The eight public inputs, derived from the request alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicInputs([Fr; NUM_PUBLIC_INPUTS]);

impl PublicInputs {
    pub fn from_decoded(input: &DecodedInput) -> Self {
        Self(public_inputs(
            &input.z,
            &input.signature.r(),
            &input.public_key.as_affine(),
        ))
    }

    pub fn as_slice(&self) -> &[Fr] {
        &self.0
    }
}

/// A satisfying assignment for the loaded constraint system.
#[derive(Clone, Debug)]
pub struct Witness {
    assignment: Assignment,
}

impl Witness {
    /// Public inputs as synthesized, without the leading one.
    pub fn instance(&self) -> &[Fr] {
        self.assignment.public_inputs()
    }

    /// The variable vector `z = [1, instance..., witness...]`.
    pub fn full_assignment(&self) -> Vec<Fr> {
        self.assignment.full()
    }
}

/// Compute the commitment point and synthesize the circuit with values.
///
/// `R = u1 * G + u2 * Q` with `u1 = z / s` and `u2 = r / s` is computed with
/// a fixed-iteration ladder, since `s` is private. A signature that fails
/// the native check is rejected before synthesis.
pub fn build_witness(
    input: &DecodedInput,
    matrices: &ConstraintMatrices<Fr>,
) -> Result<Witness, WitnessError> {
    let r = input.signature.r();
    let s = input.signature.s();
    let public_key = input.public_key.as_affine();

    let w = checked_inverse(&s).map_err(|_| WitnessError::Unsatisfiable)?;
    let commitment = double_scalar_mul(&(input.z * w), &(r * w), &public_key).to_affine();
    if commitment.is_infinity() || base_to_scalar(&commitment.x) != r {
        return Err(WitnessError::Unsatisfiable);
    }

    let circuit = EcdsaCircuit::with_assignment(EcdsaAssignment {
        z: input.z,
        r,
        s,
        public_key,
        commitment,
    });
    let assignment = synthesize_assignment(circuit).map_err(|e| match e {
        SynthesisError::DivisionByZero | SynthesisError::Unsatisfiable => {
            WitnessError::Unsatisfiable
        }
        other => WitnessError::Synthesis(other),
    })?;

    if assignment.instance.len() != matrices.num_instance_variables
        || assignment.witness.len() != matrices.num_witness_variables
        || assignment.num_constraints != matrices.num_constraints
    {
        return Err(WitnessError::ShapeMismatch(format!(
            "synthesized {} constraints over {} + {} variables, loaded {} over {} + {}",
            assignment.num_constraints,
            assignment.instance.len(),
            assignment.witness.len(),
            matrices.num_constraints,
            matrices.num_instance_variables,
            matrices.num_witness_variables
        )));
    }

    match check_assignment(matrices, &assignment.full()) {
        Ok(()) => {}
        Err(MatrixError::Unsatisfied { index }) => {
            debug!(index, "constraint not satisfied");
            return Err(WitnessError::Unsatisfiable);
        }
        Err(other) => return Err(WitnessError::Matrix(other)),
    }

    Ok(Witness { assignment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::MATRICES;
    use curve::BaseField;
    use ecdsa::{hash_message, SigningKey};
    use once_cell::sync::Lazy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    static CIRCUIT: Lazy<ConstraintMatrices<Fr>> = Lazy::new(|| MATRICES.clone().into());

    fn signed_input(seed: u64, msg: &[u8]) -> ProveInput {
        let mut rng = StdRng::seed_from_u64(seed);
        let sk = SigningKey::random(&mut rng);
        let digest = hash_message(msg);
        let sig = sk.sign_prehash(&mut rng, &ecdsa::hash_to_scalar(&digest));
        ProveInput::from_parts(&digest, &sig, &sk.verifying_key())
    }

    #[test]
    fn test_json_field_names() {
        let input = signed_input(1, b"json");
        let json = serde_json::to_value(&input).unwrap();
        for key in ["msgHash", "r", "s", "pubX", "pubY"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_decode_accepts_valid_input() {
        let input = signed_input(2, b"decode");
        let decoded = decode(&input).unwrap();
        assert!(decoded
            .public_key
            .verify_prehash(&decoded.z, &decoded.signature));
    }

    #[test]
    fn test_decode_rejects_bad_hex() {
        let mut input = signed_input(3, b"hex");
        input.r = "abc".into();
        assert!(matches!(
            decode(&input),
            Err(WitnessError::InvalidEncoding { field: "r", .. })
        ));

        let mut input = signed_input(3, b"hex");
        input.pub_x = format!("0x{}", input.pub_x);
        assert!(matches!(
            decode(&input),
            Err(WitnessError::InvalidEncoding { field: "pubX", .. })
        ));

        let mut input = signed_input(3, b"hex");
        input.msg_hash = String::new();
        assert!(matches!(
            decode(&input),
            Err(WitnessError::InvalidEncoding { field: "msgHash", .. })
        ));
    }

    #[test]
    fn test_decode_rejects_out_of_range_components() {
        let mut input = signed_input(4, b"range");
        input.s = "00".repeat(32);
        assert!(matches!(
            decode(&input),
            Err(WitnessError::InvalidSignatureComponent { field: "s" })
        ));

        // n - 1 is the largest valid component, n itself is rejected.
        let mut input = signed_input(4, b"range");
        let n_minus_one = curve::scalar_to_be_bytes(&-ScalarField::from(1u64));
        input.s = hex::encode(n_minus_one);
        assert!(decode(&input).is_ok());
        let mut n = n_minus_one;
        n[31] += 1;
        input.s = hex::encode(n);
        assert!(matches!(
            decode(&input),
            Err(WitnessError::InvalidSignatureComponent { field: "s" })
        ));

        let mut input = signed_input(4, b"range");
        input.r = "ff".repeat(32);
        assert!(matches!(
            decode(&input),
            Err(WitnessError::InvalidSignatureComponent { field: "r" })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_public_key() {
        let mut input = signed_input(5, b"key");
        input.pub_y = hex::encode(curve::base_to_be_bytes(&BaseField::from(5u64)));
        assert!(matches!(decode(&input), Err(WitnessError::InvalidPublicKey(_))));

        let mut input = signed_input(5, b"key");
        input.pub_x = "ff".repeat(32);
        assert!(matches!(decode(&input), Err(WitnessError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_message_hash_is_reduced() {
        let mut input = signed_input(6, b"reduce");
        input.msg_hash = "ff".repeat(32);
        let decoded = decode(&input).unwrap();
        assert_eq!(decoded.z, scalar_from_be_bytes_reduced(&[0xff; 32]));
    }

    #[test]
    fn test_build_witness_for_valid_signature() {
        let decoded = decode(&signed_input(7, b"witness")).unwrap();
        let witness = build_witness(&decoded, &CIRCUIT).unwrap();
        assert_eq!(witness.instance(), PublicInputs::from_decoded(&decoded).as_slice());
        MATRICES.check_assignment(&witness.full_assignment()).unwrap();
    }

    #[test]
    fn test_build_witness_rejects_wrong_message() {
        let mut input = signed_input(8, b"original");
        input.msg_hash = hex::encode(hash_message(b"forged"));
        let decoded = decode(&input).unwrap();
        assert!(matches!(
            build_witness(&decoded, &CIRCUIT),
            Err(WitnessError::Unsatisfiable)
        ));
    }

    #[test]
    fn test_native_and_circuit_agree() {
        for seed in 10..14u64 {
            let mut input = signed_input(seed, b"agree");
            if seed % 2 == 1 {
                input.msg_hash = hex::encode(hash_message(b"disagree"));
            }
            let decoded = decode(&input).unwrap();
            let native = decoded
                .public_key
                .verify_prehash(&decoded.z, &decoded.signature);
            let in_circuit = build_witness(&decoded, &CIRCUIT).is_ok();
            assert_eq!(native, in_circuit, "seed {seed}");
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let decoded = decode(&signed_input(9, b"shape")).unwrap();
        let mut other = CIRCUIT.clone();
        other.num_witness_variables += 1;
        assert!(matches!(
            build_witness(&decoded, &other),
            Err(WitnessError::ShapeMismatch(_))
        ));
    }
}
