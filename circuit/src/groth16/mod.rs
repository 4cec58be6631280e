//! Groth16 over BN254, on `ark-groth16`.
//!
//! Keys record the digest of the constraint matrices they were generated for.
//! The trusted setup, [`generate_parameters`], is compiled only with the
//! `setup` feature or under test.

mod keys;

use ark_bn254::{Bn254, Fr};
use ark_groth16::Groth16;
use ark_relations::r1cs::{ConstraintMatrices, SynthesisError};
use ark_std::UniformRand;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::r1cs::MatrixError;

pub use keys::{
    prepare_verifying_key, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey, PROOF_SIZE,
};

/// Errors raised while proving.
#[derive(Debug, Error)]
pub enum ProverError {
    #[error("key and witness disagree: {0}")]
    KeyWitnessMismatch(String),
    #[error("proof generation failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Errors raised while decoding or checking a proof.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("malformed proof: {0}")]
    Malformed(String),
    #[error("expected {expected} public inputs, found {found}")]
    PublicInputCount { expected: usize, found: usize },
}

/// The blinding scalars of one proof.
///
/// Drawn from the operating system for every proof and never reused.
pub struct ProverRandomness {
    r: Fr,
    s: Fr,
}

impl ProverRandomness {
    pub fn from_os_rng() -> Self {
        let mut rng = OsRng;
        Self {
            r: Fr::rand(&mut rng),
            s: Fr::rand(&mut rng),
        }
    }
}

/// Prove that `full_assignment` satisfies `matrices`.
///
/// `full_assignment` is `[1, instance..., witness...]`. The proving key must
/// have been generated for the same matrices.
pub fn prove(
    pk: &ProvingKey,
    matrices: &ConstraintMatrices<Fr>,
    full_assignment: &[Fr],
) -> Result<Proof, ProverError> {
    let num_variables = matrices.num_instance_variables + matrices.num_witness_variables;
    if full_assignment.len() != num_variables {
        return Err(ProverError::KeyWitnessMismatch(format!(
            "assignment has {} entries, constraint system has {num_variables} variables",
            full_assignment.len()
        )));
    }
    if pk.key.a_query.len() != num_variables
        || pk.key.l_query.len() != matrices.num_witness_variables
        || pk.key.vk.gamma_abc_g1.len() != matrices.num_instance_variables
    {
        return Err(ProverError::KeyWitnessMismatch(
            "proving key was generated for a different constraint system".into(),
        ));
    }

    let randomness = ProverRandomness::from_os_rng();
    let proof = Groth16::<Bn254>::create_proof_with_reduction_and_matrices(
        &pk.key,
        randomness.r,
        randomness.s,
        matrices,
        matrices.num_instance_variables,
        matrices.num_constraints,
        full_assignment,
    )?;
    Ok(Proof(proof))
}

/// Check `proof` against `public_inputs`, which exclude the constant one.
pub fn verify(
    pvk: &PreparedVerifyingKey,
    public_inputs: &[Fr],
    proof: &Proof,
) -> Result<bool, ProofError> {
    let expected = pvk.vk.num_public_inputs();
    if public_inputs.len() != expected {
        return Err(ProofError::PublicInputCount {
            expected,
            found: public_inputs.len(),
        });
    }
    Groth16::<Bn254>::verify_proof(&pvk.prepared, &proof.0, public_inputs)
        .map_err(|e| ProofError::Malformed(e.to_string()))
}

/// Run the circuit-specific trusted setup for `circuit`.
///
/// Returns the matrices the keys belong to alongside the proving key.
#[cfg(any(test, feature = "setup"))]
pub fn generate_parameters<C, R>(
    circuit: C,
    rng: &mut R,
) -> Result<(crate::r1cs::CircuitMatrices, ProvingKey), ProverError>
where
    C: ark_relations::r1cs::ConstraintSynthesizer<Fr> + Clone,
    R: rand::RngCore + rand::CryptoRng,
{
    use ark_snark::CircuitSpecificSetupSNARK;

    let matrices = crate::r1cs::synthesize_matrices(circuit.clone())?;
    let circuit_digest = matrices.digest()?;
    let (key, _) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)?;
    tracing::info!(
        constraints = matrices.num_constraints,
        variables = matrices.num_variables(),
        "generated Groth16 parameters"
    );
    Ok((matrices, ProvingKey { circuit_digest, key }))
}
