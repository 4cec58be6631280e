//! One verification request, from hex strings to a checked proof.
//!
//! A request moves through [`Stage`]s in order. The first failure stops it and
//! is reported with the last stage reached. Nothing is retried.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, info_span};

use crate::artifacts::KeyMaterial;
use crate::cache::KeyCache;
use crate::config::VerifierConfig;
use crate::errors::{ErrorKind, VerifierError};
use crate::groth16::{self, PreparedVerifyingKey, Proof};
use crate::witness::{build_witness, decode, ProveInput, PublicInputs};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Received,
    Decoded,
    WitnessBuilt,
    Proved,
    Verified,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Decoded => "decoded",
            Stage::WitnessBuilt => "witness built",
            Stage::Proved => "proved",
            Stage::Verified => "verified",
        };
        f.write_str(name)
    }
}

/// What a successful request produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub num_constraints: usize,
    pub proof_size: usize,
    pub prove_time: Duration,
    pub verify_time: Duration,
}

/// Decode, prove and verify a single request against loaded key material.
pub fn verify_request(keys: &KeyMaterial, input: &ProveInput) -> Result<Outcome, VerifierError> {
    let decoded = {
        let _span = info_span!("decode").entered();
        decode(input).map_err(|e| VerifierError::from(e).at(Stage::Received))?
    };
    let public_inputs = PublicInputs::from_decoded(&decoded);

    let witness = {
        let _span = info_span!("build_witness").entered();
        build_witness(&decoded, &keys.matrices)
            .map_err(|e| VerifierError::from(e).at(Stage::Decoded))?
    };

    let (proof_bytes, prove_time) = {
        let _span = info_span!("prove").entered();
        let start = Instant::now();
        let proof = groth16::prove(&keys.pk, &keys.matrices, &witness.full_assignment())
            .map_err(|e| VerifierError::from(e).at(Stage::WitnessBuilt))?;
        let bytes = proof
            .to_bytes()
            .map_err(|e| VerifierError::from(e).at(Stage::WitnessBuilt))?;
        (bytes, start.elapsed())
    };
    debug!(proof_size = proof_bytes.len(), ?prove_time, "proof generated");

    let verify_time = {
        let _span = info_span!("verify").entered();
        let start = Instant::now();
        check_proof(&keys.pvk, &public_inputs, &proof_bytes).map_err(|e| e.at(Stage::Proved))?;
        start.elapsed()
    };
    debug!(?verify_time, "proof verified");

    Ok(Outcome {
        num_constraints: keys.matrices.num_constraints,
        proof_size: proof_bytes.len(),
        prove_time,
        verify_time,
    })
}

/// Decode proof bytes and run the pairing check. A well-formed proof that
/// fails the check is [`ErrorKind::Rejected`].
pub fn check_proof(
    pvk: &PreparedVerifyingKey,
    public_inputs: &PublicInputs,
    proof_bytes: &[u8],
) -> Result<(), VerifierError> {
    let proof = Proof::from_bytes(proof_bytes)?;
    if groth16::verify(pvk, public_inputs.as_slice(), &proof)? {
        Ok(())
    } else {
        Err(VerifierError::rejected())
    }
}

fn log_result(result: &Result<Outcome, VerifierError>) {
    match result {
        Ok(outcome) => info!(
            constraints = outcome.num_constraints,
            proof_size = outcome.proof_size,
            "signature proof verified"
        ),
        Err(err) if err.kind == ErrorKind::WitnessUnsatisfiable => {
            info!(stage = ?err.stage, "{err}")
        }
        Err(err) => error!(stage = ?err.stage, "{err}"),
    }
}

/// Read the request from `witness_input.json` in the artifact directory.
pub fn run_from_files(config: &VerifierConfig, cache: &KeyCache) -> Result<Outcome, VerifierError> {
    let _span = info_span!("verification", source = "files").entered();
    let result = (|| {
        let keys = cache
            .get_or_load(config)
            .map_err(|e| VerifierError::from(e).at(Stage::Received))?;
        let input = ProveInput::from_json_file(&config.paths().witness_input)
            .map_err(|e| VerifierError::from(e).at(Stage::Received))?;
        verify_request(&keys, &input)
    })();
    log_result(&result);
    result
}

/// Verify a request supplied directly by the caller.
pub fn run_with_inputs(
    config: &VerifierConfig,
    cache: &KeyCache,
    input: &ProveInput,
) -> Result<Outcome, VerifierError> {
    let _span = info_span!("verification", source = "inputs").entered();
    let result = cache
        .get_or_load(config)
        .map_err(|e| VerifierError::from(e).at(Stage::Received))
        .and_then(|keys| verify_request(&keys, input));
    log_result(&result);
    result
}
