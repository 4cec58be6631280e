//! Shared fixtures for unit tests. Keys are generated once per test binary.

use std::fs;
use std::path::{Path, PathBuf};

use ark_bn254::Fr;
use ark_ff::Field;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use ecdsa::{hash_message, SigningKey};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::artifacts::KeyMaterial;
use crate::config::ArtifactPaths;
use crate::ecdsa_circuit::{constraint_matrices, EcdsaCircuit};
use crate::groth16::{generate_parameters, ProvingKey};
use crate::r1cs::{synthesize_assignment, CircuitMatrices};
use crate::witness::ProveInput;

/// Keys for the ECDSA circuit.
pub static KEYS: Lazy<KeyMaterial> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let (matrices, pk) = generate_parameters(EcdsaCircuit::blank(), &mut rng).unwrap();
    let vk = pk.verifying_key();
    KeyMaterial::new(matrices, pk, vk).unwrap()
});

/// The ECDSA circuit's matrices, without running a setup.
pub static MATRICES: Lazy<CircuitMatrices> = Lazy::new(|| constraint_matrices().unwrap());

/// Public `x`, private `y` with `y^3 + y + 5 = x`.
#[derive(Clone, Copy, Default)]
pub struct Cubic {
    pub y: Option<Fr>,
}

impl Cubic {
    pub fn output(y: Fr) -> Fr {
        y.square() * y + y + Fr::from(5u64)
    }
}

impl ConstraintSynthesizer<Fr> for Cubic {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let x = FpVar::new_input(cs.clone(), || {
            self.y.map(Self::output).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let y = FpVar::new_witness(cs, || self.y.ok_or(SynthesisError::AssignmentMissing))?;
        let y3 = y.square()? * &y;
        (y3 + &y + Fr::from(5u64)).enforce_equal(&x)
    }
}

/// Matrices and keys for [`Cubic`].
pub static TOY: Lazy<(CircuitMatrices, ProvingKey)> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(42);
    generate_parameters(Cubic::default(), &mut rng).unwrap()
});

/// `(x, z)` for the cubic with `y = seed`.
pub fn cubic_assignment(seed: u64) -> (Fr, Vec<Fr>) {
    let y = Fr::from(seed);
    let assignment = synthesize_assignment(Cubic { y: Some(y) }).unwrap();
    (Cubic::output(y), assignment.full())
}

/// A freshly signed request for `msg`.
pub fn signed_input(seed: u64, msg: &[u8]) -> ProveInput {
    let mut rng = StdRng::seed_from_u64(seed);
    let signing_key = SigningKey::random(&mut rng);
    let signature = signing_key.sign(&mut rng, msg);
    ProveInput::from_parts(&hash_message(msg), &signature, &signing_key.verifying_key())
}

/// An empty directory unique to this process and `name`.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ecdsa-verifier-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write the ECDSA keys and a signed request into `dir`.
pub fn write_fixture_artifacts(dir: &Path) {
    let paths = ArtifactPaths::in_dir(dir);
    KEYS.write(&paths).unwrap();
    signed_input(1, b"fixture message")
        .write_json_file(&paths.witness_input)
        .unwrap();
}

/// Write the cubic circuit's artifacts into `dir`.
pub fn write_toy_artifacts(dir: &Path) {
    let (matrices, pk) = TOY.clone();
    let vk = pk.verifying_key();
    KeyMaterial::new(matrices, pk, vk)
        .unwrap()
        .write(&ArtifactPaths::in_dir(dir))
        .unwrap();
}
