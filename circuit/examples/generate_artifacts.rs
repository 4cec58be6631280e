//! Generate the verifier's artifacts.
//!
//! Signs a random message with a fresh key, synthesizes the circuit, runs the
//! trusted setup, checks one prove/verify round and writes
//! `r1cs.bin`, `proving_key.bin`, `verifying_key.bin` and
//! `witness_input.json` into the directory given as the first argument
//! (default: `$ECDSA_VERIFIER_ARTIFACT_DIR`, then `.`).
//!
//! ```text
//! cargo run --release -p circuit --example generate_artifacts --features setup -- ./artifacts
//! ```

use circuit::groth16::generate_parameters;
use circuit::{verify_request, EcdsaCircuit, KeyCache, KeyMaterial, ProveInput, VerifierConfig};
use ecdsa::{hash_message, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::time::Instant;

fn main() {
    let config = match std::env::args_os().nth(1) {
        Some(dir) => VerifierConfig::new(dir),
        None => VerifierConfig::from_env(),
    };
    std::fs::create_dir_all(&config.artifact_dir).expect("create artifact directory");
    let paths = config.paths();

    let mut rng = OsRng;
    let signing_key = SigningKey::random(&mut rng);
    let mut message = [0u8; 32];
    rng.fill_bytes(&mut message);
    let signature = signing_key.sign(&mut rng, &message);
    let input = ProveInput::from_parts(
        &hash_message(&message),
        &signature,
        &signing_key.verifying_key(),
    );

    let setup_start = Instant::now();
    let (matrices, pk) = generate_parameters(EcdsaCircuit::blank(), &mut rng).expect("setup");
    println!("Constraints: {}", matrices.num_constraints);
    println!("Setup time: {:?}", setup_start.elapsed());

    let vk = pk.verifying_key();
    let keys = KeyMaterial::new(matrices, pk, vk).expect("key material");
    let outcome = verify_request(&keys, &input).expect("self-check");
    println!("Self-check proving time: {:?}", outcome.prove_time);

    keys.write(&paths).expect("write keys");
    input
        .write_json_file(&paths.witness_input)
        .expect("write witness input");

    // Read everything back the way the verifier will.
    circuit::run_from_files(&config, &KeyCache::new()).expect("reload");
    println!("Artifacts written to {}", config.artifact_dir.display());
}
