//! Example proving and verifying one ECDSA signature with Groth16.

use ark_relations::r1cs::ConstraintMatrices;
use circuit::groth16::{self, generate_parameters, Proof};
use circuit::{build_witness, decode, EcdsaCircuit, ProveInput, PublicInputs};
use ecdsa::{hash_message, SigningKey};
use rand::rngs::OsRng;
use std::time::Instant;

fn main() {
    let mut rng = OsRng;
    let signing_key = SigningKey::random(&mut rng);
    let verifying_key = signing_key.verifying_key();

    let message = b"pay 42 to carol";
    let signature = signing_key.sign(&mut rng, message);
    let input = ProveInput::from_parts(&hash_message(message), &signature, &verifying_key);

    let setup_start = Instant::now();
    let (matrices, pk) = generate_parameters(EcdsaCircuit::blank(), &mut rng).expect("setup");
    let pvk = groth16::prepare_verifying_key(&pk.verifying_key());
    println!("Setup time: {:?}", setup_start.elapsed());
    println!("Constraints: {}", matrices.num_constraints);
    println!("Instance variables: {}", matrices.num_instance_variables);
    println!("Witness variables: {}", matrices.num_witness_variables);
    let matrices: ConstraintMatrices<_> = matrices.into();

    let decoded = decode(&input).expect("decode");
    let witness = build_witness(&decoded, &matrices).expect("witness");

    let prove_start = Instant::now();
    let proof = groth16::prove(&pk, &matrices, &witness.full_assignment()).expect("prove");
    let proof_bytes = proof.to_bytes().expect("serialize proof");
    let prove_time = prove_start.elapsed();

    let verify_start = Instant::now();
    let proof = Proof::from_bytes(&proof_bytes).expect("decode proof");
    let public_inputs = PublicInputs::from_decoded(&decoded);
    let valid = groth16::verify(&pvk, public_inputs.as_slice(), &proof).expect("verify");
    let verify_time = verify_start.elapsed();
    assert!(valid);

    println!("Proving time: {:?}", prove_time);
    println!("Proof size (bytes): {}", proof_bytes.len());
    println!("Verification time: {:?}", verify_time);
    println!("ECDSA proof verified.");
}
