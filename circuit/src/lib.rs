//! # Zero-Knowledge ECDSA Signature Verification
//!
//! Proves, with a Groth16 SNARK over BN254, that a P-256 ECDSA signature
//! verifies for a given message hash and public key, then checks that proof.
//!
//! ## Overview
//!
//! The verification equation is expressed as a rank-1 constraint system with
//! `ark-r1cs-std` gadgets. P-256 coordinates live in a field other than
//! BN254's scalar field, so they are emulated field variables. A Groth16 key
//! pair is generated once with `ark-groth16`, and each request is proved and
//! verified against the stored keys.
//!
//! **Key Features**:
//! - **Emulated Coordinates**: P-256 arithmetic over `EmulatedFpVar`
//! - **Joint Ladder**: `z * G + r * Q - s * R` shares a single 256-step double-and-add pass
//! - **Fixed Circuit**: One constraint system, independent of the signature values
//! - **Checked Artifacts**: Versioned, digest-protected binary envelopes
//! - **Classified Errors**: Every failure maps to one [`ErrorKind`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use circuit::{run_from_files, KeyCache, VerifierConfig};
//!
//! // Reads r1cs.bin, proving_key.bin, verifying_key.bin and
//! // witness_input.json from $ECDSA_VERIFIER_ARTIFACT_DIR (or ".").
//! let config = VerifierConfig::from_env();
//! match run_from_files(&config, KeyCache::global()) {
//!     Ok(outcome) => println!("verified, {} byte proof", outcome.proof_size),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! Artifacts are produced by `examples/generate_artifacts.rs`
//! (`cargo run -p circuit --example generate_artifacts --features setup`).
//!
//! ## Verification Equation
//!
//! ECDSA accepts `(r, s)` for message hash `z` and public key `Q` when
//!
//! ```text
//! x(u1 * G + u2 * Q) mod n = r,   u1 = z / s,   u2 = r / s
//! ```
//!
//! Inverting `s` inside the circuit would need arithmetic mod `n`. Instead
//! the prover supplies `R = u1 * G + u2 * Q` and the circuit checks
//!
//! ```text
//! x(R) = r + k * n,   k in {0, 1}   and   z * G + r * Q - s * R = O
//! ```
//!
//! P-256's coordinate field is larger than its group order, so `x(R)` may
//! exceed `n` once. The bit `k` records that wrap.
//!
//! ## Public Inputs
//!
//! | Index | Value |
//! |-------|-------|
//! | 0, 1  | low and high 128 bits of `z mod n` |
//! | 2, 3  | low and high 128 bits of `r` |
//! | 4, 5  | low and high 128 bits of `x(Q)` |
//! | 6, 7  | low and high 128 bits of `y(Q)` |
//!
//! The verifier recomputes these from the request; they are never taken from
//! the witness.
//!
//! ## Circuit Components
//!
//! ### [`r1cs`] - Matrices and Assignments
//!
//! Synthesis runs an `ark-relations` constraint system either in setup mode,
//! producing [`CircuitMatrices`], or in prove mode, producing an
//! [`Assignment`]. Both run the same [`EcdsaCircuit`].
//!
//! ### [`boolean`], [`point_ops`], [`scalar_mul`] - Gadgets
//!
//! - Bit decomposition with `<=` range checks against a constant
//! - On-curve checks, doubling and incomplete addition with inverse witnesses
//! - Joint scalar multiplication seeded with an offset point `H` of unknown
//!   discrete logarithm, so the accumulator never meets an exceptional case.
//!   `H` is the first point whose x-coordinate is
//!   `SHA-256("p256-ecdsa-offset" || ctr) mod p`, taking the smaller `y`.
//!
//! ### [`groth16`] - Proof System
//!
//! Keys, prover and verifier over BN254, on `ark-groth16`. The trusted setup
//! is only compiled with the `setup` feature. Prover randomness is drawn from
//! the operating system on every call and cannot be supplied from outside.
//!
//! ## Request Pipeline
//!
//! ```text
//! Received -> Decoded -> WitnessBuilt -> Proved -> Verified
//! ```
//!
//! The first failing stage ends the request. Key material is loaded once per
//! artifact directory and shared through [`KeyCache`].
//!
//! ## References
//!
//! - Groth16: <https://eprint.iacr.org/2016/260>
//! - SEC 2 (P-256 domain parameters): <https://www.secg.org/sec2-v2.pdf>
//! - SEC 1 (ECDSA): <https://www.secg.org/sec1-v2.pdf>

pub mod artifacts;
pub mod boolean;
pub mod cache;
pub mod config;
pub mod ecdsa_circuit;
pub mod errors;
pub mod groth16;
pub mod pipeline;
pub mod point_ops;
pub mod r1cs;
pub mod scalar_mul;
pub mod witness;

#[cfg(test)]
mod test_fixtures;

pub use artifacts::{KeyMaterial, LoadError};
pub use cache::KeyCache;
pub use config::{ArtifactPaths, VerifierConfig, ARTIFACT_DIR_ENV};
pub use ecdsa_circuit::{constraint_matrices, EcdsaCircuit, NUM_PUBLIC_INPUTS};
pub use errors::{ErrorKind, VerifierError};
pub use pipeline::{run_from_files, run_with_inputs, verify_request, Outcome, Stage};
pub use r1cs::{Assignment, CircuitMatrices, MatrixError};
pub use witness::{build_witness, decode, DecodedInput, ProveInput, PublicInputs, WitnessError};

// Re-export commonly used types
pub use curve::{Affine, BaseField, ScalarField};
pub use ecdsa::{Signature, SigningKey, VerifyingKey};
