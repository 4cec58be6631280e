//! ECDSA signature scheme over the NIST P-256 elliptic curve.
//!
//! This library implements ECDSA using:
//! - The P-256 curve `y^2 = x^3 - 3x + b` over its 256-bit prime field
//! - Scalars modulo the curve order `n`
//! - SHA-256 for message hashing
//!
//! # Overview
//!
//! `r` is the x-coordinate of the nonce point reduced modulo `n`. Because
//! `n < p`, an x-coordinate in `[n, p)` wraps to a small `r`; verification
//! is `x(u1 * G + u2 * pk) mod n = r`, which is also the relation the
//! `circuit` crate proves in zero knowledge.
//!
//! # Example
//!
//! ```
//! use ecdsa::{SigningKey, VerifyingKey, Signature};
//! use rand::thread_rng;
//!
//! // Generate a random signing key
//! let mut rng = thread_rng();
//! let signing_key = SigningKey::random(&mut rng);
//!
//! // Derive the corresponding verifying key
//! let verifying_key = signing_key.verifying_key();
//!
//! // Sign the message
//! let signature = signing_key.sign(&mut rng, b"attack at dawn");
//!
//! // Verify the signature
//! assert!(verifying_key.verify(b"attack at dawn", &signature));
//!
//! // Keys and signatures round-trip through fixed-size encodings
//! let decoded = Signature::from_bytes(&signature.to_bytes()).expect("decode");
//! let vk = VerifyingKey::from_bytes(&verifying_key.to_bytes()).expect("decode");
//! assert!(vk.verify(b"attack at dawn", &decoded));
//! ```
//!
//! # Security Considerations
//!
//! - Always use a cryptographically secure random number generator (CSRNG)
//! - Each signature must use a fresh random nonce
//! - Protect the signing key from unauthorized access

mod constants;
mod errors;
mod keys;
mod signatures;


pub use constants::{DIGEST_SIZE, PK_SIZE, SIG_SIZE, SK_SIZE};
pub use errors::EcdsaError;
pub use keys::{SigningKey, VerifyingKey};
pub use signatures::{Signature, hash_message, hash_to_scalar};
