#![allow(dead_code)]

use std::ffi::CString;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use circuit::groth16::generate_parameters;
use circuit::{ArtifactPaths, EcdsaCircuit, KeyMaterial, ProveInput, VerifierConfig};
use ecdsa::{hash_message, SigningKey};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Artifact directory written once per test binary.
pub static ARTIFACTS: Lazy<PathBuf> = Lazy::new(|| {
    let dir = scratch_dir("artifacts");
    let mut rng = StdRng::seed_from_u64(2024);
    let (matrices, pk) = generate_parameters(EcdsaCircuit::blank(), &mut rng).unwrap();
    let vk = pk.verifying_key();
    let keys = KeyMaterial::new(matrices, pk, vk).unwrap();

    let paths = ArtifactPaths::in_dir(&dir);
    keys.write(&paths).unwrap();
    signed_input(7, b"stored request")
        .write_json_file(&paths.witness_input)
        .unwrap();
    dir
});

static EXCLUSIVE: Mutex<()> = Mutex::new(());

/// Serializes tests that set the artifact directory variable or count live
/// messages.
pub fn exclusive() -> MutexGuard<'static, ()> {
    EXCLUSIVE.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn config() -> VerifierConfig {
    VerifierConfig::new(ARTIFACTS.as_path())
}

pub fn load_keys() -> KeyMaterial {
    KeyMaterial::load(&config().paths()).unwrap()
}

pub fn signed_input(seed: u64, msg: &[u8]) -> ProveInput {
    let mut rng = StdRng::seed_from_u64(seed);
    let signing_key = SigningKey::random(&mut rng);
    let signature = signing_key.sign(&mut rng, msg);
    ProveInput::from_parts(&hash_message(msg), &signature, &signing_key.verifying_key())
}

/// The five fields as C strings, in `msgHash, r, s, pubX, pubY` order.
pub fn c_strings(input: &ProveInput) -> [CString; 5] {
    [
        &input.msg_hash,
        &input.r,
        &input.s,
        &input.pub_x,
        &input.pub_y,
    ]
    .map(|field| CString::new(field.as_str()).unwrap())
}

/// Flip bit `bit` of a 32-byte big-endian hex value. Bit 0 is the least
/// significant.
pub fn flip_bit(value: &str, bit: usize) -> String {
    let mut bytes = hex::decode(value).unwrap();
    assert_eq!(bytes.len(), 32);
    bytes[31 - bit / 8] ^= 1 << (bit % 8);
    hex::encode(bytes)
}

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ecdsa-verifier-ffi-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}
