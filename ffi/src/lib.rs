//! C ABI for the ECDSA proof verifier.
//!
//! ```c
//! ecdsa_verifier_logging_init();
//! ProofResult result = RunProofVerification();
//! if (!result.success) fprintf(stderr, "%s\n", result.error_msg);
//! FreeProofResult(result);
//! ```
//!
//! Artifacts are read from `$ECDSA_VERIFIER_ARTIFACT_DIR`, or the current
//! directory when it is unset. Key material is loaded once per directory and
//! reused by later calls.

use std::collections::HashSet;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::{Mutex, PoisonError};

use circuit::{ErrorKind, KeyCache, VerifierConfig, VerifierError};
use once_cell::sync::Lazy;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Result of a verification call.
///
/// On success `error_msg` is NULL and `success` is 1. On failure `error_msg`
/// holds `"<kind>: <detail>"` and `success` is 0. Release with
/// [`FreeProofResult`], which takes it by value. It is not `Copy`, so a Rust
/// caller gives it up on release.
#[repr(C)]
#[derive(Debug)]
pub struct ProofResult {
    pub error_msg: *mut c_char,
    pub success: c_int,
}

/// Verification request as five NUL-terminated hex strings, big-endian,
/// without `0x` prefix.
#[repr(C)]
#[allow(non_snake_case)]
#[derive(Clone, Copy, Debug)]
pub struct ProveInput {
    pub msgHash: *const c_char,
    pub r: *const c_char,
    pub s: *const c_char,
    pub pubX: *const c_char,
    pub pubY: *const c_char,
}

/// Message pointers handed out and not yet released.
static LIVE_MESSAGES: Lazy<Mutex<HashSet<usize>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Number of error messages handed out and not yet released.
pub fn live_message_count() -> usize {
    LIVE_MESSAGES
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

/// Outcome of a verification call on the Rust side.
///
/// Owns its error. It is neither `Clone` nor `Copy`, and crosses the C
/// boundary exactly once through [`OwnedProofResult::into_raw`].
#[derive(Debug)]
pub struct OwnedProofResult {
    result: Result<(), VerifierError>,
}

impl OwnedProofResult {
    pub fn success() -> Self {
        Self { result: Ok(()) }
    }

    pub fn failure(err: VerifierError) -> Self {
        Self { result: Err(err) }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&VerifierError> {
        self.result.as_ref().err()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(|err| err.kind)
    }

    /// The boundary message, `None` on success.
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Hand the result to C. The message, if any, is registered so that
    /// [`FreeProofResult`] releases it exactly once.
    pub fn into_raw(self) -> ProofResult {
        match self.result {
            Ok(()) => ProofResult {
                error_msg: ptr::null_mut(),
                success: 1,
            },
            Err(err) => {
                let message = CString::new(err.to_string().replace('\0', "")).unwrap_or_default();
                let raw = message.into_raw();
                LIVE_MESSAGES
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(raw as usize);
                ProofResult {
                    error_msg: raw,
                    success: 0,
                }
            }
        }
    }
}

impl From<Result<circuit::Outcome, VerifierError>> for OwnedProofResult {
    fn from(result: Result<circuit::Outcome, VerifierError>) -> Self {
        Self {
            result: result.map(|_| ()),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>, entry: &str) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        format!("unknown panic in {entry}")
    }
}

/// Run `f`, turning a panic into an `Internal` failure.
fn guarded(entry: &str, f: impl FnOnce() -> OwnedProofResult) -> OwnedProofResult {
    // Cache cells are either fully initialized or empty after a panic.
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = panic_message(payload, entry);
        error!(entry, %message, "panic caught at boundary");
        OwnedProofResult::failure(VerifierError::internal(message))
    })
}

/// Verify the request stored in `witness_input.json` of `config`'s directory.
pub fn run_proof_verification_from_files(config: &VerifierConfig) -> OwnedProofResult {
    guarded("run_proof_verification_from_files", || {
        circuit::run_from_files(config, KeyCache::global()).into()
    })
}

/// Verify a request supplied by the caller against `config`'s artifacts.
pub fn run_proof_verification_with_inputs(
    config: &VerifierConfig,
    input: &circuit::ProveInput,
) -> OwnedProofResult {
    guarded("run_proof_verification_with_inputs", || {
        circuit::run_with_inputs(config, KeyCache::global(), input).into()
    })
}

fn read_field(name: &str, value: *const c_char) -> Result<String, VerifierError> {
    if value.is_null() {
        return Err(VerifierError::new(
            ErrorKind::InvalidEncoding,
            format!("{name} is null"),
        ));
    }
    // SAFETY: the caller passes NUL-terminated strings that stay valid for
    // the duration of the call.
    let text = unsafe { CStr::from_ptr(value) };
    text.to_str().map(str::to_owned).map_err(|e| {
        VerifierError::new(
            ErrorKind::InvalidEncoding,
            format!("{name} is not valid UTF-8: {e}"),
        )
    })
}

fn read_input(input: &ProveInput) -> Result<circuit::ProveInput, VerifierError> {
    Ok(circuit::ProveInput {
        msg_hash: read_field("msgHash", input.msgHash)?,
        r: read_field("r", input.r)?,
        s: read_field("s", input.s)?,
        pub_x: read_field("pubX", input.pubX)?,
        pub_y: read_field("pubY", input.pubY)?,
    })
}

/// Prove and verify the request in `witness_input.json`.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn RunProofVerification() -> ProofResult {
    run_proof_verification_from_files(&VerifierConfig::from_env()).into_raw()
}

/// Prove and verify the request given by `input`.
///
/// NULL fields are reported as an invalid encoding.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn RunProofVerificationWithInputs(input: ProveInput) -> ProofResult {
    guarded("RunProofVerificationWithInputs", || match read_input(&input) {
        Ok(input) => run_proof_verification_with_inputs(&VerifierConfig::from_env(), &input),
        Err(err) => OwnedProofResult::failure(err),
    })
    .into_raw()
}

/// Release a result returned by this library.
///
/// Releasing the same result twice, or a result whose message did not come
/// from this library, is logged and otherwise ignored.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn FreeProofResult(result: ProofResult) {
    if result.error_msg.is_null() {
        return;
    }
    let owned = LIVE_MESSAGES
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&(result.error_msg as usize));
    if owned {
        // SAFETY: the pointer came from `CString::into_raw` in `into_raw` and
        // has just been removed from the ledger, so it is released once.
        drop(unsafe { CString::from_raw(result.error_msg) });
    } else {
        warn!(
            ptr = result.error_msg as usize,
            "ignoring release of unknown or already released message"
        );
    }
}

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `info`). Later calls do nothing.
#[no_mangle]
pub extern "C" fn ecdsa_verifier_logging_init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_null_message() {
        let raw = OwnedProofResult::success().into_raw();
        assert!(raw.error_msg.is_null());
        assert_eq!(raw.success, 1);
        FreeProofResult(raw);
    }

    #[test]
    fn test_double_release_is_ignored() {
        let owned = OwnedProofResult::failure(VerifierError::rejected());
        assert_eq!(owned.error_message().unwrap(), "rejected: proof did not verify");

        let raw = owned.into_raw();
        assert_eq!(raw.success, 0);
        let text = unsafe { CStr::from_ptr(raw.error_msg) };
        assert_eq!(text.to_str().unwrap(), "rejected: proof did not verify");

        // A C caller holds a plain struct and may release it twice.
        let copy = unsafe { ptr::read(&raw) };
        FreeProofResult(raw);
        FreeProofResult(copy);
    }

    #[test]
    fn test_foreign_pointer_is_ignored() {
        let foreign = CString::new("not ours").unwrap();
        FreeProofResult(ProofResult {
            error_msg: foreign.as_ptr() as *mut c_char,
            success: 0,
        });
        assert_eq!(foreign.to_str().unwrap(), "not ours");
    }

    #[test]
    fn test_null_field_is_invalid_encoding() {
        let hex = CString::new("00").unwrap();
        let input = ProveInput {
            msgHash: hex.as_ptr(),
            r: hex.as_ptr(),
            s: ptr::null(),
            pubX: hex.as_ptr(),
            pubY: hex.as_ptr(),
        };
        let err = read_input(&input).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidEncoding);
        assert_eq!(err.to_string(), "invalid encoding: s is null");
    }

    #[test]
    fn test_panic_becomes_internal() {
        let result = guarded("test", || panic!("boom"));
        assert_eq!(result.error_kind(), Some(ErrorKind::Internal));
        assert_eq!(result.error_message().unwrap(), "internal: boom");
    }

    #[test]
    fn test_logging_init_is_idempotent() {
        ecdsa_verifier_logging_init();
        ecdsa_verifier_logging_init();
    }
}
