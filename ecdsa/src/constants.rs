//! Constants used in the ECDSA implementation.

/// Size of a serialized public verifying key in bytes.
///
/// A verifying key is an affine curve point encoded as two 32-byte
/// big-endian coordinates `x || y`.
pub const PK_SIZE: usize = 64;

/// Size of a serialized secret signing key in bytes.
///
/// A signing key is a non-zero scalar, encoded as 32 big-endian bytes.
pub const SK_SIZE: usize = 32;

/// Size of a serialized signature in bytes.
///
/// A signature consists of:
/// - The scalar r (32 bytes)
/// - The scalar s (32 bytes)
/// Total: 64 bytes
pub const SIG_SIZE: usize = 64;

/// Size of a message digest in bytes (SHA-256).
pub const DIGEST_SIZE: usize = 32;
