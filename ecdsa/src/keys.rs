//! Signing and verifying keys for ECDSA over the P-256 curve.

use core::fmt;

use curve::{
    Affine, BaseField, Group, RandomField, ScalarField, base_from_be_bytes, base_to_be_bytes,
    base_to_scalar, checked_inverse, double_scalar_mul, scalar_from_be_bytes, scalar_to_be_bytes,
};
use rand::Rng;

use crate::constants::{PK_SIZE, SK_SIZE};
use crate::errors::EcdsaError;
use crate::signatures::{Signature, hash_message, hash_to_scalar};

/// A secret signing key for creating ECDSA signatures.
///
/// The signing key is a non-zero scalar below the group order of the curve.
/// It must be kept secret and protected from unauthorized access.
///
/// # Example
///
/// ```
/// use ecdsa::SigningKey;
/// use rand::thread_rng;
///
/// let mut rng = thread_rng();
/// let signing_key = SigningKey::random(&mut rng);
/// ```
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct SigningKey {
    scalar: ScalarField,
}

/// A public verifying key for verifying ECDSA signatures.
///
/// The verifying key is a finite point on the curve, derived from the
/// signing key by multiplying the curve generator by the secret scalar.
///
/// # Example
///
/// ```
/// use ecdsa::SigningKey;
/// use rand::thread_rng;
///
/// let mut rng = thread_rng();
/// let signing_key = SigningKey::random(&mut rng);
/// let verifying_key = signing_key.verifying_key();
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    point: Affine,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

impl SigningKey {
    /// Generates a random signing key using the provided random number generator.
    ///
    /// # Arguments
    ///
    /// * `rng` - A cryptographically secure random number generator
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            scalar: ScalarField::random_nonzero(rng),
        }
    }

    /// Decodes a signing key from 32 big-endian bytes.
    ///
    /// Returns `EcdsaError::InvalidScalar` for zero or out-of-range values.
    pub fn from_bytes(bytes: &[u8; SK_SIZE]) -> Result<Self, EcdsaError> {
        let scalar = scalar_from_be_bytes(bytes).map_err(|_| EcdsaError::InvalidScalar)?;
        if scalar == ScalarField::from(0u64) {
            return Err(EcdsaError::InvalidScalar);
        }
        Ok(Self { scalar })
    }

    /// Encodes the signing key as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; SK_SIZE] {
        scalar_to_be_bytes(&self.scalar)
    }

    /// Derives the public verifying key from this signing key.
    ///
    /// The verifying key is computed as `G * sk` where `G` is the generator
    /// of the curve and `sk` is the secret scalar.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            point: Affine::generator().scalar_mul(&self.scalar),
        }
    }

    /// Signs a message digest that has already been mapped to a scalar.
    ///
    /// The signature is computed using the ECDSA signing algorithm:
    /// 1. Generate a random non-zero nonce `k`
    /// 2. Compute `R = G * k` and `r = x(R) mod n`
    /// 3. Compute `s = k^-1 * (z + r * sk)`
    /// 4. Restart with a fresh nonce if `r` or `s` is zero
    ///
    /// # Arguments
    ///
    /// * `rng` - A cryptographically secure random number generator for the nonce
    /// * `z` - The message digest as a scalar
    ///
    /// # Example
    ///
    /// ```
    /// use ecdsa::{SigningKey, hash_message, hash_to_scalar};
    /// use rand::thread_rng;
    ///
    /// let mut rng = thread_rng();
    /// let signing_key = SigningKey::random(&mut rng);
    /// let z = hash_to_scalar(&hash_message(b"hello"));
    /// let signature = signing_key.sign_prehash(&mut rng, &z);
    /// assert!(signing_key.verifying_key().verify_prehash(&z, &signature));
    /// ```
    pub fn sign_prehash<R: Rng + ?Sized>(&self, rng: &mut R, z: &ScalarField) -> Signature {
        loop {
            let nonce = ScalarField::random_nonzero(rng);
            let commitment = Affine::generator().scalar_mul(&nonce);
            let r = base_to_scalar(&commitment.x);
            let Ok(nonce_inv) = checked_inverse(&nonce) else {
                continue;
            };
            let s = nonce_inv * (*z + r * self.scalar);

            if let Ok(signature) = Signature::new(r, s) {
                return signature;
            }
        }
    }

    /// Signs a message, hashing it with SHA-256 first.
    ///
    /// # Example
    ///
    /// ```
    /// use ecdsa::SigningKey;
    /// use rand::thread_rng;
    ///
    /// let mut rng = thread_rng();
    /// let signing_key = SigningKey::random(&mut rng);
    /// let signature = signing_key.sign(&mut rng, b"hello ecdsa");
    /// assert!(signing_key.verifying_key().verify(b"hello ecdsa", &signature));
    /// ```
    pub fn sign<R: Rng + ?Sized>(&self, rng: &mut R, msg: &[u8]) -> Signature {
        self.sign_prehash(rng, &hash_to_scalar(&hash_message(msg)))
    }
}

impl VerifyingKey {
    /// Wraps a curve point, rejecting the identity and points off the curve.
    pub fn from_affine(point: Affine) -> Result<Self, EcdsaError> {
        if point.is_infinity() || !point.is_on_curve() {
            return Err(EcdsaError::InvalidPoint);
        }
        Ok(Self { point })
    }

    /// Builds a verifying key from affine coordinates.
    pub fn from_coordinates(x: BaseField, y: BaseField) -> Result<Self, EcdsaError> {
        let point = Affine::new(x, y).map_err(|_| EcdsaError::InvalidPoint)?;
        Self::from_affine(point)
    }

    /// Decodes `x || y`, each coordinate 32 big-endian bytes below the field modulus.
    pub fn from_bytes(bytes: &[u8; PK_SIZE]) -> Result<Self, EcdsaError> {
        let x = base_from_be_bytes(&bytes[..32]).map_err(|_| EcdsaError::InvalidPoint)?;
        let y = base_from_be_bytes(&bytes[32..]).map_err(|_| EcdsaError::InvalidPoint)?;
        Self::from_coordinates(x, y)
    }

    /// Encodes the key as `x || y`.
    pub fn to_bytes(&self) -> [u8; PK_SIZE] {
        let (x, y) = self.to_coordinates_be();
        let mut out = [0u8; PK_SIZE];
        out[..32].copy_from_slice(&x);
        out[32..].copy_from_slice(&y);
        out
    }

    /// The affine coordinates as 32-byte big-endian arrays.
    pub fn to_coordinates_be(&self) -> ([u8; 32], [u8; 32]) {
        (base_to_be_bytes(&self.point.x), base_to_be_bytes(&self.point.y))
    }

    /// The underlying curve point.
    pub fn as_affine(&self) -> Affine {
        self.point
    }

    /// Verifies a signature over a message digest mapped to a scalar.
    ///
    /// The verification checks the ECDSA equation:
    /// `x(u1 * G + u2 * pk) == r`, where:
    /// - `w = s^-1`
    /// - `u1 = z * w`
    /// - `u2 = r * w`
    ///
    /// The sum must not be the point at infinity. Its x-coordinate is
    /// reduced modulo `n` before the comparison with `r`.
    pub fn verify_prehash(&self, z: &ScalarField, sig: &Signature) -> bool {
        let Ok(w) = checked_inverse(&sig.s()) else {
            return false;
        };
        let u1 = *z * w;
        let u2 = sig.r() * w;

        let point = double_scalar_mul(&u1, &u2, &self.point).to_affine();
        if point.is_infinity() {
            return false;
        }

        base_to_scalar(&point.x) == sig.r()
    }

    /// Verifies a signature on a message, hashing it with SHA-256 first.
    ///
    /// # Example
    ///
    /// ```
    /// use ecdsa::SigningKey;
    /// use rand::thread_rng;
    ///
    /// let mut rng = thread_rng();
    /// let signing_key = SigningKey::random(&mut rng);
    /// let verifying_key = signing_key.verifying_key();
    ///
    /// let signature = signing_key.sign(&mut rng, b"message");
    /// assert!(verifying_key.verify(b"message", &signature));
    /// assert!(!verifying_key.verify(b"other message", &signature));
    /// ```
    pub fn verify(&self, msg: &[u8], sig: &Signature) -> bool {
        self.verify_prehash(&hash_to_scalar(&hash_message(msg)), sig)
    }
}

impl From<&SigningKey> for VerifyingKey {
    /// Converts a reference to a signing key into a verifying key.
    ///
    /// This is equivalent to calling `signing_key.verifying_key()`.
    fn from(sk: &SigningKey) -> Self {
        sk.verifying_key()
    }
}
