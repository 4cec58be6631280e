//! The ECDSA verification circuit.
//!
//! Public inputs, in order:
//! `[msg_lo, msg_hi, r_lo, r_hi, pubx_lo, pubx_hi, puby_lo, puby_hi]`, the low
//! and high 128-bit halves of `z mod n`, of `r` and of both public key
//! coordinates.
//!
//! The circuit proves knowledge of `s` and of a point `R` such that
//!
//! ```text
//! x(R) mod n = r,   s * R = z * G + r * Q
//! ```
//!
//! which is equivalent to `x(z/s * G + r/s * Q) mod n = r`, the ECDSA
//! verification equation. The coordinate modulus exceeds the group order, so
//! `x(R) = r + k * n` with a witnessed `k` in `{0, 1}`.

use ark_bn254::Fr;
use ark_ff::{Field, PrimeField};
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use curve::{Affine, ScalarField};

use crate::boolean::{
    alloc_bits, bit_sum, canonical_bits, enforce_le_constant, enforce_nonzero,
    modulus_minus_one_bits, pack, split_limbs, split_words, LIMB_BITS,
};
use crate::point_ops::CircuitPoint;
use crate::r1cs::{synthesize_matrices, CircuitMatrices};
use crate::scalar_mul::{joint_scalar_mul, offset_after_ladder, JointScalars};

/// Bits per scalar.
pub const SCALAR_BITS: usize = 256;
/// Number of public inputs, excluding the constant one.
pub const NUM_PUBLIC_INPUTS: usize = 8;

/// Values the prover knows when synthesizing with a witness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EcdsaAssignment {
    /// Message hash reduced modulo the group order
    pub z: ScalarField,
    pub r: ScalarField,
    pub s: ScalarField,
    pub public_key: Affine,
    /// `R = (z/s) * G + (r/s) * Q`
    pub commitment: Affine,
}

impl EcdsaAssignment {
    /// `(x(R) >= n, carry out of the low limb of r + n)`.
    fn reduction_flags(&self) -> (bool, bool) {
        let wraps = self.commitment.x.into_bigint() >= ScalarField::MODULUS;
        let words = self.r.into_bigint().0;
        let r_lo = u128::from(words[0]) | (u128::from(words[1]) << 64);
        let n = ScalarField::MODULUS.0;
        let n_lo = u128::from(n[0]) | (u128::from(n[1]) << 64);
        let carry = wraps && r_lo.checked_add(n_lo).is_none();
        (wraps, carry)
    }
}

/// The eight public inputs for a message hash, signature `r` and public key.
pub fn public_inputs(
    z: &ScalarField,
    r: &ScalarField,
    public_key: &Affine,
) -> [Fr; NUM_PUBLIC_INPUTS] {
    let [msg_lo, msg_hi] = split_limbs(z);
    let [r_lo, r_hi] = split_limbs(r);
    let [pubx_lo, pubx_hi] = split_limbs(&public_key.x);
    let [puby_lo, puby_hi] = split_limbs(&public_key.y);
    [msg_lo, msg_hi, r_lo, r_hi, pubx_lo, pubx_hi, puby_lo, puby_hi]
}

/// The ECDSA verification circuit, with or without a witness.
#[derive(Clone, Debug, Default)]
pub struct EcdsaCircuit {
    assignment: Option<EcdsaAssignment>,
}

impl EcdsaCircuit {
    /// A circuit with no values, for recording the shape.
    pub fn blank() -> Self {
        Self { assignment: None }
    }

    pub fn with_assignment(assignment: EcdsaAssignment) -> Self {
        Self {
            assignment: Some(assignment),
        }
    }
}

fn enforce_halves(bits: &[Boolean<Fr>], lo: &FpVar<Fr>, hi: &FpVar<Fr>) -> Result<(), SynthesisError> {
    pack(&bits[..LIMB_BITS]).enforce_equal(lo)?;
    pack(&bits[LIMB_BITS..]).enforce_equal(hi)
}

/// Enforce `x = r + k * n` for 256-bit `x` and `r`, limb by limb with a
/// carry out of the low half.
fn enforce_reduces_to(
    x_bits: &[Boolean<Fr>],
    r_bits: &[Boolean<Fr>],
    wraps: &Boolean<Fr>,
    carry: &Boolean<Fr>,
) -> Result<(), SynthesisError> {
    let [n_lo, n_hi] = split_words(ScalarField::MODULUS.as_ref());
    let two_128 = Fr::from(2u64).pow([LIMB_BITS as u64]);
    let k = FpVar::from(wraps.clone());
    let c = FpVar::from(carry.clone());
    (pack(&x_bits[..LIMB_BITS]) + &c * two_128)
        .enforce_equal(&(pack(&r_bits[..LIMB_BITS]) + &k * n_lo))?;
    pack(&x_bits[LIMB_BITS..]).enforce_equal(&(pack(&r_bits[LIMB_BITS..]) + &k * n_hi + &c))
}

impl ConstraintSynthesizer<Fr> for EcdsaCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let assignment = self.assignment;

        let publics = assignment.map(|a| public_inputs(&a.z, &a.r, &a.public_key));
        let inputs = (0..NUM_PUBLIC_INPUTS)
            .map(|i| {
                FpVar::new_input(cs.clone(), || {
                    publics
                        .map(|values| values[i])
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let z_bits = alloc_bits(cs.clone(), assignment.map(|a| a.z).as_ref(), SCALAR_BITS)?;
        let r_bits = alloc_bits(cs.clone(), assignment.map(|a| a.r).as_ref(), SCALAR_BITS)?;
        let s_bits = alloc_bits(cs.clone(), assignment.map(|a| a.s).as_ref(), SCALAR_BITS)?;

        // The bits of z and r spell the public limbs.
        enforce_halves(&z_bits, &inputs[0], &inputs[1])?;
        enforce_halves(&r_bits, &inputs[2], &inputs[3])?;

        let order_bound = modulus_minus_one_bits::<ScalarField>();
        enforce_le_constant(&z_bits, &order_bound)?;
        enforce_le_constant(&r_bits, &order_bound)?;
        enforce_le_constant(&s_bits, &order_bound)?;
        enforce_nonzero(&bit_sum(&r_bits))?;
        enforce_nonzero(&bit_sum(&s_bits))?;

        let public_key = CircuitPoint::alloc(cs.clone(), assignment.map(|a| a.public_key))?;
        public_key.enforce_on_curve()?;
        enforce_halves(&canonical_bits(&public_key.x)?, &inputs[4], &inputs[5])?;
        enforce_halves(&canonical_bits(&public_key.y)?, &inputs[6], &inputs[7])?;

        let commitment = CircuitPoint::alloc(cs.clone(), assignment.map(|a| a.commitment))?;
        commitment.enforce_on_curve()?;

        let flags = assignment.map(|a| a.reduction_flags());
        let wraps = Boolean::new_witness(cs.clone(), || {
            flags.map(|f| f.0).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let carry = Boolean::new_witness(cs.clone(), || {
            flags.map(|f| f.1).ok_or(SynthesisError::AssignmentMissing)
        })?;
        enforce_reduces_to(&canonical_bits(&commitment.x)?, &r_bits, &wraps, &carry)?;

        let offset = Affine::offset_generator();
        let acc = joint_scalar_mul(
            &offset,
            &Affine::generator(),
            &public_key,
            &commitment.negate()?,
            JointScalars {
                fixed: &z_bits,
                first: &r_bits,
                second: &s_bits,
            },
        )?;
        acc.enforce_equal_constant(&offset_after_ladder(&offset, SCALAR_BITS))
    }
}

/// Record the circuit's constraint matrices without values.
pub fn constraint_matrices() -> Result<CircuitMatrices, SynthesisError> {
    synthesize_matrices(EcdsaCircuit::blank())
}
