//! Circuit-friendly elliptic curve point operations.
//!
//! P-256 coordinates live in a field other than the proof system's, so each
//! coordinate is an emulated field element split into native limbs. All
//! formulas here are affine and incomplete: the identity has no
//! representation, and inputs that would hit an exceptional case leave the
//! circuit unsatisfiable instead of producing a wrong point.

use ark_bn254::Fr;
use ark_ff::{AdditiveGroup, Field, PrimeField};
use ark_r1cs_std::fields::emulated_fp::EmulatedFpVar;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use curve::{checked_inverse, Affine, BaseField, COEFF_A, COEFF_B};

use crate::boolean::{canonical_bits, pack, split_limbs, LIMB_BITS};

/// A P-256 coordinate inside the BN254 circuit.
pub type BaseVar = EmulatedFpVar<BaseField, Fr>;

/// Elliptic curve point in circuit representation.
#[derive(Clone, Debug)]
pub struct CircuitPoint {
    /// X-coordinate
    pub x: BaseVar,
    /// Y-coordinate
    pub y: BaseVar,
}

/// An exceptional input gets a zero witness, which fails the inverse check.
fn inverse_or_zero(value: &BaseField) -> BaseField {
    checked_inverse(value).unwrap_or(BaseField::ZERO)
}

impl CircuitPoint {
    /// A point fixed at synthesis time.
    pub fn constant(point: &Affine) -> Self {
        Self {
            x: BaseVar::constant(point.x),
            y: BaseVar::constant(point.y),
        }
    }

    /// Allocate both coordinates as private witnesses.
    pub fn alloc(cs: ConstraintSystemRef<Fr>, value: Option<Affine>) -> Result<Self, SynthesisError> {
        let x = BaseVar::new_witness(cs.clone(), || {
            value.map(|p| p.x).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let y = BaseVar::new_witness(cs, || {
            value.map(|p| p.y).ok_or(SynthesisError::AssignmentMissing)
        })?;
        Ok(Self { x, y })
    }

    pub fn is_constant(&self) -> bool {
        self.x.is_constant() && self.y.is_constant()
    }

    fn cs(&self) -> ConstraintSystemRef<Fr> {
        self.x.cs().or(self.y.cs())
    }

    /// The point's value in prove mode.
    pub fn value(&self) -> Result<Affine, SynthesisError> {
        Ok(Affine::new_unchecked(self.x.value()?, self.y.value()?))
    }

    /// Negate a point
    pub fn negate(&self) -> Result<Self, SynthesisError> {
        Ok(Self {
            x: self.x.clone(),
            y: self.y.negate()?,
        })
    }

    /// Enforce `y^2 = x^3 + a x + b`.
    pub fn enforce_on_curve(&self) -> Result<(), SynthesisError> {
        let x2 = self.x.square()?;
        let rhs = &x2 * &self.x + &self.x * COEFF_A + COEFF_B;
        self.y.mul_equals(&self.y, &rhs)
    }

    /// Point doubling in the circuit
    ///
    /// The slope is a witness checked by `lambda * 2y = 3x^2 + a`. A point
    /// with `y = 0` has no valid slope and leaves the circuit unsatisfied.
    pub fn double(&self) -> Result<Self, SynthesisError> {
        if self.is_constant() {
            return Ok(Self::constant(&self.value()?.double()));
        }
        let three = BaseField::from(3u64);
        let lambda = BaseVar::new_witness(self.cs(), || {
            let p = self.value()?;
            let numerator = p.x.square() * three + COEFF_A;
            Ok(numerator * inverse_or_zero(&p.y.double()))
        })?;

        let numerator = self.x.square()? * three + COEFF_A;
        lambda.mul_equals(&self.y.double()?, &numerator)?;

        let x3 = lambda.square()? - self.x.double()?;
        let y3 = &lambda * &(&self.x - &x3) - &self.y;
        Ok(Self { x: x3, y: y3 })
    }

    /// Point addition in the circuit
    ///
    /// Requires `x1 != x2`, enforced through an inverse witness for
    /// `x2 - x1`. Equal x-coordinates (doubling or cancellation) leave the
    /// circuit unsatisfied.
    pub fn add(&self, other: &Self) -> Result<Self, SynthesisError> {
        if self.is_constant() && other.is_constant() {
            return Ok(Self::constant(&(self.value()? + other.value()?)));
        }
        let inverse = BaseVar::new_witness(self.cs().or(other.cs()), || {
            let (p, q) = (self.value()?, other.value()?);
            Ok(inverse_or_zero(&(q.x - p.x)))
        })?;

        let dx = &other.x - &self.x;
        dx.mul_equals(&inverse, &BaseVar::one())?;

        let lambda = &(&other.y - &self.y) * &inverse;
        let x3 = lambda.square()? - &self.x - &other.x;
        let y3 = &lambda * &(&self.x - &x3) - &self.y;
        Ok(Self { x: x3, y: y3 })
    }

    /// `a` when `cond` holds, otherwise `b`.
    pub fn select(cond: &Boolean<Fr>, a: &Self, b: &Self) -> Result<Self, SynthesisError> {
        Ok(Self {
            x: BaseVar::conditionally_select(cond, &a.x, &b.x)?,
            y: BaseVar::conditionally_select(cond, &a.y, &b.y)?,
        })
    }

    /// Enforce that this point equals the fixed point `expected`.
    ///
    /// Both coordinates are decomposed canonically and compared limb by limb
    /// against constants.
    pub fn enforce_equal_constant(&self, expected: &Affine) -> Result<(), SynthesisError> {
        for (coordinate, value) in [(&self.x, expected.x), (&self.y, expected.y)] {
            enforce_limbs(coordinate, &value)?;
        }
        Ok(())
    }
}

fn enforce_limbs(coordinate: &BaseVar, value: &impl PrimeField) -> Result<(), SynthesisError> {
    let bits = canonical_bits(coordinate)?;
    let [lo, hi] = split_limbs(value);
    pack(&bits[..LIMB_BITS]).enforce_equal(&FpVar::constant(lo))?;
    pack(&bits[LIMB_BITS..]).enforce_equal(&FpVar::constant(hi))
}
