use ark_ff::PrimeField;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::{BaseField, ScalarField};

pub trait ScalarBits {
    fn to_u64_limbs(&self) -> [u64; 4];

    /// Bit `index` of the canonical integer, little-endian.
    #[inline]
    fn bit(&self, index: usize) -> bool {
        let limbs = self.to_u64_limbs();
        (limbs[index / 64] >> (index % 64)) & 1 == 1
    }
}

impl ScalarBits for ScalarField {
    #[inline]
    fn to_u64_limbs(&self) -> [u64; 4] {
        self.into_bigint().0
    }
}

impl ScalarBits for BaseField {
    #[inline]
    fn to_u64_limbs(&self) -> [u64; 4] {
        self.into_bigint().0
    }
}

pub trait Group:
    Sized + Copy + Add<Output = Self> + AddAssign + Sub<Output = Self> + SubAssign + Neg<Output = Self>
{
    type Scalar: ScalarBits;

    fn identity() -> Self;
    fn is_identity(&self) -> bool;
    fn generator() -> Self;
    fn double(&self) -> Self;
    fn negate(&self) -> Self;

    /// Returns `b` when `choice` is set and `a` otherwise, using field
    /// arithmetic rather than a branch on `choice`.
    fn select(a: &Self, b: &Self, choice: bool) -> Self;

    /// Fixed-iteration double-and-add over all 256 scalar bits.
    ///
    /// Every iteration performs one doubling, one addition and one selection
    /// regardless of the bit value, so the sequence of group operations does
    /// not depend on the scalar.
    #[inline]
    fn scalar_mul(&self, scalar: &Self::Scalar) -> Self {
        let scalar_limbs = scalar.to_u64_limbs();
        let mut result = Self::identity();

        for &limb in scalar_limbs.iter().rev() {
            for shift in (0..64).rev() {
                result = result.double();
                let sum = result + *self;
                result = Self::select(&result, &sum, (limb >> shift) & 1 == 1);
            }
        }

        result
    }
}
