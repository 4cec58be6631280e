use ark_ff::{UniformRand, Zero};
use rand::Rng;

use crate::{BaseField, ScalarField};

/// Helper trait for sampling random field elements.
pub trait RandomField: Sized {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Sample until a non-zero element is drawn.
    fn random_nonzero<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomField for BaseField {
    #[inline]
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        <Self as UniformRand>::rand(rng)
    }

    fn random_nonzero<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let value = <Self as RandomField>::random(rng);
            if !value.is_zero() {
                return value;
            }
        }
    }
}

impl RandomField for ScalarField {
    #[inline]
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        <Self as UniformRand>::rand(rng)
    }

    fn random_nonzero<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let value = <Self as RandomField>::random(rng);
            if !value.is_zero() {
                return value;
            }
        }
    }
}
