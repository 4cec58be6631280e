//! Bit decomposition, packing and comparison gadgets.

use ark_bn254::Fr;
use ark_ff::{BigInteger, One, PrimeField};
use ark_r1cs_std::fields::emulated_fp::EmulatedFpVar;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use curve::BaseField;

/// Bits per public limb.
pub const LIMB_BITS: usize = 128;

/// Allocate the `len` low bits of `value` as boolean witnesses, least
/// significant first. Each bit carries `b * (1 - b) = 0`.
pub fn alloc_bits<F: PrimeField>(
    cs: ConstraintSystemRef<Fr>,
    value: Option<&F>,
    len: usize,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    let bits = value.map(|v| to_bits_le(v, len));
    (0..len)
        .map(|i| {
            Boolean::new_witness(cs.clone(), || {
                bits.as_ref()
                    .map(|bits| bits[i])
                    .ok_or(SynthesisError::AssignmentMissing)
            })
        })
        .collect()
}

/// `sum 2^i * bits[i]`. Costs no constraints.
pub fn pack(bits: &[Boolean<Fr>]) -> FpVar<Fr> {
    let mut coeff = Fr::one();
    let mut acc = FpVar::zero();
    for bit in bits {
        acc += FpVar::from(bit.clone()) * coeff;
        coeff.double_in_place();
    }
    acc
}

/// Sum of the bits; zero exactly when every bit is zero.
pub fn bit_sum(bits: &[Boolean<Fr>]) -> FpVar<Fr> {
    bits.iter()
        .fold(FpVar::zero(), |acc, bit| acc + FpVar::from(bit.clone()))
}

/// The `len` low bits of a field element's canonical integer, least significant first.
pub fn to_bits_le<F: PrimeField>(value: &F, len: usize) -> Vec<bool> {
    let mut bits = value.into_bigint().to_bits_le();
    bits.resize(len, false);
    bits
}

/// Bits of `F::MODULUS - 1`, least significant first.
pub fn modulus_minus_one_bits<F: PrimeField>() -> Vec<bool> {
    to_bits_le(&-F::one(), F::MODULUS_BIT_SIZE as usize)
}

/// Split 256 little-endian limb bits into `(low 128, high 128)` as native elements.
pub fn split_limbs<F: PrimeField>(value: &F) -> [Fr; 2] {
    split_words(value.into_bigint().as_ref())
}

pub(crate) fn split_words(words: &[u64]) -> [Fr; 2] {
    let word = |i: usize| u128::from(words.get(i).copied().unwrap_or(0));
    let lo = word(0) | (word(1) << 64);
    let hi = word(2) | (word(3) << 64);
    [Fr::from(lo), Fr::from(hi)]
}

/// Enforce that the integer spelled by `bits` is at most `bound`.
///
/// Walks from the most significant bit down while tracking whether the prefix
/// read so far equals the prefix of `bound`. Where `bound` has a zero bit and
/// the prefixes are still equal, the input bit is forced to zero.
pub fn enforce_le_constant(bits: &[Boolean<Fr>], bound: &[bool]) -> Result<(), SynthesisError> {
    if bound.len() > bits.len() && bound[bits.len()..].iter().any(|b| *b) {
        // The bound exceeds anything `bits` can spell.
        return Ok(());
    }
    for bit in bits.iter().skip(bound.len()) {
        bit.enforce_equal(&Boolean::FALSE)?;
    }

    let mut prefix_equal = FpVar::<Fr>::one();
    for i in (0..bits.len().min(bound.len())).rev() {
        let bit = FpVar::from(bits[i].clone());
        if bound[i] {
            prefix_equal = &prefix_equal * &bit;
        } else {
            prefix_equal.mul_equals(&bit, &FpVar::zero())?;
        }
    }
    Ok(())
}

/// Enforce `value != 0` with an inverse witness.
pub fn enforce_nonzero(value: &FpVar<Fr>) -> Result<(), SynthesisError> {
    value.inverse().map(|_| ())
}

/// The canonical 256-bit decomposition of an emulated coordinate.
///
/// The decomposition is range checked against the coordinate modulus, so
/// the packed bits equal the coordinate's canonical integer.
pub fn canonical_bits(
    value: &EmulatedFpVar<BaseField, Fr>,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    let width = BaseField::MODULUS_BIT_SIZE as usize;
    let mut bits = value.to_bits_le()?;
    for bit in bits.iter().skip(width) {
        bit.enforce_equal(&Boolean::FALSE)?;
    }
    bits.resize(width, Boolean::FALSE);
    enforce_le_constant(&bits, &modulus_minus_one_bits::<BaseField>())?;
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::ConstraintSystem;
    use curve::ScalarField;

    fn check_le(value: u64, bound: u64, width: usize) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let bits = alloc_bits(cs.clone(), Some(&Fr::from(value)), width).unwrap();
        enforce_le_constant(&bits, &to_bits_le(&Fr::from(bound), width)).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn test_le_constant_exhaustive_small() {
        for bound in 0..32u64 {
            for value in 0..32u64 {
                assert_eq!(check_le(value, bound, 5), value <= bound, "{value} <= {bound}");
            }
        }
    }

    #[test]
    fn test_pack_matches_value() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let value = Fr::from(0xdead_beef_u64);
        let bits = alloc_bits(cs.clone(), Some(&value), 32).unwrap();
        assert_eq!(pack(&bits).value().unwrap(), value);
        assert_eq!(bit_sum(&bits).value().unwrap(), Fr::from(24u64));
    }

    #[test]
    fn test_modulus_bits() {
        let p_bits = modulus_minus_one_bits::<BaseField>();
        let n_bits = modulus_minus_one_bits::<ScalarField>();
        assert_eq!(p_bits.len(), 256);
        assert_eq!(n_bits.len(), 256);
        assert!(!p_bits[0]);
        assert!(!n_bits[0]);
        assert!(p_bits[255] && n_bits[255]);
    }

    #[test]
    fn test_split_limbs() {
        let value = ScalarField::from(u128::MAX) + ScalarField::from(5u64);
        let [lo, hi] = split_limbs(&value);
        assert_eq!(lo, Fr::from(4u64));
        assert_eq!(hi, Fr::from(1u64));
    }

    #[test]
    fn test_nonzero() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let x = FpVar::new_witness(cs.clone(), || Ok(Fr::from(0u64))).unwrap();
        enforce_nonzero(&x).unwrap();
        assert!(!cs.is_satisfied().unwrap());

        let cs = ConstraintSystem::<Fr>::new_ref();
        let x = FpVar::new_witness(cs.clone(), || Ok(Fr::from(9u64))).unwrap();
        enforce_nonzero(&x).unwrap();
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_canonical_bits() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let value = -BaseField::from(2u64);
        let var = EmulatedFpVar::new_witness(cs.clone(), || Ok(value)).unwrap();
        let bits = canonical_bits(&var).unwrap();
        let expected = to_bits_le(&value, 256);
        let actual: Vec<bool> = bits.iter().map(|b| b.value().unwrap()).collect();
        assert_eq!(actual, expected);
        assert!(cs.is_satisfied().unwrap());
    }
}
