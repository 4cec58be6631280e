//! Joint multi-scalar multiplication gadget.
//!
//! Computes `offset * (2^(n+1) - 1) + a * P + b * Q + c * S` with one shared
//! double-and-add pass over the bits, most significant first. Every round adds
//! a table entry that already contains `offset`, a point of unknown discrete
//! logarithm, so the accumulator stays away from the identity and from the
//! entries and the incomplete formulas in [`crate::point_ops`] apply.

use ark_bn254::Fr;
use ark_ff::{Field, One};
use ark_r1cs_std::prelude::Boolean;
use ark_relations::r1cs::SynthesisError;
use curve::{Affine, Group, ScalarField};

use crate::point_ops::CircuitPoint;

/// Scalar bits for the three bases, least significant first.
pub struct JointScalars<'a> {
    /// Bits multiplying the fixed base.
    pub fixed: &'a [Boolean<Fr>],
    pub first: &'a [Boolean<Fr>],
    pub second: &'a [Boolean<Fr>],
}

/// `offset + b0 * fixed + b1 * first + b2 * second` for every bit pattern,
/// indexed by `b0 + 2 b1 + 4 b2`.
fn build_table(
    offset: &Affine,
    fixed: &Affine,
    first: &CircuitPoint,
    second: &CircuitPoint,
) -> Result<Vec<CircuitPoint>, SynthesisError> {
    let t0 = CircuitPoint::constant(offset);
    let t1 = CircuitPoint::constant(&(*offset + *fixed));
    let t2 = t0.add(first)?;
    let t3 = t1.add(first)?;
    let t4 = t0.add(second)?;
    let t5 = t1.add(second)?;
    let t6 = t2.add(second)?;
    let t7 = t3.add(second)?;
    Ok(vec![t0, t1, t2, t3, t4, t5, t6, t7])
}

/// Select `table[b0 + 2 b1 + 4 b2]` with a tree of conditional selects.
fn lookup(table: &[CircuitPoint], bits: [&Boolean<Fr>; 3]) -> Result<CircuitPoint, SynthesisError> {
    let mut level = table.to_vec();
    for bit in bits {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [low, high] => CircuitPoint::select(bit, high, low),
                _ => Err(SynthesisError::Unsatisfiable),
            })
            .collect::<Result<_, _>>()?;
    }
    level.pop().ok_or(SynthesisError::Unsatisfiable)
}

/// Run the joint ladder starting from `offset`.
///
/// All three bit vectors must have the same length. Each round costs one
/// doubling, one addition and seven selects.
pub fn joint_scalar_mul(
    offset: &Affine,
    fixed: &Affine,
    first: &CircuitPoint,
    second: &CircuitPoint,
    scalars: JointScalars<'_>,
) -> Result<CircuitPoint, SynthesisError> {
    let num_bits = scalars.fixed.len();
    if scalars.first.len() != num_bits || scalars.second.len() != num_bits {
        return Err(SynthesisError::Unsatisfiable);
    }

    let table = build_table(offset, fixed, first, second)?;
    let mut acc = CircuitPoint::constant(offset);
    for i in (0..num_bits).rev() {
        let entry = lookup(
            &table,
            [&scalars.fixed[i], &scalars.first[i], &scalars.second[i]],
        )?;
        acc = acc.double()?.add(&entry)?;
    }
    Ok(acc)
}

/// The offset contribution after a ladder over `num_bits` bits:
/// `(2^(num_bits + 1) - 1) * offset`.
pub fn offset_after_ladder(offset: &Affine, num_bits: usize) -> Affine {
    let factor = ScalarField::from(2u64).pow([num_bits as u64 + 1]) - ScalarField::one();
    offset.scalar_mul(&factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::alloc_bits;
    use ark_relations::r1cs::ConstraintSystem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use curve::RandomField;

    #[test]
    fn test_joint_ladder_matches_native() {
        let mut rng = StdRng::seed_from_u64(21);
        let width = 16;
        let fixed = Affine::generator();
        let first = fixed.scalar_mul(&ScalarField::random(&mut rng));
        let second = fixed.scalar_mul(&ScalarField::random(&mut rng));
        let offset = Affine::offset_generator();

        let (a, b, c) = (
            ScalarField::from(0xbeefu64),
            ScalarField::from(0x1234u64),
            ScalarField::from(0x8001u64),
        );

        let cs = ConstraintSystem::<Fr>::new_ref();
        let a_bits = alloc_bits(cs.clone(), Some(&a), width).unwrap();
        let b_bits = alloc_bits(cs.clone(), Some(&b), width).unwrap();
        let c_bits = alloc_bits(cs.clone(), Some(&c), width).unwrap();
        let first_var = CircuitPoint::alloc(cs.clone(), Some(first)).unwrap();
        let second_var = CircuitPoint::alloc(cs.clone(), Some(second)).unwrap();

        let result = joint_scalar_mul(
            &offset,
            &fixed,
            &first_var,
            &second_var,
            JointScalars {
                fixed: &a_bits,
                first: &b_bits,
                second: &c_bits,
            },
        )
        .unwrap();

        let expected = offset_after_ladder(&offset, width)
            + fixed.scalar_mul(&a)
            + first.scalar_mul(&b)
            + second.scalar_mul(&c);
        assert_eq!(result.value().unwrap(), expected);
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_offset_after_ladder() {
        let offset = Affine::offset_generator();
        // 2^3 - 1 = 7 after two rounds.
        assert_eq!(
            offset_after_ladder(&offset, 2),
            offset.scalar_mul(&ScalarField::from(7u64))
        );
    }
}
