use crate::group::ScalarBits;
use crate::{Affine, Group, Projective, ScalarField};

/// Compute a * G + b * P with a joint fixed-iteration ladder.
///
/// Each of the 256 iterations doubles once, selects one of
/// `{O, G, P, G + P}` arithmetically and adds it with the complete formula,
/// so the operation sequence is independent of both scalars.
pub fn double_scalar_mul(a: &ScalarField, b: &ScalarField, point: &Affine) -> Projective {
    let g = Projective::generator();
    let p = Projective::from_affine(point);
    let table = [Projective::INFINITY, g, p, g + p];

    let a_limbs = a.to_u64_limbs();
    let b_limbs = b.to_u64_limbs();
    let mut result = Projective::INFINITY;

    for limb_idx in (0..4).rev() {
        let a_limb = a_limbs[limb_idx];
        let b_limb = b_limbs[limb_idx];
        for shift in (0..64).rev() {
            result = result.double();

            let a_bit = (a_limb >> shift) & 1 == 1;
            let b_bit = (b_limb >> shift) & 1 == 1;
            let low = Projective::select(&table[0], &table[1], a_bit);
            let high = Projective::select(&table[2], &table[3], a_bit);
            result += Projective::select(&low, &high, b_bit);
        }
    }

    result
}
