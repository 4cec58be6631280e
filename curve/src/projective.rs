use ark_ff::{Field, MontFp, One, Zero};
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::affine::{Affine, COEFF_A, COEFF_B};
use crate::basefield::BaseField;
use crate::{Group, ScalarField};

/// Projective point on the elliptic curve.
/// Represents a point in projective coordinates (X:Y:Z) where (x,y) = (X/Z, Y/Z).
/// The point at infinity is represented as (0:1:0).
///
/// Addition and doubling use the complete formulas of Renes, Costello and
/// Batina specialised to `a = -3`, so no input (including the identity and
/// `P + P`, `P + (-P)`) takes a different code path.
#[derive(Copy, Clone, Debug)]
pub struct Projective {
    pub x: BaseField,
    pub y: BaseField,
    pub z: BaseField,
}

impl Projective {
    /// The point at infinity (identity element): (0:1:0)
    pub const INFINITY: Self = Projective {
        x: MontFp!("0"),
        y: MontFp!("1"),
        z: MontFp!("0"),
    };

    /// Create a new projective point.
    pub fn new(x: BaseField, y: BaseField, z: BaseField) -> Self {
        Projective { x, y, z }
    }

    /// Check if this point is the point at infinity.
    #[inline]
    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    /// Convert to affine coordinates.
    pub fn to_affine(&self) -> Affine {
        match self.z.inverse() {
            Some(z_inv) => Affine::new_unchecked(self.x * z_inv, self.y * z_inv),
            None => Affine::INFINITY,
        }
    }

    /// Convert from affine coordinates.
    pub fn from_affine(point: &Affine) -> Self {
        if point.is_infinity() {
            return Self::INFINITY;
        }

        Projective::new(point.x, point.y, BaseField::one())
    }

    /// Check if a point is on the curve: Y^2*Z = X^3 + a*X*Z^2 + b*Z^3.
    pub fn is_on_curve(&self) -> bool {
        if self.is_infinity() {
            return !self.y.is_zero();
        }

        let z2 = self.z.square();
        let lhs = self.y.square() * self.z;
        let rhs = self.x.square() * self.x + COEFF_A * self.x * z2 + COEFF_B * z2 * self.z;

        lhs == rhs
    }

    /// The standard curve generator.
    pub fn generator() -> Self {
        Self::from_affine(&Affine::generator())
    }

    /// Point doubling: 2*P (algorithm 6, a = -3).
    pub fn double(&self) -> Self {
        let t0 = self.x.square();
        let t1 = self.y.square();
        let t2 = self.z.square();
        let t3 = self.x * self.y;
        let t3 = t3 + t3;
        let z3 = self.x * self.z;
        let z3 = z3 + z3;
        let y3 = COEFF_B * t2 - z3;
        let x3 = y3 + y3;
        let y3 = x3 + y3;
        let x3 = t1 - y3;
        let y3 = t1 + y3;
        let y3 = x3 * y3;
        let x3 = x3 * t3;
        let t3 = t2 + t2;
        let t2 = t2 + t3;
        let z3 = COEFF_B * z3 - t2 - t0;
        let t3 = z3 + z3;
        let z3 = z3 + t3;
        let t3 = t0 + t0;
        let t0 = t3 + t0;
        let t0 = t0 - t2;
        let t0 = t0 * z3;
        let y3 = y3 + t0;
        let t0 = self.y * self.z;
        let t0 = t0 + t0;
        let z3 = t0 * z3;
        let x3 = x3 - z3;
        let z3 = t0 * t1;
        let z3 = z3 + z3;
        let z3 = z3 + z3;

        Projective::new(x3, y3, z3)
    }

    /// Negate a point.
    pub fn negate(&self) -> Self {
        Projective::new(self.x, -self.y, self.z)
    }
}

impl Default for Projective {
    fn default() -> Self {
        Self::INFINITY
    }
}

impl PartialEq for Projective {
    fn eq(&self, other: &Self) -> bool {
        // Cross-multiplied comparison; also identifies every (0:Y:0).
        self.x * other.z == other.x * self.z && self.y * other.z == other.y * self.z
    }
}

impl Eq for Projective {}

impl Group for Projective {
    type Scalar = ScalarField;

    #[inline]
    fn identity() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn is_identity(&self) -> bool {
        self.is_infinity()
    }

    #[inline]
    fn generator() -> Self {
        Projective::generator()
    }

    #[inline]
    fn double(&self) -> Self {
        Self::double(self)
    }

    #[inline]
    fn negate(&self) -> Self {
        Self::negate(self)
    }

    #[inline]
    fn select(a: &Self, b: &Self, choice: bool) -> Self {
        let c = BaseField::from(choice as u64);
        Projective::new(
            a.x + c * (b.x - a.x),
            a.y + c * (b.y - a.y),
            a.z + c * (b.z - a.z),
        )
    }
}

// Complete addition (algorithm 4, a = -3)
impl Add for Projective {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let t0 = self.x * other.x;
        let t1 = self.y * other.y;
        let t2 = self.z * other.z;
        let t3 = (self.x + self.y) * (other.x + other.y) - (t0 + t1);
        let t4 = (self.y + self.z) * (other.y + other.z) - (t1 + t2);
        let x3 = (self.x + self.z) * (other.x + other.z);
        let y3 = x3 - (t0 + t2);
        let z3 = COEFF_B * t2;
        let x3 = y3 - z3;
        let z3 = x3 + x3;
        let x3 = x3 + z3;
        let z3 = t1 - x3;
        let x3 = t1 + x3;
        let y3 = COEFF_B * y3;
        let t1 = t2 + t2;
        let t2 = t1 + t2;
        let y3 = y3 - t2 - t0;
        let t1 = y3 + y3;
        let y3 = t1 + y3;
        let t1 = t0 + t0;
        let t0 = t1 + t0;
        let t0 = t0 - t2;
        let t1 = t4 * y3;
        let t2 = t0 * y3;
        let y3 = x3 * z3 + t2;
        let x3 = t3 * x3 - t1;
        let z3 = t4 * z3 + t3 * t0;

        Projective::new(x3, y3, z3)
    }
}

impl AddAssign for Projective {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Sub for Projective {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + other.negate()
    }
}

impl SubAssign for Projective {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Projective {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

// Scalar multiplication
impl Mul<ScalarField> for Projective {
    type Output = Self;

    fn mul(self, scalar: ScalarField) -> Self {
        <Self as Group>::scalar_mul(&self, &scalar)
    }
}

impl Mul<&ScalarField> for Projective {
    type Output = Self;

    fn mul(self, scalar: &ScalarField) -> Self {
        <Self as Group>::scalar_mul(&self, scalar)
    }
}

impl Mul<Projective> for ScalarField {
    type Output = Projective;

    fn mul(self, point: Projective) -> Projective {
        <Projective as Group>::scalar_mul(&point, &self)
    }
}

// Conversions
impl From<Affine> for Projective {
    fn from(point: Affine) -> Self {
        Projective::from_affine(&point)
    }
}

impl From<&Affine> for Projective {
    fn from(point: &Affine) -> Self {
        Projective::from_affine(point)
    }
}

impl From<Projective> for Affine {
    fn from(point: Projective) -> Self {
        point.to_affine()
    }
}

impl From<&Projective> for Affine {
    fn from(point: &Projective) -> Self {
        point.to_affine()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Group, RandomField};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_infinity() {
        let inf = Projective::INFINITY;
        assert!(inf.is_infinity());
        assert!(inf.is_on_curve());
    }

    #[test]
    fn test_generator_on_curve() {
        let g = Projective::generator();
        assert!(g.is_on_curve(), "Generator point is not on the curve");
        assert!(!g.is_infinity());
    }

    #[test]
    fn test_conversion_affine_projective() {
        let affine = Affine::generator();
        let projective = Projective::from_affine(&affine);
        let back_to_affine = projective.to_affine();

        assert_eq!(affine, back_to_affine);
    }

    #[test]
    fn test_equality_ignores_scaling() {
        let g = Projective::generator();
        let k = BaseField::from(7u64);
        let scaled = Projective::new(g.x * k, g.y * k, g.z * k);
        assert_eq!(g, scaled);
        assert_ne!(g, g.double());
        assert_ne!(g, Projective::INFINITY);
    }

    #[test]
    fn test_point_addition_with_infinity() {
        let g = Projective::generator();
        let inf = Projective::INFINITY;

        assert_eq!(g + inf, g);
        assert_eq!(inf + g, g);
        assert_eq!(inf + inf, inf);
        assert!((inf + inf).is_infinity());
    }

    #[test]
    fn test_complete_addition_doubles() {
        let g = Projective::generator();
        assert_eq!(g + g, g.double());
        assert_eq!((g + g).to_affine(), Affine::generator().double());
    }

    #[test]
    fn test_complete_addition_of_inverses() {
        let g = Projective::generator();
        let sum = g + g.negate();
        assert!(sum.is_infinity());
        assert!(sum.is_on_curve());
    }

    #[test]
    fn test_point_doubling() {
        let g = Projective::generator();
        let g2 = g.double();

        assert!(g2.is_on_curve(), "Doubled point is not on the curve");
        assert_eq!(g + g, g2);
        assert!(Projective::INFINITY.double().is_infinity());
    }

    #[test]
    fn test_point_negation() {
        let g = Projective::generator();
        let neg_g = g.negate();

        assert!(neg_g.is_on_curve());
        assert_eq!(g + neg_g, Projective::INFINITY);
    }

    #[test]
    fn test_scalar_multiplication() {
        let g = Projective::generator();
        let scalar = ScalarField::from(5u64);
        let result = g.scalar_mul(&scalar);

        // 5*G = G + G + G + G + G
        let expected = g + g + g + g + g;
        assert_eq!(result, expected);
        assert!(result.is_on_curve());
    }

    #[test]
    fn test_scalar_mul_zero() {
        let g = Projective::generator();
        let result = g.scalar_mul(&ScalarField::zero());

        assert_eq!(result, Projective::INFINITY);
    }

    #[test]
    fn test_scalar_mul_one() {
        let g = Projective::generator();
        let result = g.scalar_mul(&ScalarField::one());

        assert_eq!(result, g);
    }

    #[test]
    fn test_associativity() {
        let g = Projective::generator();
        let a = ScalarField::from(3u64);
        let b = ScalarField::from(5u64);

        // (a + b) * G = a*G + b*G
        let left = g.scalar_mul(&(a + b));
        let right = g.scalar_mul(&a) + g.scalar_mul(&b);

        assert_eq!(left, right);
    }

    #[test]
    fn test_affine_projective_addition_consistency() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = Affine::generator().scalar_mul(&ScalarField::random(&mut rng));
        let b = Affine::generator().scalar_mul(&ScalarField::random(&mut rng));

        let affine_sum = a + b;
        let projective_sum = Projective::from(a) + Projective::from(b);

        assert_eq!(affine_sum, projective_sum.to_affine());
    }

    #[test]
    fn test_affine_projective_scalar_mul_consistency() {
        let g_affine = Affine::generator();
        let g_projective = Projective::generator();
        let scalar = ScalarField::from(42u64);

        let affine_result = g_affine.scalar_mul(&scalar);
        let projective_result = g_projective.scalar_mul(&scalar);

        assert_eq!(affine_result, projective_result.to_affine());
    }

    #[test]
    fn test_matches_reference_group_law() {
        use ark_ec::{AffineRepr, CurveGroup};

        let mut rng = StdRng::seed_from_u64(7);
        let a = ScalarField::random(&mut rng);
        let b = ScalarField::random(&mut rng);
        let p = Projective::generator().scalar_mul(&a);
        let q = Projective::generator().scalar_mul(&b);

        let g = ark_secp256r1::Affine::generator();
        let expected_sum = (g * a + g * b).into_affine();
        let expected_double = (g * a + g * a).into_affine();

        let sum = (p + q).to_affine();
        let doubled = p.double().to_affine();
        assert_eq!((sum.x, sum.y), (expected_sum.x, expected_sum.y));
        assert_eq!((doubled.x, doubled.y), (expected_double.x, expected_double.y));
        assert!((p + q).is_on_curve());
    }

    #[test]
    fn test_select() {
        let g = Projective::generator();
        let inf = Projective::INFINITY;
        assert_eq!(<Projective as Group>::select(&g, &inf, false), g);
        assert!(<Projective as Group>::select(&g, &inf, true).is_infinity());
    }

    #[test]
    fn test_identity() {
        let id = <Projective as Group>::identity();
        assert!(id.is_identity());
        assert_eq!(id, Projective::INFINITY);

        let g = Projective::generator();
        assert_eq!(g + id, g);
        assert_eq!(id + g, g);
    }
}
