// P-256: E(GF(p)) : y^2 = x^3 - 3x + b
// p = 2^256 - 2^224 + 2^192 + 2^96 - 1
// Curve prime order: n = 0xffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551
// Curve cofactor: 1
// Generator: SEC 2 base point
// Offset generator: first x = SHA-256("p256-ecdsa-offset" || ctr_be32) mod p (ctr = 0)
//   with x^3 - 3x + b a square, taking the smaller square root.

use ark_ff::{Field, MontFp, One};
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::basefield::BaseField;
use crate::errors::CurveError;
use crate::field::checked_inverse;
use crate::{Group, Projective, ScalarField};

/// Curve coefficient `a` in `y^2 = x^3 + ax + b`.
pub const COEFF_A: BaseField = MontFp!("-3");

/// Curve coefficient `b` in `y^2 = x^3 + ax + b`.
pub const COEFF_B: BaseField = MontFp!(
    "41058363725152142129326129780047268409114441015993725554835256314039467401291"
);

const GENERATOR_X: BaseField = MontFp!(
    "48439561293906451759052585252797914202762949526041747995844080717082404635286"
);
const GENERATOR_Y: BaseField = MontFp!(
    "36134250956749795798585127919587881956611106672985015071877198253568414405109"
);

const OFFSET_X: BaseField = MontFp!(
    "57924181746617871519611016002725280267237258217209810348954044538233049448216"
);
const OFFSET_Y: BaseField = MontFp!(
    "11400049428740677134597035701312547517993736342469857645556123804963973563742"
);

/// Affine point on the elliptic curve.
/// Represents a point in affine coordinates (x, y) or the point at infinity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Affine {
    /// The x-coordinate of the point
    pub x: BaseField,
    /// The y-coordinate of the point
    pub y: BaseField,
    /// Whether this point is the point at infinity (identity element)
    pub is_infinity: bool,
}

impl Affine {
    /// The point at infinity (identity element)
    pub const INFINITY: Self = Affine {
        x: MontFp!("0"),
        y: MontFp!("0"),
        is_infinity: true,
    };

    /// Create a finite point from raw coordinates, validating the curve equation.
    pub fn new(x: BaseField, y: BaseField) -> Result<Self, CurveError> {
        let point = Self::new_unchecked(x, y);
        if !point.is_on_curve() {
            return Err(CurveError::NotOnCurve);
        }
        Ok(point)
    }

    /// Create a finite point without checking the curve equation.
    ///
    /// Only for coordinates produced by the group law or by constants.
    #[inline]
    pub const fn new_unchecked(x: BaseField, y: BaseField) -> Self {
        Affine {
            x,
            y,
            is_infinity: false,
        }
    }

    /// Check if this point is the point at infinity.
    #[inline]
    pub fn is_infinity(&self) -> bool {
        self.is_infinity
    }

    /// Check if a point is on the curve: y^2 = x^3 + ax + b.
    pub fn is_on_curve(&self) -> bool {
        if self.is_infinity {
            return true;
        }

        let y2 = self.y.square();
        let x3 = self.x.square() * self.x;

        y2 == x3 + COEFF_A * self.x + COEFF_B
    }

    /// The SEC 2 base point.
    pub const fn generator() -> Self {
        Affine::new_unchecked(GENERATOR_X, GENERATOR_Y)
    }

    /// A second fixed point with no known discrete logarithm relative to the
    /// generator. Used to seed accumulators so that intermediate sums never
    /// hit the identity.
    pub const fn offset_generator() -> Self {
        Affine::new_unchecked(OFFSET_X, OFFSET_Y)
    }

    /// Point doubling: 2*P.
    pub fn double(&self) -> Self {
        if self.is_infinity {
            return *self;
        }

        // The group has odd order, so y = 0 only for invalid points.
        let denominator = self.y + self.y;
        let Ok(denominator_inv) = checked_inverse(&denominator) else {
            return Self::INFINITY;
        };

        // λ = (3x^2 + a) / 2y
        let x2 = self.x.square();
        let lambda = (x2 + x2 + x2 + COEFF_A) * denominator_inv;

        // x_r = λ^2 - 2x
        let x_r = lambda.square() - self.x - self.x;

        // y_r = λ(x - x_r) - y
        let y_r = lambda * (self.x - x_r) - self.y;

        Affine::new_unchecked(x_r, y_r)
    }

    /// Negate a point.
    pub fn negate(&self) -> Self {
        if self.is_infinity {
            return *self;
        }
        Affine::new_unchecked(self.x, -self.y)
    }

    /// Convert to projective coordinates.
    #[inline]
    pub fn to_projective(&self) -> Projective {
        Projective::from_affine(self)
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::INFINITY
    }
}

impl Group for Affine {
    type Scalar = ScalarField;

    #[inline]
    fn identity() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn is_identity(&self) -> bool {
        self.is_infinity
    }

    #[inline]
    fn generator() -> Self {
        Affine::generator()
    }

    #[inline]
    fn double(&self) -> Self {
        Self::double(self)
    }

    #[inline]
    fn negate(&self) -> Self {
        Self::negate(self)
    }

    fn select(a: &Self, b: &Self, choice: bool) -> Self {
        let c = BaseField::from(choice as u64);
        let keep = BaseField::one() - c;
        Affine {
            x: a.x * keep + b.x * c,
            y: a.y * keep + b.y * c,
            is_infinity: a.is_infinity ^ ((a.is_infinity ^ b.is_infinity) & choice),
        }
    }

    /// Runs the ladder in projective coordinates with complete formulas.
    fn scalar_mul(&self, scalar: &ScalarField) -> Self {
        <Projective as Group>::scalar_mul(&self.to_projective(), scalar).to_affine()
    }
}

// Implement addition for affine points
impl Add for Affine {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        // Handle infinity cases
        if self.is_infinity {
            return other;
        }
        if other.is_infinity {
            return self;
        }

        // Check if points are the same
        if self.x == other.x {
            if self.y == other.y {
                // Point doubling
                return self.double();
            } else {
                // Points are inverses, return infinity
                return Self::INFINITY;
            }
        }

        // λ = (y2 - y1) / (x2 - x1), with x1 != x2 checked above
        let numerator = other.y - self.y;
        let Ok(denominator_inv) = checked_inverse(&(other.x - self.x)) else {
            return Self::INFINITY;
        };
        let lambda = numerator * denominator_inv;

        // x_r = λ^2 - x1 - x2
        let x_r = lambda.square() - self.x - other.x;

        // y_r = λ(x1 - x_r) - y1
        let y_r = lambda * (self.x - x_r) - self.y;

        Affine::new_unchecked(x_r, y_r)
    }
}

impl AddAssign for Affine {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Sub for Affine {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + other.negate()
    }
}

impl SubAssign for Affine {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Affine {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

// Scalar multiplication
impl Mul<ScalarField> for Affine {
    type Output = Self;

    fn mul(self, scalar: ScalarField) -> Self {
        <Self as Group>::scalar_mul(&self, &scalar)
    }
}

impl Mul<&ScalarField> for Affine {
    type Output = Self;

    fn mul(self, scalar: &ScalarField) -> Self {
        <Self as Group>::scalar_mul(&self, scalar)
    }
}

impl Mul<Affine> for ScalarField {
    type Output = Affine;

    fn mul(self, point: Affine) -> Affine {
        <Affine as Group>::scalar_mul(&point, &self)
    }
}
