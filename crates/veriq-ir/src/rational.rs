//! Exact rational multiples of pi.
//!
//! `rzq(num, den)` gates carry their angle as `num/den * pi`, which lets
//! rotation merging stay exact. Values are kept in lowest terms and reduced
//! into the half-open interval `[0, 2)`.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// Largest denominator accepted when recovering a rational from a float.
pub const MAX_RECOVERED_DENOMINATOR: i64 = 1 << 16;

const RECOVERY_TOLERANCE: f64 = 1e-9;

/// An angle `num/den * pi` in lowest terms with `0 <= num/den < 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    /// The zero angle.
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    /// Build a normalized rational from a numerator and denominator.
    pub fn new(num: i64, den: i64) -> IrResult<Self> {
        if den == 0 {
            return Err(IrError::ZeroDenominator { num, den });
        }
        Ok(Self::normalized(num, den))
    }

    fn normalized(num: i64, den: i64) -> Self {
        let (mut num, mut den) = if den < 0 { (-num, -den) } else { (num, den) };
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1);
        num /= g as i64;
        den /= g as i64;
        // Reduce modulo 2 (i.e. modulo 2*den in the numerator).
        let period = 2 * den;
        num = num.rem_euclid(period);
        Self { num, den }
    }

    /// Numerator in lowest terms.
    pub fn num(self) -> i64 {
        self.num
    }

    /// Denominator in lowest terms (always positive).
    pub fn den(self) -> i64 {
        self.den
    }

    /// True for the zero angle.
    pub fn is_zero(self) -> bool {
        self.num == 0
    }

    /// True when the angle is a multiple of pi/2.
    pub fn is_clifford(self) -> bool {
        matches!(self.den, 1 | 2)
    }

    /// The multiple of pi as a float.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// The angle in radians.
    pub fn radians(self) -> f64 {
        self.to_f64() * std::f64::consts::PI
    }

    /// Recover an exact rational from an angle in radians.
    ///
    /// Returns `None` when no fraction with a power-of-two denominator up to
    /// [`MAX_RECOVERED_DENOMINATOR`] lies within tolerance.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_radians(theta: f64) -> Option<Self> {
        if !theta.is_finite() {
            return None;
        }
        let multiple = theta / std::f64::consts::PI;
        let mut den = 1_i64;
        while den <= MAX_RECOVERED_DENOMINATOR {
            let scaled = multiple * den as f64;
            let rounded = scaled.round();
            if (scaled - rounded).abs() < RECOVERY_TOLERANCE * den as f64 {
                return Some(Self::normalized(rounded as i64, den));
            }
            den *= 2;
        }
        None
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        let g = gcd(self.den.unsigned_abs(), rhs.den.unsigned_abs()) as i64;
        let den = self.den / g * rhs.den;
        let num = self.num * (den / self.den) + rhs.num * (den / rhs.den);
        Rational::normalized(num, den)
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational::normalized(-self.num, self.den)
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        self + (-rhs)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalization() {
        let r = Rational::new(2, 4).unwrap();
        assert_eq!((r.num(), r.den()), (1, 2));

        let wrapped = Rational::new(5, 2).unwrap();
        assert_eq!((wrapped.num(), wrapped.den()), (1, 2));

        let negative = Rational::new(-1, 4).unwrap();
        assert_eq!((negative.num(), negative.den()), (7, 4));

        let flipped = Rational::new(1, -2).unwrap();
        assert_eq!((flipped.num(), flipped.den()), (3, 2));
    }

    #[test]
    fn test_zero_denominator() {
        assert!(Rational::new(1, 0).is_err());
    }

    #[test]
    fn test_addition_wraps() {
        let a = Rational::new(3, 2).unwrap();
        let b = Rational::new(1, 2).unwrap();
        assert!((a + b).is_zero());

        let t = Rational::new(1, 4).unwrap();
        assert_eq!(t + t, Rational::new(1, 2).unwrap());
    }

    #[test]
    fn test_from_radians() {
        assert_eq!(
            Rational::from_radians(PI / 4.0),
            Some(Rational::new(1, 4).unwrap())
        );
        assert_eq!(
            Rational::from_radians(-PI / 2.0),
            Some(Rational::new(3, 2).unwrap())
        );
        assert_eq!(Rational::from_radians(0.123_456), None);
    }

    #[test]
    fn test_clifford() {
        assert!(Rational::new(1, 2).unwrap().is_clifford());
        assert!(Rational::ZERO.is_clifford());
        assert!(!Rational::new(1, 4).unwrap().is_clifford());
    }

    proptest! {
        #[test]
        fn prop_sum_with_negation_is_zero(num in -64i64..64, exp in 0u32..6) {
            let r = Rational::new(num, 1 << exp).unwrap();
            prop_assert!((r + (-r)).is_zero());
        }

        #[test]
        fn prop_always_in_range(num in -1000i64..1000, den in 1i64..64) {
            let r = Rational::new(num, den).unwrap();
            prop_assert!(r.to_f64() >= 0.0 && r.to_f64() < 2.0);
        }
    }
}
