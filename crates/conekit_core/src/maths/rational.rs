//! Exact rational number type
//!
//! A reduced fraction of two [`Integer`]s. The denominator of a finite
//! value is always positive and coprime to the numerator; zero is `0/1`.
//! Infinity is carried as the canonical form `1/0` and obeys the same
//! propagation rules as the integer layer.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::Integer;

/// Exact rational number (numerator / denominator), kept reduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rational {
    numerator: Integer,
    denominator: Integer,
}

impl Rational {
    /// Create a rational from numerator and denominator. A zero
    /// denominator gives the infinity element.
    pub fn new(num: Integer, den: Integer) -> Self {
        let mut r = Self { numerator: num, denominator: den };
        r.reduce();
        r
    }

    /// Create a rational from an integer.
    pub fn from_integer(n: Integer) -> Self {
        if n.is_infinite() {
            return Self::infinity();
        }
        Self { numerator: n, denominator: Integer::one() }
    }

    /// Create zero.
    pub fn zero() -> Self {
        Self { numerator: Integer::zero(), denominator: Integer::one() }
    }

    /// Create one.
    pub fn one() -> Self {
        Self { numerator: Integer::one(), denominator: Integer::one() }
    }

    /// Create the infinity element.
    pub fn infinity() -> Self {
        Self { numerator: Integer::one(), denominator: Integer::zero() }
    }

    /// The reduced numerator.
    pub fn numerator(&self) -> &Integer {
        &self.numerator
    }

    /// The reduced denominator; positive for finite values, zero for infinity.
    pub fn denominator(&self) -> &Integer {
        &self.denominator
    }

    /// Check if this rational is zero.
    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero() && !self.denominator.is_zero()
    }

    /// Check if this rational is the infinity element.
    pub fn is_infinite(&self) -> bool {
        self.denominator.is_zero()
    }

    /// Sign of the value: -1, 0 or 1. Infinity has sign 1.
    pub fn sign(&self) -> i32 {
        self.numerator.sign()
    }

    /// Largest integer not exceeding the value. Panics on infinity.
    pub fn floor(&self) -> Integer {
        if self.is_infinite() {
            panic!("invariant violated: floor requested on infinite rational");
        }
        let t = &self.numerator / &self.denominator;
        if self.numerator.sign() < 0 && !(&self.numerator % &self.denominator).is_zero() {
            t - Integer::one()
        } else {
            t
        }
    }

    /// Reduce to lowest terms and canonicalise signs.
    fn reduce(&mut self) {
        if self.denominator.is_zero() {
            self.numerator = Integer::one();
            return;
        }
        if self.numerator.is_zero() {
            self.denominator = Integer::one();
            return;
        }

        let g = self.numerator.gcd(&self.denominator);
        self.numerator = &self.numerator / &g;
        self.denominator = &self.denominator / &g;

        // Keep the denominator positive.
        if self.denominator.sign() < 0 {
            self.numerator.negate();
            self.denominator.negate();
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "inf")
        } else if self.denominator == Integer::one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(Integer::from(n))
    }
}

impl From<Integer> for Rational {
    fn from(n: Integer) -> Self {
        Self::from_integer(n)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_infinite(), other.is_infinite()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            // Denominators are positive, so cross-multiplication keeps the order.
            (false, false) => {
                (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
            }
        }
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, other: Self) -> Rational {
        if self.is_infinite() || other.is_infinite() {
            return Rational::infinity();
        }
        let num = &(&self.numerator * &other.denominator) + &(&other.numerator * &self.denominator);
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, other: Self) -> Rational {
        if self.is_infinite() && other.is_infinite() {
            panic!("invariant violated: indeterminate arithmetic form: inf - inf");
        }
        if self.is_infinite() || other.is_infinite() {
            return Rational::infinity();
        }
        let num = &(&self.numerator * &other.denominator) - &(&other.numerator * &self.denominator);
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, other: Self) -> Rational {
        if self.is_infinite() || other.is_infinite() {
            if self.is_zero() || other.is_zero() {
                panic!("invariant violated: indeterminate arithmetic form: 0 * inf");
            }
            return Rational::infinity();
        }
        let num = &self.numerator * &other.numerator;
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        &self * &other
    }
}

impl Div for &Rational {
    type Output = Rational;

    /// Division by zero gives infinity; a finite value divided by
    /// infinity gives zero.
    fn div(self, other: Self) -> Rational {
        if self.is_infinite() {
            return Rational::infinity();
        }
        if other.is_infinite() {
            return Rational::zero();
        }
        if other.is_zero() {
            return Rational::infinity();
        }
        let num = &self.numerator * &other.denominator;
        let den = &self.denominator * &other.numerator;
        Rational::new(num, den)
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        &self / &other
    }
}

impl Neg for &Rational {
    type Output = Rational;

    /// Negation fixes infinity, like [`Integer::negate`].
    fn neg(self) -> Rational {
        if self.is_infinite() {
            return Rational::infinity();
        }
        let mut r = self.clone();
        r.numerator.negate();
        r
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(mut self) -> Self {
        if self.is_infinite() {
            return self;
        }
        self.numerator.negate();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> Rational {
        Rational::new(Integer::from(n), Integer::from(d))
    }

    #[test]
    fn test_rational_arithmetic() {
        let a = rat(1, 2);
        let b = rat(1, 3);

        assert_eq!(&a + &b, rat(5, 6));
        assert_eq!(&a - &b, rat(1, 6));
        assert_eq!(&a * &b, rat(1, 6));
        assert_eq!(&a / &b, rat(3, 2));
        assert_eq!(-a, rat(-1, 2));
    }

    #[test]
    fn test_rational_reduction() {
        assert_eq!(rat(4, 8), rat(1, 2));
        assert_eq!(rat(3, -6), rat(-1, 2));
        assert_eq!(rat(0, 7), Rational::zero());
        assert_eq!(rat(-2, -4).to_string(), "1/2");
        assert_eq!(rat(6, 3).to_string(), "2");
    }

    #[test]
    fn test_rational_ordering() {
        assert!(rat(1, 3) < rat(1, 2));
        assert!(rat(-1, 2) < rat(-1, 3));
        assert!(rat(2, 1) == rat(4, 2));
        assert!(Rational::infinity() > rat(1 << 60, 1));
    }

    #[test]
    fn test_rational_floor() {
        assert_eq!(rat(7, 2).floor(), Integer::from(3));
        assert_eq!(rat(-7, 2).floor(), Integer::from(-4));
        assert_eq!(rat(6, 2).floor(), Integer::from(3));
        assert_eq!(rat(-6, 2).floor(), Integer::from(-3));
        assert_eq!(rat(0, 5).floor(), Integer::zero());
    }

    #[test]
    fn test_rational_infinity() {
        let inf = Rational::infinity();
        assert!(inf.is_infinite());
        assert!(rat(5, 0).is_infinite());
        assert_eq!(&inf + &rat(1, 2), Rational::infinity());
        assert_eq!(&rat(1, 2) - &inf, Rational::infinity());
        assert_eq!(&rat(1, 2) / &Rational::zero(), Rational::infinity());
        assert_eq!(&rat(1, 2) / &inf, Rational::zero());
        assert_eq!(inf.to_string(), "inf");
    }

    #[test]
    fn test_negated_infinity_stays_canonical() {
        let inf = Rational::infinity();
        let neg = -&inf;
        assert_eq!(neg.numerator(), &Integer::one());
        assert_eq!(neg.denominator(), &Integer::zero());
        assert_eq!(neg, inf);
        assert_eq!(neg.cmp(&inf), Ordering::Equal);
        assert_eq!(-inf.clone(), inf);
    }
}
