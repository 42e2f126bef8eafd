//! Arbitrary-precision signed integers with a machine-word fast path
//!
//! `Integer` stores small values in a plain `i64` and switches to a heap
//! `BigInt` only when a result leaves the native range. Every operation
//! that can shrink its result normalises back to the native form, so the
//! heap representation is never kept for a value that fits in a word.
//! A single unsigned `infinity` element sits above all finite values and
//! propagates through arithmetic.
//!
//! Representation invariants:
//! - the native form never stores `i64::MIN` (reserved);
//! - the heap form only holds values outside the native range;
//! - zero is always the native `0`.

use num_bigint::BigInt;
use num_integer::Integer as IntegerOps;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::str::FromStr;

use super::{ArithmeticError, Result};

#[derive(Clone)]
enum Repr {
    Native(i64),
    Large(Box<BigInt>),
    Infinity,
}

/// Signed integer of unbounded magnitude with an infinity element.
#[derive(Clone)]
pub struct Integer {
    repr: Repr,
}

impl Integer {
    /// Create zero.
    pub fn zero() -> Self {
        Self { repr: Repr::Native(0) }
    }

    /// Create one.
    pub fn one() -> Self {
        Self { repr: Repr::Native(1) }
    }

    /// Create the infinity element.
    pub fn infinity() -> Self {
        Self { repr: Repr::Infinity }
    }

    /// Create from a heap integer, normalising to the native form when it fits.
    pub fn from_bigint(value: BigInt) -> Self {
        Self { repr: normalised(value) }
    }

    /// Convert to a heap integer. Panics on infinity.
    pub fn to_bigint(&self) -> BigInt {
        match &self.repr {
            Repr::Native(v) => BigInt::from(*v),
            Repr::Large(b) => (**b).clone(),
            Repr::Infinity => panic!("invariant violated: finite integer required, found infinity"),
        }
    }

    /// Return the value as an `i64` if it fits, `None` otherwise.
    pub fn to_i64(&self) -> Option<i64> {
        match &self.repr {
            Repr::Native(v) => Some(*v),
            Repr::Large(b) => b.to_i64(),
            Repr::Infinity => None,
        }
    }

    /// True iff this is the infinity element.
    pub fn is_infinite(&self) -> bool {
        matches!(self.repr, Repr::Infinity)
    }

    /// True iff this is zero.
    pub fn is_zero(&self) -> bool {
        matches!(self.repr, Repr::Native(0))
    }

    /// Sign of the value: -1, 0 or 1. Infinity has sign 1.
    pub fn sign(&self) -> i32 {
        match &self.repr {
            Repr::Native(v) => match v.cmp(&0) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            },
            Repr::Large(b) => {
                if b.is_negative() {
                    -1
                } else {
                    1
                }
            }
            Repr::Infinity => 1,
        }
    }

    /// True iff the value is even. Panics on infinity.
    pub fn is_even(&self) -> bool {
        match &self.repr {
            Repr::Native(v) => v % 2 == 0,
            Repr::Large(b) => b.is_even(),
            Repr::Infinity => panic!("invariant violated: parity requested on infinity"),
        }
    }

    /// Absolute value. Infinity stays infinity.
    pub fn abs(&self) -> Integer {
        match &self.repr {
            Repr::Native(v) => Integer { repr: Repr::Native(v.abs()) },
            Repr::Large(b) => Integer::from_bigint(b.abs()),
            Repr::Infinity => Integer::infinity(),
        }
    }

    /// Negate in place. Infinity stays infinity.
    pub fn negate(&mut self) {
        match &mut self.repr {
            Repr::Native(v) => *v = -*v,
            Repr::Large(b) => {
                let neg = -(**b).clone();
                self.repr = normalised(neg);
            }
            Repr::Infinity => {}
        }
    }

    /// Greatest common divisor; always non-negative, `gcd(0, 0) = 0`.
    /// Panics if either operand is infinity.
    pub fn gcd(&self, other: &Integer) -> Integer {
        match (&self.repr, &other.repr) {
            (Repr::Native(a), Repr::Native(b)) => {
                Integer { repr: Repr::Native(gcd_native(*a, *b)) }
            }
            (Repr::Infinity, _) | (_, Repr::Infinity) => {
                panic!("invariant violated: gcd requested on infinity")
            }
            _ => Integer::from_bigint(self.to_bigint().gcd(&other.to_bigint())),
        }
    }

    /// True iff `other` divides this value exactly.
    /// A zero divisor divides only zero. Panics if either operand is infinity.
    pub fn divisible_by(&self, other: &Integer) -> bool {
        if self.is_infinite() || other.is_infinite() {
            panic!("invariant violated: divisibility requested on infinity");
        }
        if other.is_zero() {
            return self.is_zero();
        }
        (self % other).is_zero()
    }

    /// Exact quotient `self / other`; fails with `NotExact` when the
    /// division leaves a remainder or the divisor is zero.
    /// Panics if either operand is infinity.
    pub fn div_exact(&self, other: &Integer) -> Result<Integer> {
        if self.is_infinite() || other.is_infinite() {
            panic!("invariant violated: exact division requested on infinity");
        }
        if other.is_zero() {
            return Err(ArithmeticError::NotExact);
        }
        match (&self.repr, &other.repr) {
            (Repr::Native(a), Repr::Native(b)) => {
                if a % b != 0 {
                    return Err(ArithmeticError::NotExact);
                }
                Ok(Integer { repr: Repr::Native(a / b) })
            }
            _ => {
                let (q, r) = self.to_bigint().div_rem(&other.to_bigint());
                if !r.is_zero() {
                    return Err(ArithmeticError::NotExact);
                }
                Ok(Integer::from_bigint(q))
            }
        }
    }

    /// Raise to a non-negative power. `x^0 = 1` for every x; otherwise
    /// infinity stays infinity.
    pub fn pow(&self, exp: u32) -> Integer {
        if exp == 0 {
            return Integer::one();
        }
        match &self.repr {
            Repr::Native(v) => match v.checked_pow(exp) {
                Some(r) if r != i64::MIN => Integer { repr: Repr::Native(r) },
                _ => Integer::from_bigint(BigInt::from(*v).pow(exp)),
            },
            Repr::Large(b) => Integer::from_bigint(b.pow(exp)),
            Repr::Infinity => Integer::infinity(),
        }
    }

    /// Subtraction surfacing the indeterminate form `inf - inf` as an error.
    pub fn checked_sub(&self, other: &Integer) -> Result<Integer> {
        match (&self.repr, &other.repr) {
            (Repr::Infinity, Repr::Infinity) => {
                Err(ArithmeticError::Indeterminate("inf - inf"))
            }
            (Repr::Infinity, _) | (_, Repr::Infinity) => Ok(Integer::infinity()),
            (Repr::Native(a), Repr::Native(b)) => Ok(sub_native(*a, *b)),
            _ => Ok(Integer::from_bigint(self.to_bigint() - other.to_bigint())),
        }
    }

    /// Multiplication surfacing the indeterminate form `0 * inf` as an error.
    pub fn checked_mul(&self, other: &Integer) -> Result<Integer> {
        match (&self.repr, &other.repr) {
            (Repr::Infinity, _) | (_, Repr::Infinity) => {
                if self.is_zero() || other.is_zero() {
                    Err(ArithmeticError::Indeterminate("0 * inf"))
                } else {
                    Ok(Integer::infinity())
                }
            }
            (Repr::Native(a), Repr::Native(b)) => Ok(mul_native(*a, *b)),
            _ => Ok(Integer::from_bigint(self.to_bigint() * other.to_bigint())),
        }
    }
}

/// Normalise a heap value: collapse to the native form whenever it fits.
fn normalised(value: BigInt) -> Repr {
    match value.to_i64() {
        Some(v) if v != i64::MIN => Repr::Native(v),
        _ => Repr::Large(Box::new(value)),
    }
}

fn sub_native(a: i64, b: i64) -> Integer {
    match a.checked_sub(b) {
        Some(r) if r != i64::MIN => Integer { repr: Repr::Native(r) },
        _ => Integer::from_bigint(BigInt::from(a) - BigInt::from(b)),
    }
}

fn mul_native(a: i64, b: i64) -> Integer {
    // A single widening multiply covers every overflow case.
    let wide = (a as i128) * (b as i128);
    if wide > i64::MIN as i128 && wide <= i64::MAX as i128 {
        Integer { repr: Repr::Native(wide as i64) }
    } else {
        Integer::from_bigint(BigInt::from(wide))
    }
}

/// Stein's binary gcd on native magnitudes.
fn gcd_native(a: i64, b: i64) -> i64 {
    let mut u = a.unsigned_abs();
    let mut v = b.unsigned_abs();
    if u == 0 {
        return v as i64;
    }
    if v == 0 {
        return u as i64;
    }
    let shift = (u | v).trailing_zeros();
    u >>= u.trailing_zeros();
    loop {
        v >>= v.trailing_zeros();
        if u > v {
            std::mem::swap(&mut u, &mut v);
        }
        v -= u;
        if v == 0 {
            return (u << shift) as i64;
        }
    }
}

impl Default for Integer {
    fn default() -> Self {
        Integer::zero()
    }
}

impl From<i64> for Integer {
    fn from(v: i64) -> Self {
        if v == i64::MIN {
            Integer::from_bigint(BigInt::from(v))
        } else {
            Integer { repr: Repr::Native(v) }
        }
    }
}

impl From<i32> for Integer {
    fn from(v: i32) -> Self {
        Integer { repr: Repr::Native(v as i64) }
    }
}

impl From<u32> for Integer {
    fn from(v: u32) -> Self {
        Integer { repr: Repr::Native(v as i64) }
    }
}

impl From<u64> for Integer {
    fn from(v: u64) -> Self {
        if v <= i64::MAX as u64 {
            Integer { repr: Repr::Native(v as i64) }
        } else {
            Integer::from_bigint(BigInt::from(v))
        }
    }
}

impl From<usize> for Integer {
    fn from(v: usize) -> Self {
        Integer::from(v as u64)
    }
}

impl From<BigInt> for Integer {
    fn from(v: BigInt) -> Self {
        Integer::from_bigint(v)
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Integer {}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.repr, &other.repr) {
            (Repr::Infinity, Repr::Infinity) => Ordering::Equal,
            (Repr::Infinity, _) => Ordering::Greater,
            (_, Repr::Infinity) => Ordering::Less,
            (Repr::Native(a), Repr::Native(b)) => a.cmp(b),
            (Repr::Large(a), Repr::Native(b)) => match a.to_i64() {
                Some(v) => v.cmp(b),
                None => {
                    if a.is_negative() {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    }
                }
            },
            (Repr::Native(_), Repr::Large(_)) => other.cmp(self).reverse(),
            (Repr::Large(a), Repr::Large(b)) => a.cmp(b),
        }
    }
}

impl Add for &Integer {
    type Output = Integer;

    fn add(self, other: Self) -> Integer {
        match (&self.repr, &other.repr) {
            (Repr::Infinity, _) | (_, Repr::Infinity) => Integer::infinity(),
            (Repr::Native(a), Repr::Native(b)) => match a.checked_add(*b) {
                Some(r) if r != i64::MIN => Integer { repr: Repr::Native(r) },
                _ => Integer::from_bigint(BigInt::from(*a) + BigInt::from(*b)),
            },
            _ => Integer::from_bigint(self.to_bigint() + other.to_bigint()),
        }
    }
}

impl Add for Integer {
    type Output = Integer;

    fn add(self, other: Self) -> Integer {
        &self + &other
    }
}

impl Sub for &Integer {
    type Output = Integer;

    fn sub(self, other: Self) -> Integer {
        match self.checked_sub(other) {
            Ok(r) => r,
            Err(e) => panic!("invariant violated: {e}"),
        }
    }
}

impl Sub for Integer {
    type Output = Integer;

    fn sub(self, other: Self) -> Integer {
        &self - &other
    }
}

impl Mul for &Integer {
    type Output = Integer;

    fn mul(self, other: Self) -> Integer {
        match self.checked_mul(other) {
            Ok(r) => r,
            Err(e) => panic!("invariant violated: {e}"),
        }
    }
}

impl Mul for Integer {
    type Output = Integer;

    fn mul(self, other: Self) -> Integer {
        &self * &other
    }
}

impl Div for &Integer {
    type Output = Integer;

    /// Quotient truncated toward zero. Division by zero gives infinity;
    /// a finite value divided by infinity gives zero.
    fn div(self, other: Self) -> Integer {
        if self.is_infinite() {
            return Integer::infinity();
        }
        if other.is_infinite() {
            return Integer::zero();
        }
        if other.is_zero() {
            return Integer::infinity();
        }
        match (&self.repr, &other.repr) {
            (Repr::Native(a), Repr::Native(b)) => Integer { repr: Repr::Native(a / b) },
            _ => Integer::from_bigint(self.to_bigint() / other.to_bigint()),
        }
    }
}

impl Div for Integer {
    type Output = Integer;

    fn div(self, other: Self) -> Integer {
        &self / &other
    }
}

impl Rem for &Integer {
    type Output = Integer;

    /// Remainder of truncated division; the sign follows the dividend.
    /// A remainder modulo zero is the dividend itself, and a finite value
    /// modulo infinity is also the dividend.
    fn rem(self, other: Self) -> Integer {
        if self.is_infinite() {
            return Integer::infinity();
        }
        if other.is_infinite() || other.is_zero() {
            return self.clone();
        }
        match (&self.repr, &other.repr) {
            (Repr::Native(a), Repr::Native(b)) => Integer { repr: Repr::Native(a % b) },
            _ => Integer::from_bigint(self.to_bigint() % other.to_bigint()),
        }
    }
}

impl Rem for Integer {
    type Output = Integer;

    fn rem(self, other: Self) -> Integer {
        &self % &other
    }
}

impl Neg for &Integer {
    type Output = Integer;

    fn neg(self) -> Integer {
        let mut r = self.clone();
        r.negate();
        r
    }
}

impl Neg for Integer {
    type Output = Integer;

    fn neg(mut self) -> Integer {
        self.negate();
        self
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Native(v) => write!(f, "{v}"),
            Repr::Large(b) => write!(f, "{b}"),
            Repr::Infinity => write!(f, "inf"),
        }
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Integer {
    type Err = ArithmeticError;

    /// Parse a decimal string with an optional leading sign. The string
    /// `"inf"` parses to the infinity element.
    fn from_str(s: &str) -> Result<Self> {
        if s == "inf" {
            return Ok(Integer::infinity());
        }
        match i64::from_str(s) {
            Ok(v) if v != i64::MIN => Ok(Integer { repr: Repr::Native(v) }),
            _ => match BigInt::from_str(s) {
                Ok(b) => Ok(Integer::from_bigint(b)),
                Err(_) => Err(ArithmeticError::Parse(s.to_string())),
            },
        }
    }
}
