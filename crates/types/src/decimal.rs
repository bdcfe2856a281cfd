//! Truncating fixed-point decimal
//!
//! `Dec` stores a signed integer scaled by 10^18. Every multiplication and
//! division rounds toward zero, so a product of shares never exceeds the value
//! it was taken from. Allocation code relies on that to keep
//! `sum(parts) <= whole` and to credit the slack explicitly.

use crate::errors::MathError;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Number of fractional digits carried by every `Dec`.
pub const PRECISION: u32 = 18;

static PRECISION_MULTIPLIER: Lazy<BigInt> = Lazy::new(|| BigInt::from(10u8).pow(PRECISION));

fn precision_multiplier() -> &'static BigInt {
    &PRECISION_MULTIPLIER
}

/// Signed decimal with 18 fractional digits.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(BigInt);

impl Dec {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    pub fn one() -> Self {
        Self(precision_multiplier().clone())
    }

    /// Whole number `value`.
    pub fn from_int<T: Into<BigInt>>(value: T) -> Self {
        Self(value.into() * precision_multiplier())
    }

    /// `value * 10^-prec`, e.g. `new_with_prec(465, 1) == 46.5`.
    ///
    /// Panics if `prec` exceeds [`PRECISION`]; callers pass literals.
    pub fn new_with_prec(value: i64, prec: u32) -> Self {
        assert!(prec <= PRECISION, "precision {prec} exceeds {PRECISION}");
        Self(BigInt::from(value) * BigInt::from(10u8).pow(PRECISION - prec))
    }

    /// Builds a value from its raw scaled representation.
    pub fn from_raw(raw: BigInt) -> Self {
        Self(raw)
    }

    /// Raw scaled representation (value * 10^18).
    pub fn raw(&self) -> &BigInt {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// True when `0 <= self <= 1`.
    pub fn is_rate(&self) -> bool {
        !self.is_negative() && *self <= Self::one()
    }

    /// `self * other`, truncated toward zero.
    pub fn mul_truncate(&self, other: &Dec) -> Dec {
        Dec((&self.0 * &other.0) / precision_multiplier())
    }

    /// `self / other`, truncated toward zero.
    pub fn quo_truncate(&self, other: &Dec) -> Result<Dec, MathError> {
        if other.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        Ok(Dec((&self.0 * precision_multiplier()) / &other.0))
    }

    /// Exact multiplication by a whole number.
    pub fn mul_int(&self, n: u64) -> Dec {
        Dec(&self.0 * BigInt::from(n))
    }

    /// Integer part, truncated toward zero.
    pub fn truncate_int(&self) -> BigInt {
        &self.0 / precision_multiplier()
    }

    /// Integer part as `u128`, `None` when negative or out of range.
    pub fn to_u128_truncated(&self) -> Option<u128> {
        if self.is_negative() {
            return None;
        }
        self.truncate_int().to_u128()
    }

    /// `self - other`; fails when the result would be negative.
    pub fn checked_sub(&self, other: &Dec) -> Result<Dec, MathError> {
        let left = self - other;
        if left.is_negative() {
            return Err(MathError::Overflow("decimal subtraction below zero"));
        }
        Ok(left)
    }

    /// `1 - self`; used to turn a diverted share into the kept share.
    pub fn complement(&self) -> Dec {
        &Dec::one() - self
    }
}

impl From<u64> for Dec {
    fn from(value: u64) -> Self {
        Dec::from_int(value)
    }
}

impl From<i64> for Dec {
    fn from(value: i64) -> Self {
        Dec::from_int(value)
    }
}

impl From<u128> for Dec {
    fn from(value: u128) -> Self {
        Dec::from_int(value)
    }
}

/// Digits beyond the 18th are truncated.
impl From<Decimal> for Dec {
    fn from(value: Decimal) -> Self {
        let mantissa = BigInt::from(value.mantissa());
        let scale = value.scale();
        if scale <= PRECISION {
            Dec(mantissa * BigInt::from(10u8).pow(PRECISION - scale))
        } else {
            Dec(mantissa / BigInt::from(10u8).pow(scale - PRECISION))
        }
    }
}

impl<'a, 'b> Add<&'b Dec> for &'a Dec {
    type Output = Dec;

    fn add(self, other: &'b Dec) -> Dec {
        Dec(&self.0 + &other.0)
    }
}

impl Add for Dec {
    type Output = Dec;

    fn add(self, other: Dec) -> Dec {
        Dec(self.0 + other.0)
    }
}

impl<'a, 'b> Sub<&'b Dec> for &'a Dec {
    type Output = Dec;

    fn sub(self, other: &'b Dec) -> Dec {
        Dec(&self.0 - &other.0)
    }
}

impl Sub for Dec {
    type Output = Dec;

    fn sub(self, other: Dec) -> Dec {
        Dec(self.0 - other.0)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.abs();
        let integer = &abs / precision_multiplier();
        let fraction = &abs % precision_multiplier();
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{sign}{integer}.{:0>width$}",
            fraction.to_string(),
            width = PRECISION as usize
        )
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({self})")
    }
}

impl FromStr for Dec {
    type Err = MathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parse_err = |reason| MathError::Parse {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };

        if integer.is_empty() {
            return Err(parse_err("missing integer part"));
        }
        if fraction.len() > PRECISION as usize {
            return Err(parse_err("more than 18 fractional digits"));
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(integer) || !all_digits(fraction) {
            return Err(parse_err("non-digit character"));
        }

        let padded = format!("{integer}{fraction:0<width$}", width = PRECISION as usize);
        let raw = padded
            .parse::<BigInt>()
            .map_err(|_| parse_err("not a number"))?;
        Ok(Dec(if negative { -raw } else { raw }))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DecVisitor;

impl<'de> Visitor<'de> for DecVisitor {
    type Value = Dec;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string such as \"0.02\" or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Dec, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Dec, E> {
        Ok(Dec::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Dec, E> {
        Ok(Dec::from(v))
    }

    // Configuration files may write rates as bare floats; go through the
    // shortest decimal rendering so 0.02 stays 0.02.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Dec, E> {
        let decimal = Decimal::from_str(&v.to_string()).map_err(E::custom)?;
        Ok(Dec::from(decimal))
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Dec {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(dec("24.5").to_string(), "24.500000000000000000");
        assert_eq!(dec("0.02"), Dec::new_with_prec(2, 2));
        assert_eq!(dec("-1.25").to_string(), "-1.250000000000000000");
        assert_eq!(dec("7"), Dec::from_int(7u64));
        assert!(dec("0.000000000000000001").is_positive());

        assert!("1.0000000000000000001".parse::<Dec>().is_err());
        assert!("abc".parse::<Dec>().is_err());
        assert!(".5".parse::<Dec>().is_err());
    }

    #[test]
    fn test_mul_truncates_toward_zero() {
        // 1e-18 * 0.5 = 5e-19, below precision
        let tiny = dec("0.000000000000000001");
        assert_eq!(tiny.mul_truncate(&dec("0.5")), Dec::zero());

        let negative = dec("-0.000000000000000003");
        assert_eq!(negative.mul_truncate(&dec("0.5")), dec("-0.000000000000000001"));

        assert_eq!(dec("98").mul_truncate(&dec("0.5")), dec("49"));
    }

    #[test]
    fn test_quo_truncates_and_rejects_zero() {
        let third = Dec::one().quo_truncate(&dec("3")).unwrap();
        assert_eq!(third.to_string(), "0.333333333333333333");
        assert_eq!(
            Dec::one().quo_truncate(&Dec::zero()),
            Err(MathError::DivisionByZero)
        );

        // 2/3 truncates, never rounds up
        let two_thirds = dec("2").quo_truncate(&dec("3")).unwrap();
        assert_eq!(two_thirds.to_string(), "0.666666666666666666");
    }

    #[test]
    fn test_from_rust_decimal() {
        let d = Decimal::from_str("0.02").unwrap();
        assert_eq!(Dec::from(d), dec("0.02"));

        // 20 fractional digits truncate to 18
        let d = Decimal::from_str("0.12345678901234567899").unwrap();
        assert_eq!(Dec::from(d), dec("0.123456789012345678"));
    }

    #[test]
    fn test_rate_bounds_and_complement() {
        assert!(Dec::zero().is_rate());
        assert!(Dec::one().is_rate());
        assert!(!dec("1.000000000000000001").is_rate());
        assert!(!dec("-0.1").is_rate());
        assert_eq!(dec("0.25").complement(), dec("0.75"));
    }

    #[test]
    fn test_checked_sub() {
        assert_eq!(dec("1").checked_sub(&dec("0.2")).unwrap(), dec("0.8"));
        assert!(dec("0.2").checked_sub(&dec("0.2")).unwrap().is_zero());
        assert!(dec("0.2").checked_sub(&dec("0.3")).is_err());
    }

    #[test]
    fn test_truncate_int() {
        assert_eq!(dec("96.9").to_u128_truncated(), Some(96));
        assert_eq!(dec("-1").to_u128_truncated(), None);
    }

    #[test]
    fn test_serde_forms() {
        let json = serde_json::to_string(&dec("0.5")).unwrap();
        assert_eq!(json, "\"0.500000000000000000\"");

        let parsed: Dec = serde_json::from_str("\"0.02\"").unwrap();
        assert_eq!(parsed, dec("0.02"));
        let parsed: Dec = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, dec("3"));
        let parsed: Dec = serde_json::from_str("0.02").unwrap();
        assert_eq!(parsed, dec("0.02"));
    }
}
