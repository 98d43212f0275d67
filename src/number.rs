// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(
    clippy::arithmetic_side_effects,
    clippy::as_conversions,
    clippy::pattern_type_mismatch
)]

use core::cmp::Ordering;
use core::fmt::{self, Debug, Display, Formatter};
use core::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::Rc;

/// Significant decimal digits kept when a quotient does not terminate.
///
/// 154 digits is roughly what a 512-bit binary mantissa can hold.
pub const DIVISION_DIGITS: u64 = 154;

/// Errors from number parsing and from arithmetic that has no defined result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("invalid number syntax {0:?}")]
    Syntax(String),
    #[error("NaN is not a number")]
    NotANumber,
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0} is undefined")]
    Undefined(&'static str),
    #[error("decimal exponent out of range")]
    ExponentOverflow,
}

/// An arbitrary-precision decimal number, or one of the two infinities.
///
/// Numbers are kept in a canonical form: integers that fit in an `i64` use
/// [`Number::Int`], everything else is a mantissa without trailing zeros
/// scaled by a power of ten. Two numbers are therefore equal exactly when
/// their decimal text is equal, which also means `-0 == 0`.
#[derive(Clone)]
pub enum Number {
    Int(i64),
    Decimal(Rc<Decimal>),
    PosInfinity,
    NegInfinity,
}

/// `mantissa * 10^exponent`, normalized so that the mantissa has no
/// trailing decimal zeros.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decimal {
    mantissa: BigInt,
    exponent: i64,
}

impl Decimal {
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }
}

impl Number {
    pub fn zero() -> Number {
        Number::Int(0)
    }

    /// Builds the canonical number for `mantissa * 10^exponent`.
    pub fn from_parts(mut mantissa: BigInt, mut exponent: i64) -> Number {
        if mantissa.is_zero() {
            return Number::Int(0);
        }

        let ten = BigInt::from(10u8);
        while (&mantissa % &ten).is_zero() {
            mantissa /= &ten;
            exponent += 1;
        }

        if (0..=18).contains(&exponent) {
            let scaled = &mantissa * pow10_bigint(exponent as u32);
            if let Some(i) = scaled.to_i64() {
                return Number::Int(i);
            }
        }

        Number::Decimal(Rc::new(Decimal { mantissa, exponent }))
    }

    /// Converts a binary float through its shortest round-trip decimal text,
    /// so that `0.1` becomes exactly one tenth.
    pub fn from_f64(f: f64) -> Option<Number> {
        if f.is_nan() {
            return None;
        }
        if f.is_infinite() {
            return Some(if f > 0.0 {
                Number::PosInfinity
            } else {
                Number::NegInfinity
            });
        }
        Number::from_str(&format!("{f:e}")).ok()
    }

    fn to_parts(&self) -> Option<(BigInt, i64)> {
        match self {
            Number::Int(i) => Some((BigInt::from(*i), 0)),
            Number::Decimal(d) => Some((d.mantissa.clone(), d.exponent)),
            Number::PosInfinity | Number::NegInfinity => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Number::Int(0))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Number::PosInfinity | Number::NegInfinity)
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Int(i) => *i < 0,
            Number::Decimal(d) => d.mantissa.is_negative(),
            Number::PosInfinity => false,
            Number::NegInfinity => true,
        }
    }

    fn signum(&self) -> i8 {
        match self {
            Number::Int(i) => i.signum() as i8,
            Number::Decimal(d) => match d.mantissa.sign() {
                Sign::Minus => -1,
                Sign::NoSign => 0,
                Sign::Plus => 1,
            },
            Number::PosInfinity => 1,
            Number::NegInfinity => -1,
        }
    }

    fn infinity_with_sign(sign: i8) -> Number {
        if sign < 0 {
            Number::NegInfinity
        } else {
            Number::PosInfinity
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Decimal(d) => d.exponent >= 0,
            Number::PosInfinity | Number::NegInfinity => false,
        }
    }

    pub fn to_big_int(&self) -> Option<BigInt> {
        match self {
            Number::Int(i) => Some(BigInt::from(*i)),
            Number::Decimal(d) if d.exponent >= 0 => {
                let exp = u32::try_from(d.exponent).ok()?;
                Some(&d.mantissa * pow10_bigint(exp))
            }
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::Int(i) => u64::try_from(*i).ok(),
            _ => self.to_big_int()?.to_u64(),
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        self.as_u64().and_then(|u| usize::try_from(u).ok())
    }

    /// Nearest binary float. Infinities map to the float infinities.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Decimal(d) => format!("{}e{}", d.mantissa, d.exponent)
                .parse::<f64>()
                .unwrap_or(if d.mantissa.is_negative() {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }),
            Number::PosInfinity => f64::INFINITY,
            Number::NegInfinity => f64::NEG_INFINITY,
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Int(i) => match i.checked_neg() {
                Some(n) => Number::Int(n),
                None => Number::from_parts(-BigInt::from(*i), 0),
            },
            Number::Decimal(d) => Number::from_parts(-d.mantissa.clone(), d.exponent),
            Number::PosInfinity => Number::NegInfinity,
            Number::NegInfinity => Number::PosInfinity,
        }
    }

    pub fn abs(&self) -> Number {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    pub fn add(&self, rhs: &Self) -> Result<Number, NumberError> {
        match (self, rhs) {
            (Number::PosInfinity, Number::NegInfinity)
            | (Number::NegInfinity, Number::PosInfinity) => {
                Err(NumberError::Undefined("sum of opposite infinities"))
            }
            (inf @ (Number::PosInfinity | Number::NegInfinity), _)
            | (_, inf @ (Number::PosInfinity | Number::NegInfinity)) => Ok(inf.clone()),
            (Number::Int(a), Number::Int(b)) => match a.checked_add(*b) {
                Some(sum) => Ok(Number::Int(sum)),
                None => Ok(Number::from_parts(BigInt::from(*a) + BigInt::from(*b), 0)),
            },
            _ => {
                let (am, ae, bm, be) = self.aligned_parts(rhs)?;
                debug_assert_eq!(ae, be);
                Ok(Number::from_parts(am + bm, ae))
            }
        }
    }

    pub fn sub(&self, rhs: &Self) -> Result<Number, NumberError> {
        self.add(&rhs.neg())
    }

    pub fn mul(&self, rhs: &Self) -> Result<Number, NumberError> {
        if self.is_infinite() || rhs.is_infinite() {
            let sign = self.signum() * rhs.signum();
            if sign == 0 {
                return Err(NumberError::Undefined("product of infinity and zero"));
            }
            return Ok(Number::infinity_with_sign(sign));
        }

        if let (Number::Int(a), Number::Int(b)) = (self, rhs) {
            if let Some(prod) = a.checked_mul(*b) {
                return Ok(Number::Int(prod));
            }
        }

        let (am, ae) = self.finite_parts()?;
        let (bm, be) = rhs.finite_parts()?;
        let exponent = ae.checked_add(be).ok_or(NumberError::ExponentOverflow)?;
        Ok(Number::from_parts(am * bm, exponent))
    }

    /// Divides, producing an exact result when the quotient terminates and
    /// [`DIVISION_DIGITS`] significant digits otherwise. Dividing a non-zero
    /// number by zero gives an infinity with the dividend's sign.
    pub fn divide(&self, rhs: &Self) -> Result<Number, NumberError> {
        match (self.is_infinite(), rhs.is_infinite()) {
            (true, true) => return Err(NumberError::Undefined("quotient of two infinities")),
            (true, false) => {
                let divisor_sign = if rhs.is_negative() { -1 } else { 1 };
                return Ok(Number::infinity_with_sign(self.signum() * divisor_sign));
            }
            (false, true) => return Ok(Number::zero()),
            (false, false) => {}
        }

        if rhs.is_zero() {
            if self.is_zero() {
                return Err(NumberError::Undefined("zero divided by zero"));
            }
            return Ok(Number::infinity_with_sign(self.signum()));
        }
        if self.is_zero() {
            return Ok(Number::zero());
        }

        let (am, ae) = self.finite_parts()?;
        let (bm, be) = rhs.finite_parts()?;

        let a_digits = decimal_digits(&am) as i64;
        let b_digits = decimal_digits(&bm) as i64;
        let scale = (DIVISION_DIGITS as i64 + b_digits - a_digits).max(0);
        let scale_u32 = u32::try_from(scale).map_err(|_| NumberError::ExponentOverflow)?;

        let numerator = am * pow10_bigint(scale_u32);
        let mut quotient = &numerator / &bm;
        let remainder = &numerator % &bm;
        if !remainder.is_zero() && remainder.abs() * 2u8 >= bm.abs() {
            if numerator.is_negative() != bm.is_negative() {
                quotient -= BigInt::one();
            } else {
                quotient += BigInt::one();
            }
        }

        let exponent = ae
            .checked_sub(be)
            .and_then(|e| e.checked_sub(scale))
            .ok_or(NumberError::ExponentOverflow)?;
        Ok(Number::from_parts(quotient, exponent))
    }

    /// Remainder of truncated division; the result has the dividend's sign.
    pub fn modulo(&self, rhs: &Self) -> Result<Number, NumberError> {
        if rhs.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        if self.is_infinite() {
            return Err(NumberError::Undefined("remainder of infinity"));
        }
        if rhs.is_infinite() {
            return Ok(self.clone());
        }

        if let (Number::Int(a), Number::Int(b)) = (self, rhs) {
            if let Some(rem) = a.checked_rem(*b) {
                return Ok(Number::Int(rem));
            }
        }

        let (am, e, bm, _) = self.aligned_parts(rhs)?;
        Ok(Number::from_parts(am % bm, e))
    }

    fn finite_parts(&self) -> Result<(BigInt, i64), NumberError> {
        self.to_parts()
            .ok_or(NumberError::Undefined("finite operation on infinity"))
    }

    // Both operands rescaled to the smaller of the two exponents.
    fn aligned_parts(&self, rhs: &Self) -> Result<(BigInt, i64, BigInt, i64), NumberError> {
        let (am, ae) = self.finite_parts()?;
        let (bm, be) = rhs.finite_parts()?;
        let e = ae.min(be);
        let a_shift = u32::try_from(ae - e).map_err(|_| NumberError::ExponentOverflow)?;
        let b_shift = u32::try_from(be - e).map_err(|_| NumberError::ExponentOverflow)?;
        Ok((am * pow10_bigint(a_shift), e, bm * pow10_bigint(b_shift), e))
    }

    /// Plain decimal text without exponent notation, `+Inf` or `-Inf`.
    pub fn format_decimal(&self) -> String {
        match self {
            Number::Int(i) => i.to_string(),
            Number::PosInfinity => "+Inf".to_string(),
            Number::NegInfinity => "-Inf".to_string(),
            Number::Decimal(d) => {
                let negative = d.mantissa.is_negative();
                let digits = d.mantissa.magnitude().to_str_radix(10);
                let mut out = String::with_capacity(digits.len() + 4);
                if negative {
                    out.push('-');
                }
                if d.exponent >= 0 {
                    out.push_str(&digits);
                    out.extend(core::iter::repeat('0').take(d.exponent as usize));
                } else {
                    let frac_len = d.exponent.unsigned_abs() as usize;
                    if digits.len() > frac_len {
                        let (int_part, frac_part) = digits.split_at(digits.len() - frac_len);
                        out.push_str(int_part);
                        out.push('.');
                        out.push_str(frac_part);
                    } else {
                        out.push_str("0.");
                        out.extend(core::iter::repeat('0').take(frac_len - digits.len()));
                        out.push_str(&digits);
                    }
                }
                out
            }
        }
    }
}

fn decimal_digits(m: &BigInt) -> usize {
    m.magnitude().to_str_radix(10).len()
}

fn pow10_bigint(exp: u32) -> BigInt {
    if exp == 0 {
        return BigInt::one();
    }

    let mut result = BigInt::one();
    let mut base = BigInt::from(10u8);
    let mut e = exp;

    while e > 0 {
        if e & 1 == 1 {
            result *= &base;
        }
        if e > 1 {
            base = &base * &base;
        }
        e >>= 1;
    }

    result
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_decimal())
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_decimal())
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(i64::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Int(i64::from(value))
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Number::Int(i),
            Err(_) => Number::from_parts(BigInt::from(value), 0),
        }
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number::from(value as u64)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::from_parts(value, 0)
    }
}

impl FromStr for Number {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || NumberError::Syntax(s.to_string());
        let trimmed = s.trim();

        let (negative, unsigned) = if let Some(rest) = trimmed.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            (false, rest)
        } else {
            (false, trimmed)
        };

        if unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity") {
            return Ok(if negative {
                Number::NegInfinity
            } else {
                Number::PosInfinity
            });
        }
        if unsigned.eq_ignore_ascii_case("nan") {
            return Err(NumberError::NotANumber);
        }

        let (mantissa_text, exponent) = match unsigned.find(['e', 'E']) {
            Some(idx) => {
                let exp_text = &unsigned[idx + 1..];
                let exp = exp_text.parse::<i64>().map_err(|_| syntax())?;
                (&unsigned[..idx], exp)
            }
            None => (unsigned, 0),
        };

        let mut digits = String::with_capacity(mantissa_text.len());
        let mut fractional_len: i64 = 0;
        let mut seen_dot = false;
        for ch in mantissa_text.chars() {
            match ch {
                '.' if !seen_dot => seen_dot = true,
                '0'..='9' => {
                    digits.push(ch);
                    if seen_dot {
                        fractional_len += 1;
                    }
                }
                _ => return Err(syntax()),
            }
        }
        if digits.is_empty() {
            return Err(syntax());
        }

        let mut mantissa = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(syntax)?;
        if negative {
            mantissa = -mantissa;
        }
        let exponent = exponent
            .checked_sub(fractional_len)
            .ok_or(NumberError::ExponentOverflow)?;
        Ok(Number::from_parts(mantissa, exponent))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => return a.cmp(b),
            (Number::PosInfinity, Number::PosInfinity)
            | (Number::NegInfinity, Number::NegInfinity) => return Ordering::Equal,
            (Number::PosInfinity, _) | (_, Number::NegInfinity) => return Ordering::Greater,
            (Number::NegInfinity, _) | (_, Number::PosInfinity) => return Ordering::Less,
            _ => {}
        }

        let (sa, sb) = (self.signum(), other.signum());
        if sa != sb || sa == 0 {
            return sa.cmp(&sb);
        }

        let (Some((am, ae)), Some((bm, be))) = (self.to_parts(), other.to_parts()) else {
            return Ordering::Equal;
        };

        // Compare orders of magnitude first so that wildly different
        // exponents never need a huge power of ten.
        let a_mag = decimal_digits(&am) as i128 + i128::from(ae);
        let b_mag = decimal_digits(&bm) as i128 + i128::from(be);
        if a_mag != b_mag {
            let by_magnitude = a_mag.cmp(&b_mag);
            return if sa > 0 {
                by_magnitude
            } else {
                by_magnitude.reverse()
            };
        }

        let e = ae.min(be);
        let a = am * pow10_bigint((ae - e) as u32);
        let b = bm * pow10_bigint((be - e) as u32);
        a.cmp(&b)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
