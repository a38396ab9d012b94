//! Decimal arithmetic on top of [`BigDecimal`] with explicit scale and rounding.
//!
//! Addition, subtraction and multiplication keep their natural precision. Everything
//! else that can produce an inexact value (literals, division, powers, float-backed
//! functions and the final result) goes through a [`MathContext`].

use crate::error::CalcError;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use std::str::FromStr;

/// Integer exponents up to this magnitude are computed exactly.
pub const EXACT_POWER_LIMIT: u32 = 1024;

/// Largest number of digits a single rescale may add or remove.
pub const MAX_SCALE_SHIFT: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Towards zero.
    Down,
    Ceiling,
    Floor,
    #[default]
    HalfUp,
    HalfDown,
    HalfEven,
}

impl RoundingMode {
    /// Maps the numeric codes accepted by `round(value, scale, mode)`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(RoundingMode::HalfUp),
            1 => Some(RoundingMode::HalfEven),
            2 => Some(RoundingMode::HalfDown),
            _ => None,
        }
    }

    /// Whether a truncated `quotient` with the given `remainder` must be moved one
    /// unit away from zero. `divisor` has to be positive.
    fn rounds_away_from_zero(&self, quotient: &BigInt, remainder: &BigInt, divisor: &BigInt) -> bool {
        if remainder.is_zero() {
            return false;
        }

        let negative = remainder.sign() == Sign::Minus;
        match self {
            RoundingMode::Up => true,
            RoundingMode::Down => false,
            RoundingMode::Ceiling => !negative,
            RoundingMode::Floor => negative,
            RoundingMode::HalfUp => (remainder.magnitude() * 2u8) >= *divisor.magnitude(),
            RoundingMode::HalfDown => (remainder.magnitude() * 2u8) > *divisor.magnitude(),
            RoundingMode::HalfEven => {
                let doubled = remainder.magnitude() * 2u8;
                if doubled > *divisor.magnitude() {
                    true
                } else if doubled == *divisor.magnitude() {
                    !(quotient % 2u8).is_zero()
                } else {
                    false
                }
            }
        }
    }
}

/// A scale (digits after the decimal point) plus the rounding mode used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MathContext {
    pub scale: i64,
    pub rounding: RoundingMode,
}

impl Default for MathContext {
    fn default() -> Self {
        Self::new(10, RoundingMode::HalfUp)
    }
}

impl MathContext {
    pub fn new(scale: i64, rounding: RoundingMode) -> Self {
        Self { scale, rounding }
    }

    pub fn zero(&self) -> BigDecimal {
        BigDecimal::new(BigInt::zero(), self.scale)
    }

    pub fn round(&self, value: &BigDecimal) -> Result<BigDecimal, CalcError> {
        set_scale(value, self.scale, self.rounding)
    }

    /// Parses a literal and rounds it to this context.
    pub fn literal(&self, text: &str) -> Result<BigDecimal, CalcError> {
        let value = BigDecimal::from_str(text)
            .map_err(|e| CalcError::Malformed(format!("invalid number '{}': {}", text, e)))?;
        self.round(&value)
    }

    /// `dividend / divisor`, rounded once from the exact quotient.
    pub fn divide(&self, dividend: &BigDecimal, divisor: &BigDecimal) -> Result<BigDecimal, CalcError> {
        if divisor.is_zero() {
            return Err(CalcError::DivisionByZero);
        }

        let (mut numerator, dividend_scale) = dividend.as_bigint_and_exponent();
        let (mut denominator, divisor_scale) = divisor.as_bigint_and_exponent();

        let shift = self.scale - dividend_scale + divisor_scale;
        if shift >= 0 {
            numerator *= pow10(shift as u64)?;
        } else {
            denominator *= pow10(shift.unsigned_abs())?;
        }
        if denominator.sign() == Sign::Minus {
            numerator = -numerator;
            denominator = -denominator;
        }

        Ok(BigDecimal::new(
            round_quotient(&numerator, &denominator, self.rounding),
            self.scale,
        ))
    }

    /// `base ^ exponent`. Small integer exponents are exact, anything else goes
    /// through `f64::powf`.
    pub fn pow(&self, base: &BigDecimal, exponent: &BigDecimal) -> Result<BigDecimal, CalcError> {
        if let Some(n) = small_integer(exponent) {
            let (digits, scale) = base.as_bigint_and_exponent();
            let power = BigDecimal::new(digits.pow(n.unsigned_abs()), scale * i64::from(n.unsigned_abs()));
            return if n < 0 {
                self.divide(&BigDecimal::from(1), &power)
            } else {
                self.round(&power)
            };
        }

        let result = to_f64(base)?.powf(to_f64(exponent)?);
        self.from_float(result, &format!("{} ^ {}", plain_string(base), plain_string(exponent)))
    }

    /// Brings a float result back into decimal space. `what` names the operation
    /// for the error message when the float is NaN or infinite.
    pub fn from_float(&self, value: f64, what: &str) -> Result<BigDecimal, CalcError> {
        if !value.is_finite() {
            return Err(CalcError::NonFinite(what.to_string()));
        }
        // Display for f64 is the shortest representation that round-trips and never
        // uses exponent notation.
        let value = BigDecimal::from_str(&value.to_string())
            .map_err(|e| CalcError::Conversion(e.to_string()))?;
        self.round(&value)
    }
}

/// Rescales `value` to `scale` digits after the decimal point.
pub fn set_scale(value: &BigDecimal, scale: i64, rounding: RoundingMode) -> Result<BigDecimal, CalcError> {
    let (digits, current) = value.as_bigint_and_exponent();
    let shift = i128::from(scale) - i128::from(current);
    if shift >= 0 {
        let factor = pow10(u64::try_from(shift).unwrap_or(u64::MAX))?;
        return Ok(BigDecimal::new(digits * factor, scale));
    }

    let divisor = pow10(u64::try_from(-shift).unwrap_or(u64::MAX))?;
    Ok(BigDecimal::new(round_quotient(&digits, &divisor, rounding), scale))
}

/// Nearest `f64`, going through the decimal text so the result is correctly rounded.
pub fn to_f64(value: &BigDecimal) -> Result<f64, CalcError> {
    let text = plain_string(value);
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CalcError::Conversion(format!("{} cannot be represented as f64", text)))
}

/// Integer part of `value`, truncated towards zero.
pub fn truncate(value: &BigDecimal) -> Result<BigInt, CalcError> {
    let (digits, scale) = value.as_bigint_and_exponent();
    if scale <= 0 {
        Ok(digits * pow10(scale.unsigned_abs())?)
    } else {
        Ok(digits / pow10(scale as u64)?)
    }
}

pub fn to_i64(value: &BigDecimal) -> Result<i64, CalcError> {
    truncate(value)?
        .to_i64()
        .ok_or_else(|| CalcError::Conversion(format!("{} does not fit into i64", plain_string(value))))
}

/// Renders `value` without exponent notation, keeping its scale
/// (`1.50` stays `1.50`, `-0.001` stays `-0.001`).
pub fn plain_string(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    if scale <= 0 {
        return match pow10(scale.unsigned_abs()) {
            Ok(factor) => (digits * factor).to_string(),
            Err(_) => value.to_string(),
        };
    }

    let negative = digits.sign() == Sign::Minus;
    let mut magnitude = digits.magnitude().to_string();
    let scale = scale as usize;
    if magnitude.len() <= scale {
        magnitude = format!("{}{}", "0".repeat(scale + 1 - magnitude.len()), magnitude);
    }
    let (int_part, frac_part) = magnitude.split_at(magnitude.len() - scale);

    format!("{}{}.{}", if negative { "-" } else { "" }, int_part, frac_part)
}

fn pow10(exponent: u64) -> Result<BigInt, CalcError> {
    if exponent > MAX_SCALE_SHIFT {
        return Err(CalcError::ScaleOutOfRange(exponent));
    }
    let exponent = u32::try_from(exponent).map_err(|_| CalcError::ScaleOutOfRange(exponent))?;
    Ok(BigInt::from(10u8).pow(exponent))
}

/// Divides `numerator` by the positive `denominator` and rounds the quotient.
fn round_quotient(numerator: &BigInt, denominator: &BigInt, rounding: RoundingMode) -> BigInt {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if rounding.rounds_away_from_zero(&quotient, &remainder, denominator) {
        if numerator.sign() == Sign::Minus {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

/// `Some(n)` when `value` is an integer with `|n| <= EXACT_POWER_LIMIT`.
fn small_integer(value: &BigDecimal) -> Option<i32> {
    let (digits, scale) = value.as_bigint_and_exponent();
    if scale > 0 && !(&digits % pow10(scale as u64).ok()?).is_zero() {
        return None;
    }
    let n = truncate(value).ok()?.to_i64()?;
    if n.unsigned_abs() > u64::from(EXACT_POWER_LIMIT) {
        return None;
    }
    Some(n as i32)
}
