use crate::decimal::{set_scale, RoundingMode};
use crate::error::CalcError;
use crate::functions::NativeFunction;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use scalc_macros::scalc_fn;

pub const FUNCTIONS: &[(&str, NativeFunction)] = &[("round", round), ("abs", abs)];

pub const DEFAULT_ROUND_SCALE: i64 = 2;

/// Names the resolver replaces with the codes `round` understands as third argument.
pub const ROUNDING_MODE_CONSTANTS: [(&str, &str); 3] =
    [("HALF_UP", "0"), ("HALF_EVEN", "1"), ("HALF_DOWN", "2")];

/// `round(value, [scale = 2], [mode = HALF_UP])`
#[scalc_fn]
fn round(
    _options: &CalculationOptions,
    value: BigDecimal,
    scale: Option<i64>,
    mode: Option<i64>,
) -> Result<BigDecimal, CalcError> {
    let mode = match mode {
        None => RoundingMode::HalfUp,
        Some(code) => RoundingMode::from_code(code)
            .ok_or_else(|| CalcError::InvalidRoundingMode(code.to_string()))?,
    };
    set_scale(&value, scale.unwrap_or(DEFAULT_ROUND_SCALE), mode)
}

#[scalc_fn]
fn abs(options: &CalculationOptions, value: BigDecimal) -> Result<BigDecimal, CalcError> {
    if value < options.calculation().zero() {
        Ok(-value)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::plain_string;
    use crate::error::ErrorKind;
    use std::str::FromStr;

    fn dec(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    #[test]
    fn test_round_defaults() {
        let options = CalculationOptions::new("");
        assert_eq!(plain_string(&round(&options, &[dec("10.5567")]).unwrap()), "10.56");
        assert_eq!(plain_string(&round(&options, &[dec("0.5"), dec("0")]).unwrap()), "1");
    }

    #[test]
    fn test_round_with_mode_codes() {
        let options = CalculationOptions::new("");
        let half_down = round(&options, &[dec("0.5"), dec("0"), dec("2")]).unwrap();
        assert_eq!(plain_string(&half_down), "0");
        let half_even = round(&options, &[dec("2.5"), dec("0"), dec("1")]).unwrap();
        assert_eq!(plain_string(&half_even), "2");

        let error = round(&options, &[dec("0.5"), dec("0"), dec("7")]).unwrap_err();
        assert!(matches!(error, CalcError::InvalidRoundingMode(_)));
        assert_eq!(error.kind(), ErrorKind::MalformedText);
    }

    #[test]
    fn test_round_rejects_huge_scale() {
        let options = CalculationOptions::new("");
        let error = round(&options, &[dec("1.5"), dec("4294967306")]).unwrap_err();
        assert!(matches!(error, CalcError::ScaleOutOfRange(_)));
        assert_eq!(error.kind(), ErrorKind::NumericFailure);
    }

    #[test]
    fn test_abs() {
        let options = CalculationOptions::new("");
        assert_eq!(plain_string(&abs(&options, &[dec("-3.25")]).unwrap()), "3.25");
        assert_eq!(plain_string(&abs(&options, &[dec("4")]).unwrap()), "4");
        let error = abs(&options, &[dec("1"), dec("2")]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArityMismatch);
    }
}
