use crate::error::CalcError;
use crate::functions::NativeFunction;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use scalc_macros::scalc_fn;

pub const FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("sum", sum),
    ("∑", sum),
    ("summe", sum),
    ("avg", avg),
    ("durchschnitt", avg),
    ("min", min),
    ("max", max),
];

/// Left fold with `+`. No arguments yield zero at calculation scale.
#[scalc_fn]
fn sum(options: &CalculationOptions, values: &[BigDecimal]) -> Result<BigDecimal, CalcError> {
    let Some((first, rest)) = values.split_first() else {
        return Ok(options.calculation().zero());
    };
    Ok(rest.iter().fold(first.clone(), |total, value| total + value))
}

#[scalc_fn]
fn avg(options: &CalculationOptions, values: &[BigDecimal]) -> Result<BigDecimal, CalcError> {
    if values.is_empty() {
        return Ok(options.calculation().zero());
    }
    let total = sum(options, values)?;
    options
        .calculation()
        .divide(&total, &BigDecimal::from(values.len() as u64))
}

#[scalc_fn]
fn min(
    _options: &CalculationOptions,
    first: BigDecimal,
    others: &[BigDecimal],
) -> Result<BigDecimal, CalcError> {
    Ok(others
        .iter()
        .fold(first, |lowest, value| if *value < lowest { value.clone() } else { lowest }))
}

#[scalc_fn]
fn max(
    _options: &CalculationOptions,
    first: BigDecimal,
    others: &[BigDecimal],
) -> Result<BigDecimal, CalcError> {
    Ok(others
        .iter()
        .fold(first, |highest, value| if *value > highest { value.clone() } else { highest }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::plain_string;
    use crate::error::ErrorKind;
    use std::str::FromStr;

    fn decimals(values: &[&str]) -> Vec<BigDecimal> {
        values
            .iter()
            .map(|v| BigDecimal::from_str(v).unwrap())
            .collect()
    }

    #[test]
    fn test_sum_keeps_natural_precision() {
        let options = CalculationOptions::new("");
        let result = sum(&options, &decimals(&["1.5", "2.25", "-1"])).unwrap();
        assert_eq!(plain_string(&result), "2.75");
    }

    #[test]
    fn test_sum_and_avg_of_nothing_is_zero() {
        let options = CalculationOptions::new("");
        assert_eq!(plain_string(&sum(&options, &[]).unwrap()), "0.0000000000");
        assert_eq!(plain_string(&avg(&options, &[]).unwrap()), "0.0000000000");
    }

    #[test]
    fn test_avg_divides_at_calculation_scale() {
        let options = CalculationOptions::new("");
        let result = avg(&options, &decimals(&["1", "1", "2"])).unwrap();
        assert_eq!(plain_string(&result), "1.3333333333");
    }

    #[test]
    fn test_min_max() {
        let options = CalculationOptions::new("");
        let values = decimals(&["3", "-7.5", "12", "0"]);
        assert_eq!(plain_string(&min(&options, &values).unwrap()), "-7.5");
        assert_eq!(plain_string(&max(&options, &values).unwrap()), "12");

        let error = max(&options, &[]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArityMismatch);
    }
}
