//! Shortcuts for one-off calculations.

use crate::calculator::CalculatorBuilder;
use crate::decimal::RoundingMode;
use crate::error::CalcError;

/// Sum of all `values`, returned as `R`.
pub fn summarize<R, T, I>(values: I) -> Result<R, CalcError>
where
    R: 'static,
    T: 'static,
    I: IntoIterator<Item = T>,
{
    let mut calculator = CalculatorBuilder::<R>::new().sum_expression().build();
    calculator.values(values)?;
    calculator.calc()
}

/// Rounds `value` to `scale` digits after the decimal point.
pub fn round<R, T>(value: T, scale: i64, rounding: RoundingMode) -> Result<R, CalcError>
where
    R: 'static,
    T: 'static,
{
    let mut calculator = CalculatorBuilder::<R>::new()
        .expression("return ALL_PARAMS;")
        .calculation_scale(scale, rounding)
        .result_scale(scale, rounding)
        .build();
    calculator.values([value])?;
    calculator.calc()
}
