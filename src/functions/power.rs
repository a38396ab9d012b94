use crate::error::CalcError;
use crate::functions::NativeFunction;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use scalc_macros::scalc_fn;

pub const FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("sqrt", root),
    ("root", root),
    ("√", root),
    ("wurzel", root),
    ("pow", pow),
];

/// `value ^ (1 / degree)`, square root unless a degree is given.
#[scalc_fn]
fn root(
    options: &CalculationOptions,
    value: f64,
    degree: Option<f64>,
) -> Result<BigDecimal, CalcError> {
    let degree = degree.unwrap_or(2.0);
    if degree == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    options
        .calculation()
        .from_float(value.powf(1.0 / degree), &format!("root({}, {})", value, degree))
}

/// With a single argument this is the square root, kept for older expressions.
#[scalc_fn]
fn pow(
    options: &CalculationOptions,
    base: f64,
    exponent: Option<f64>,
) -> Result<BigDecimal, CalcError> {
    let (result, what) = match exponent {
        Some(exponent) => (base.powf(exponent), format!("pow({}, {})", base, exponent)),
        None => (base.sqrt(), format!("pow({})", base)),
    };
    options.calculation().from_float(result, &what)
}
