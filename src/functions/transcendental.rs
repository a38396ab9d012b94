use crate::error::CalcError;
use crate::functions::NativeFunction;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use scalc_macros::scalc_fn;

pub const FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("sin", sin),
    ("cos", cos),
    ("tan", tan),
    ("ln", ln),
    ("log", log),
];

#[scalc_fn]
fn sin(options: &CalculationOptions, value: f64) -> Result<BigDecimal, CalcError> {
    options.calculation().from_float(value.sin(), "sin")
}

#[scalc_fn]
fn cos(options: &CalculationOptions, value: f64) -> Result<BigDecimal, CalcError> {
    options.calculation().from_float(value.cos(), "cos")
}

#[scalc_fn]
fn tan(options: &CalculationOptions, value: f64) -> Result<BigDecimal, CalcError> {
    options.calculation().from_float(value.tan(), "tan")
}

/// Natural logarithm.
#[scalc_fn]
fn ln(options: &CalculationOptions, value: f64) -> Result<BigDecimal, CalcError> {
    options.calculation().from_float(value.ln(), "ln")
}

/// Base 10 logarithm.
#[scalc_fn]
fn log(options: &CalculationOptions, value: f64) -> Result<BigDecimal, CalcError> {
    options.calculation().from_float(value.log10(), "log")
}
