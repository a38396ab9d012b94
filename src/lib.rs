//! Arithmetic expressions over arbitrary precision decimals.
//!
//! Expressions are plain text (`"a + b * √(16)"`) or blocks of `;` separated
//! statements with local variables and functions
//! (`"f(x) = x * 2; return f(a) + 1;"`), evaluated against named parameters.
//! [`CalculatorBuilder`] configures scales, rounding, host functions and the
//! result type.

extern crate self as scalc_rs;

pub mod batch;
pub mod calculator;
pub mod convert;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod functions;
pub mod options;
pub mod registry;
pub mod util;

pub use bigdecimal::BigDecimal;
pub use calculator::{Calculator, CalculatorBuilder};
pub use convert::{ConverterRegistry, FnConverter, NumberConverter};
pub use decimal::{MathContext, RoundingMode};
pub use engine::{calculate, ParameterBag};
pub use error::{CalcError, ErrorKind};
pub use options::CalculationOptions;
pub use registry::Registry;

use std::collections::HashMap;

/// Evaluates `expression` once with default scales, parameters bound in name order.
pub fn evaluate_expression(
    expression: &str,
    context: &HashMap<String, f64>,
) -> Result<f64, CalcError> {
    let mut names: Vec<&String> = context.keys().collect();
    names.sort();

    let mut calculator = CalculatorBuilder::<f64>::new()
        .expression(expression)
        .build();
    for name in names {
        calculator.parameter(name, context[name])?;
    }
    calculator.calc()
}
