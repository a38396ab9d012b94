use crate::calculator::Calculator;
use crate::engine::{self, ParameterBag};
use crate::error::CalcError;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use rayon::prelude::*;

/// Evaluates one expression for many parameter bags in parallel.
/// Results are in the order of `bags`.
pub fn calc_batch(
    options: &CalculationOptions,
    bags: &[ParameterBag],
) -> Vec<Result<BigDecimal, CalcError>> {
    bags.par_iter()
        .map(|params| engine::calculate(options, params))
        .collect()
}

/// Like [`calc_batch`], converting every result to the calculator's type.
pub fn calc_batch_with<R>(calculator: &Calculator<R>, bags: &[ParameterBag]) -> Vec<Result<R, CalcError>>
where
    R: Send + 'static,
{
    bags.par_iter()
        .map(|params| calculator.calc_with(params))
        .collect()
}
