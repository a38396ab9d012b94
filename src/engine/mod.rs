pub mod definition;
pub mod evaluator;
pub mod resolver;
pub mod single_operator;

use crate::decimal::plain_string;
use crate::error::CalcError;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use evaluator::Evaluator;
use indexmap::IndexMap;
use single_operator::Operator;

/// Named parameter values in insertion order. `None` is a null parameter.
pub type ParameterBag = IndexMap<String, Option<BigDecimal>>;

/// Evaluates the options' expression against `params` and rounds the answer to
/// the result context.
///
/// A lone operator folds the parameters, text containing `;` is a definition
/// block, anything else is a single expression.
pub fn calculate(options: &CalculationOptions, params: &ParameterBag) -> Result<BigDecimal, CalcError> {
    let filtered: ParameterBag;
    let params = if options.remove_null_parameters() {
        filtered = params
            .iter()
            .filter(|(_, value)| value.is_some())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        &filtered
    } else {
        params
    };

    let expression = options.expression();
    let value = if let Some(operator) = Operator::from_expression(expression) {
        single_operator::reduce(operator, params, options)?
    } else if expression.contains(';') {
        definition::evaluate(options, params)?
    } else {
        let resolved = resolver::resolve(expression, params, options)?;
        Evaluator::new(&resolved, options).evaluate()?
    };

    let result = options.result().round(&value)?;
    options.trace(format_args!(
        "Result of '{}': {}",
        expression,
        plain_string(&result)
    ));
    Ok(result)
}
