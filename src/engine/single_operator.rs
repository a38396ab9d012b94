use crate::decimal::plain_string;
use crate::engine::ParameterBag;
use crate::error::CalcError;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use num_traits::Zero;

/// An expression consisting of nothing but one of these operators folds all
/// bound parameters with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    pub fn from_expression(expression: &str) -> Option<Self> {
        match expression.trim() {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            "^" => Some(Operator::Power),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
            Operator::Power => '^',
        }
    }

    fn apply(
        &self,
        options: &CalculationOptions,
        left: &BigDecimal,
        right: &BigDecimal,
    ) -> Result<BigDecimal, CalcError> {
        match self {
            Operator::Add => Ok(left + right),
            Operator::Subtract => Ok(left - right),
            Operator::Multiply => Ok(left * right),
            Operator::Divide => options.calculation().divide(left, right),
            Operator::Power => options.calculation().pow(left, right),
        }
    }
}

/// Left fold of the parameter values in insertion order. A null value takes part
/// as zero; without any parameters the result is zero at calculation scale.
pub fn reduce(
    operator: Operator,
    params: &ParameterBag,
    options: &CalculationOptions,
) -> Result<BigDecimal, CalcError> {
    let mut values = params
        .values()
        .map(|value| value.clone().unwrap_or_else(BigDecimal::zero));
    let Some(first) = values.next() else {
        return Ok(options.calculation().zero());
    };

    let result = values.try_fold(first, |acc, value| operator.apply(options, &acc, &value))?;
    options.trace(format_args!(
        "Folded {} parameter(s) with '{}'. Result: {}",
        params.len(),
        operator.symbol(),
        plain_string(&result)
    ));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::str::FromStr;

    fn bag(values: &[Option<&str>]) -> ParameterBag {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                (
                    format!("p{}", i),
                    value.map(|v| BigDecimal::from_str(v).unwrap()),
                )
            })
            .collect()
    }

    #[test]
    fn test_operator_detection() {
        assert_eq!(Operator::from_expression(" * "), Some(Operator::Multiply));
        assert_eq!(Operator::from_expression("^"), Some(Operator::Power));
        assert_eq!(Operator::from_expression("**"), None);
        assert_eq!(Operator::from_expression("a + b"), None);
    }

    #[test]
    fn test_fold_in_insertion_order() {
        let options = CalculationOptions::new("-");
        let params = bag(&[Some("10"), Some("2.5"), Some("0.5")]);
        let result = reduce(Operator::Subtract, &params, &options).unwrap();
        assert_eq!(plain_string(&result), "7.0");

        let params = bag(&[Some("2"), Some("3"), Some("4")]);
        assert_eq!(
            reduce(Operator::Multiply, &params, &options).unwrap(),
            BigDecimal::from(24)
        );
        let params = bag(&[Some("2"), Some("3")]);
        assert_eq!(
            reduce(Operator::Power, &params, &options).unwrap(),
            BigDecimal::from(8)
        );
    }

    #[test]
    fn test_null_folds_as_zero() {
        let options = CalculationOptions::new("*");
        let params = bag(&[Some("2"), Some("3"), None, Some("4")]);
        let result = reduce(Operator::Multiply, &params, &options).unwrap();
        assert!(result.is_zero());
    }

    #[test]
    fn test_edge_cases() {
        let options = CalculationOptions::new("+");
        let result = reduce(Operator::Add, &ParameterBag::new(), &options).unwrap();
        assert_eq!(plain_string(&result), "0.0000000000");

        let result = reduce(Operator::Divide, &bag(&[Some("1.25")]), &options).unwrap();
        assert_eq!(plain_string(&result), "1.25");

        let error = reduce(Operator::Divide, &bag(&[Some("1"), Some("0")]), &options).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NumericFailure);
    }
}
