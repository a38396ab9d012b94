//! Multi-statement blocks such as `f(x) = x * 2; y = f(3); return y + 1;`.
//!
//! Statements run in order against one [`Scope`]. Local functions store only their
//! text; every call binds the scope's variables as they are at call time.

use crate::decimal::plain_string;
use crate::engine::evaluator::Evaluator;
use crate::engine::resolver::resolve;
use crate::engine::ParameterBag;
use crate::error::CalcError;
use crate::functions::validate_function_name;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use pest::Parser;
use pest_derive::Parser;
use std::collections::HashMap;

#[derive(Parser)]
#[grammar = "engine/signature.pest"]
struct SignatureParser;

const RETURN_KEYWORD: &str = "return";
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalFunction {
    name: String,
    params: Vec<String>,
    body: String,
}

impl LocalFunction {
    /// Parses `name(p1, p2, ...)` and keeps `body` unevaluated.
    pub fn parse(signature: &str, body: &str) -> Result<Self, CalcError> {
        let pair = SignatureParser::parse(Rule::signature, signature)
            .map_err(|e| {
                CalcError::Malformed(format!(
                    "Function definition invalid: {} ({})",
                    signature,
                    e.variant.message()
                ))
            })?
            .next()
            .ok_or_else(|| {
                CalcError::Malformed(format!("Function definition invalid: {}", signature))
            })?;

        let mut name = String::new();
        let mut params = Vec::new();
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::name => name = part.as_str().to_string(),
                Rule::parameters => {
                    params = part
                        .into_inner()
                        .map(|param| param.as_str().to_string())
                        .collect()
                }
                _ => {}
            }
        }

        validate_function_name(&name)?;
        Ok(Self {
            name,
            params,
            body: body.trim().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Evaluates the body with the current variables of `scope` plus the arguments.
    pub(crate) fn invoke(
        &self,
        options: &CalculationOptions,
        scope: &Scope,
        depth: usize,
        args: &[BigDecimal],
    ) -> Result<BigDecimal, CalcError> {
        if args.len() != self.params.len() {
            return Err(CalcError::arity(
                &self.name,
                &self.params.len().to_string(),
                args.len(),
            ));
        }
        if depth >= options.max_call_depth() {
            return Err(CalcError::CallDepthExceeded(options.max_call_depth()));
        }

        let mut bindings = scope.variables.clone();
        for (param, arg) in self.params.iter().zip(args) {
            bindings.insert(param.clone(), Some(arg.clone()));
        }

        let resolved = resolve(&self.body, &bindings, options)?;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            Evaluator::new(&resolved, options)
                .with_scope(scope, depth + 1)
                .evaluate()
        })?;
        options.trace(format_args!(
            "Calculated function: '{}'. Expression: '{}'. Resolved expression: '{}'. Result: {}",
            self.name,
            self.body,
            resolved,
            plain_string(&result)
        ));
        Ok(result)
    }
}

/// Variables and local functions of one multi-statement evaluation.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    variables: ParameterBag,
    functions: HashMap<String, LocalFunction>,
}

impl Scope {
    pub fn new(params: &ParameterBag) -> Self {
        Self {
            variables: params.clone(),
            functions: HashMap::new(),
        }
    }

    pub fn variables(&self) -> &ParameterBag {
        &self.variables
    }

    pub fn function(&self, name: &str) -> Option<&LocalFunction> {
        self.functions.get(name)
    }

    fn assign(&mut self, name: String, value: BigDecimal) {
        self.variables.insert(name, Some(value));
    }

    fn define(&mut self, function: LocalFunction) {
        self.functions.insert(function.name.clone(), function);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Return(String),
    Variable { name: String, expression: String },
    Function(LocalFunction),
}

impl Statement {
    /// `None` for a blank statement.
    pub fn parse(text: &str) -> Result<Option<Self>, CalcError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        if let Some(rest) = text.strip_prefix(RETURN_KEYWORD) {
            let ends_keyword = rest
                .chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
            if ends_keyword {
                return Ok(Some(Statement::Return(rest.trim().to_string())));
            }
        }

        let parts: Vec<&str> = text.split('=').collect();
        let [target, expression] = parts.as_slice() else {
            return Err(CalcError::Malformed(format!(
                "Definition '{}' must have exactly one '='",
                text
            )));
        };
        let (target, expression) = (target.trim(), expression.trim());
        if target.is_empty() || expression.is_empty() {
            return Err(CalcError::Malformed(format!(
                "Definition '{}' needs a name and an expression",
                text
            )));
        }

        if target.contains('(') && target.contains(')') {
            Ok(Some(Statement::Function(LocalFunction::parse(
                target, expression,
            )?)))
        } else {
            Ok(Some(Statement::Variable {
                name: target.to_string(),
                expression: expression.to_string(),
            }))
        }
    }
}

fn evaluate_in_scope(
    expression: &str,
    scope: &Scope,
    options: &CalculationOptions,
) -> Result<BigDecimal, CalcError> {
    let resolved = resolve(expression, scope.variables(), options)?;
    Evaluator::new(&resolved, options)
        .with_scope(scope, 0)
        .evaluate()
}

/// Runs the `;` separated statements of the options' expression until the first
/// `return`. Statements after it are never parsed.
pub fn evaluate(options: &CalculationOptions, params: &ParameterBag) -> Result<BigDecimal, CalcError> {
    let mut scope = Scope::new(params);

    for raw in options.expression().split(';') {
        let Some(statement) = Statement::parse(raw)? else {
            continue;
        };

        match statement {
            Statement::Return(expression) => {
                let result = evaluate_in_scope(&expression, &scope, options)?;
                options.trace(format_args!(
                    "Calculated return statement. Expression: '{}'. Result: {}",
                    expression,
                    plain_string(&result)
                ));
                return Ok(result);
            }
            Statement::Variable { name, expression } => {
                let value = evaluate_in_scope(&expression, &scope, options)?;
                options.trace(format_args!(
                    "Calculated variable: '{}'. Expression: '{}'. Result: {}",
                    name,
                    expression,
                    plain_string(&value)
                ));
                scope.assign(name, value);
            }
            Statement::Function(function) => {
                options.trace(format_args!(
                    "Defined function '{}({})' as '{}'",
                    function.name(),
                    function.params().join(", "),
                    function.body()
                ));
                scope.define(function);
            }
        }
    }

    Err(CalcError::MissingReturn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::DEFAULT_MAX_CALL_DEPTH;
    use std::str::FromStr;

    fn run(expression: &str) -> Result<BigDecimal, CalcError> {
        run_with(expression, &ParameterBag::new())
    }

    fn run_with(expression: &str, params: &ParameterBag) -> Result<BigDecimal, CalcError> {
        let options = CalculationOptions::new(expression);
        evaluate(&options, params)
    }

    fn dec(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    #[test]
    fn test_statement_parsing() {
        assert_eq!(Statement::parse("   ").unwrap(), None);
        assert_eq!(
            Statement::parse("  return 2+2 ").unwrap(),
            Some(Statement::Return("2+2".to_string()))
        );
        assert_eq!(
            Statement::parse("return(1)").unwrap(),
            Some(Statement::Return("(1)".to_string()))
        );
        assert_eq!(
            Statement::parse("returnValue = 3").unwrap(),
            Some(Statement::Variable {
                name: "returnValue".to_string(),
                expression: "3".to_string()
            })
        );

        let Some(Statement::Function(function)) = Statement::parse("f( a , b ) = a*b").unwrap() else {
            panic!("expected a function definition");
        };
        assert_eq!(function.name(), "f");
        assert_eq!(function.params(), ["a".to_string(), "b".to_string()]);
        assert_eq!(function.body(), "a*b");

        let Some(Statement::Function(function)) = Statement::parse("four() = 4").unwrap() else {
            panic!("expected a function definition");
        };
        assert!(function.params().is_empty());
    }

    #[test]
    fn test_malformed_statements() {
        for text in ["a = 1 = 2", "a", "= 4", "a = "] {
            let error = Statement::parse(text).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::MalformedText, "{}", text);
        }
        let error = Statement::parse("f(x)(y) = 1").unwrap_err();
        assert!(matches!(error, CalcError::Malformed(_)));
        let error = Statement::parse("my-f(x) = x").unwrap_err();
        assert!(matches!(error, CalcError::InvalidFunctionName(_)));
    }

    #[test]
    fn test_definition_block() {
        let result = run(
            "f(x,y)=10+(x*y)-1; g(x)=sqrt(x); variable1=7; return f(2,3)+g(4)-variable1;",
        )
        .unwrap();
        assert_eq!(result, dec("10"));
    }

    #[test]
    fn test_missing_return() {
        let error = run("a = 1; b = a + 1;").unwrap_err();
        assert!(matches!(error, CalcError::MissingReturn));
        assert_eq!(error.kind(), ErrorKind::MissingTerminal);
    }

    #[test]
    fn test_return_stops_processing() {
        assert_eq!(run("return 1; this is = = not parsed").unwrap(), dec("1"));
    }

    #[test]
    fn test_parameters_seed_the_scope() {
        let params: ParameterBag = [("a".to_string(), Some(dec("3")))].into_iter().collect();
        assert_eq!(run_with("b = a * 2; return b + a;", &params).unwrap(), dec("9"));
    }

    #[test]
    fn test_functions_see_variables_at_call_time() {
        assert_eq!(run("f(x) = x + later; later = 5; return f(1);").unwrap(), dec("6"));
        assert_eq!(
            run("later = 1; f(x) = x + later; later = 10; return f(1);").unwrap(),
            dec("11")
        );
        assert_eq!(
            run("double(x) = x * 2; quad(x) = double(double(x)); return quad(3);").unwrap(),
            dec("12")
        );
    }

    #[test]
    fn test_local_function_arity() {
        let error = run("f(x) = x; return f(1, 2);").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArityMismatch);
    }

    #[test]
    fn test_runaway_recursion_is_stopped() {
        let mut options = CalculationOptions::new("f(x) = f(x) + 1; return f(1);");
        options.max_call_depth = 8;
        let error = evaluate(&options, &ParameterBag::new()).unwrap_err();
        assert!(matches!(error.root_cause(), CalcError::CallDepthExceeded(8)));
        assert_eq!(error.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_default_depth_limit_fits_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let options = CalculationOptions::new("f(x) = f(x) + 1; return f(1);");
                evaluate(&options, &ParameterBag::new())
            })
            .unwrap();
        let error = handle.join().unwrap().unwrap_err();
        assert!(matches!(
            error.root_cause(),
            CalcError::CallDepthExceeded(DEFAULT_MAX_CALL_DEPTH)
        ));
    }
}
