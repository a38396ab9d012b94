pub mod aggregate;
pub mod power;
pub mod rounding;
pub mod transcendental;

use crate::engine::definition::{LocalFunction, Scope};
use crate::error::CalcError;
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;
use std::sync::Arc;

/// Signature shared by every builtin.
pub type NativeFunction = fn(&CalculationOptions, &[BigDecimal]) -> Result<BigDecimal, CalcError>;

/// A function supplied by the host application.
pub type HostFunction =
    Arc<dyn Fn(&CalculationOptions, &[BigDecimal]) -> Result<BigDecimal, CalcError> + Send + Sync>;

/// Characters allowed in function names besides ASCII letters.
pub const FUNCTION_NAME_SPECIAL_CHARS: [char; 10] =
    ['√', '∑', 'ä', 'Ä', 'ö', 'Ö', 'ü', 'Ü', 'ß', '_'];

/// Something callable from an expression, resolved by name at the call site.
pub enum FunctionEntry<'a> {
    Builtin(NativeFunction),
    Host(HostFunction),
    Local {
        definition: &'a LocalFunction,
        scope: &'a Scope,
        depth: usize,
    },
}

impl FunctionEntry<'_> {
    pub fn call(
        &self,
        options: &CalculationOptions,
        args: &[BigDecimal],
    ) -> Result<BigDecimal, CalcError> {
        match self {
            FunctionEntry::Builtin(function) => function(options, args),
            FunctionEntry::Host(function) => function(options, args),
            FunctionEntry::Local {
                definition,
                scope,
                depth,
            } => definition.invoke(options, scope, *depth, args),
        }
    }
}

/// Looks up a builtin, ignoring case.
pub fn builtin(name: &str) -> Option<NativeFunction> {
    let name = name.to_lowercase();
    aggregate::FUNCTIONS
        .iter()
        .chain(power::FUNCTIONS)
        .chain(rounding::FUNCTIONS)
        .chain(transcendental::FUNCTIONS)
        .find(|(alias, _)| *alias == name)
        .map(|(_, function)| *function)
}

pub fn is_function_char(c: char) -> bool {
    c.is_ascii_alphabetic() || FUNCTION_NAME_SPECIAL_CHARS.contains(&c)
}

pub fn validate_function_name(name: &str) -> Result<(), CalcError> {
    if name.is_empty() || !name.chars().all(is_function_char) {
        return Err(CalcError::InvalidFunctionName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_builtin_lookup_ignores_case() {
        let options = CalculationOptions::new("");
        let wurzel = builtin("Wurzel").unwrap();
        let result = wurzel(&options, &[BigDecimal::from(4)]).unwrap();
        assert_eq!(result, BigDecimal::from_str("2").unwrap());

        assert!(builtin("SUM").is_some());
        assert!(builtin("∑").is_some());
        assert!(builtin("√").is_some());
        assert!(builtin("durchschnitt").is_some());
        assert!(builtin("unknown").is_none());
    }

    #[test]
    fn test_validate_function_name() {
        assert!(validate_function_name("percent").is_ok());
        assert!(validate_function_name("größe_neu").is_ok());
        assert!(validate_function_name("return0").is_err());
        assert!(validate_function_name("my-func").is_err());
        assert!(validate_function_name("").is_err());
    }
}
