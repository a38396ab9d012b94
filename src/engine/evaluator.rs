use crate::decimal::plain_string;
use crate::engine::definition::Scope;
use crate::error::CalcError;
use crate::functions::{self, is_function_char, FunctionEntry};
use crate::options::CalculationOptions;
use bigdecimal::BigDecimal;

/// Reads a resolved expression once, left to right, computing the value as it goes.
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/') factor)*
/// factor     := ('+' | '-') factor
///             | ('(' expression ')' | number | call) ('^' factor)?
/// call       := name ['('] [expression (',' expression)*] [')']
/// ```
///
/// A closing parenthesis that is missing where one is expected is tolerated.
pub struct Evaluator<'a> {
    text: String,
    chars: Vec<char>,
    pos: usize,
    options: &'a CalculationOptions,
    scope: Option<&'a Scope>,
    depth: usize,
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

impl<'a> Evaluator<'a> {
    pub fn new(text: &str, options: &'a CalculationOptions) -> Self {
        let text = text.trim().to_string();
        let chars = text.chars().collect();
        Self {
            text,
            chars,
            pos: 0,
            options,
            scope: None,
            depth: 0,
        }
    }

    /// Makes the local functions of `scope` callable. `depth` counts the local
    /// calls already on the stack.
    pub fn with_scope(mut self, scope: &'a Scope, depth: usize) -> Self {
        self.scope = Some(scope);
        self.depth = depth;
        self
    }

    pub fn evaluate(mut self) -> Result<BigDecimal, CalcError> {
        self.options
            .trace(format_args!("Calculating expression: {}", self.text));
        if self.chars.is_empty() {
            return Ok(self.options.calculation().zero());
        }

        self.run().map_err(|e| e.in_expression(&self.text))
    }

    fn run(&mut self) -> Result<BigDecimal, CalcError> {
        let value = self.parse_expression()?;
        self.skip_whitespace();
        match self.current() {
            Some(character) => Err(CalcError::UnexpectedCharacter {
                character,
                position: self.pos,
            }),
            None => Ok(value),
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.current() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_expression(&mut self) -> Result<BigDecimal, CalcError> {
        let mut value = self.parse_term()?;
        loop {
            if self.eat('+') {
                let right = self.parse_term()?;
                let result = &value + &right;
                self.trace_operation('+', &value, &right, &result);
                value = result;
            } else if self.eat('-') {
                let right = self.parse_term()?;
                let result = &value - &right;
                self.trace_operation('-', &value, &right, &result);
                value = result;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_term(&mut self) -> Result<BigDecimal, CalcError> {
        let mut value = self.parse_factor()?;
        loop {
            if self.eat('*') {
                let right = self.parse_factor()?;
                let result = &value * &right;
                self.trace_operation('*', &value, &right, &result);
                value = result;
            } else if self.eat('/') {
                let right = self.parse_factor()?;
                let result = self.options.calculation().divide(&value, &right)?;
                self.trace_operation('/', &value, &right, &result);
                value = result;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_factor(&mut self) -> Result<BigDecimal, CalcError> {
        if self.eat('+') {
            return self.parse_factor();
        }
        if self.eat('-') {
            return Ok(-self.parse_factor()?);
        }

        let start = self.pos;
        let mut value = if self.eat('(') {
            let inner = self.parse_expression()?;
            self.eat(')');
            inner
        } else {
            match self.current() {
                Some(c) if is_number_char(c) => {
                    while self.current().is_some_and(is_number_char) {
                        self.pos += 1;
                    }
                    let literal: String = self.chars[start..self.pos].iter().collect();
                    self.options.calculation().literal(&literal)?
                }
                Some(c) if is_function_char(c) => self.parse_call(start)?,
                Some(character) => {
                    return Err(CalcError::UnexpectedCharacter {
                        character,
                        position: self.pos,
                    })
                }
                None => return Err(CalcError::UnexpectedEnd),
            }
        };

        if self.eat('^') {
            let exponent = self.parse_factor()?;
            let result = self.options.calculation().pow(&value, &exponent)?;
            self.trace_operation('^', &value, &exponent, &result);
            value = result;
        }
        Ok(value)
    }

    fn parse_call(&mut self, start: usize) -> Result<BigDecimal, CalcError> {
        while self.current().is_some_and(is_function_char) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        let function = self
            .lookup(&name)
            .ok_or_else(|| CalcError::UnknownFunction(name.clone()))?;

        let args = self.parse_arguments()?;
        let result = function.call(self.options, &args)?;
        if self.options.tracing() {
            let rendered: Vec<String> = args.iter().map(plain_string).collect();
            self.options.trace(format_args!(
                "Called function '{}'. Params: [{}]. Result: {}",
                name,
                rendered.join(", "),
                plain_string(&result)
            ));
        }
        Ok(result)
    }

    fn parse_arguments(&mut self) -> Result<Vec<BigDecimal>, CalcError> {
        if self.eat('(') && self.eat(')') {
            return Ok(Vec::new());
        }

        let mut args = vec![self.parse_expression()?];
        while self.eat(',') {
            args.push(self.parse_expression()?);
        }
        self.eat(')');
        Ok(args)
    }

    /// Builtins first, then local definitions, then host functions.
    fn lookup(&self, name: &str) -> Option<FunctionEntry<'a>> {
        if let Some(function) = functions::builtin(name) {
            return Some(FunctionEntry::Builtin(function));
        }
        if let Some(scope) = self.scope {
            if let Some(definition) = scope.function(name) {
                return Some(FunctionEntry::Local {
                    definition,
                    scope,
                    depth: self.depth,
                });
            }
        }
        self.options
            .host_function(name)
            .cloned()
            .map(FunctionEntry::Host)
    }

    fn trace_operation(&self, operator: char, left: &BigDecimal, right: &BigDecimal, result: &BigDecimal) {
        if self.options.tracing() {
            self.options.trace(format_args!(
                "Calculated term. Expression: '{}'. Left: '{}'. Right: '{}'. Result: {}",
                operator,
                plain_string(left),
                plain_string(right),
                plain_string(result)
            ));
        }
    }
}
