use crate::convert::{ConverterRegistry, NumberConverter};
use crate::decimal::{plain_string, MathContext, RoundingMode};
use crate::engine::{self, ParameterBag};
use crate::error::CalcError;
use crate::functions::{validate_function_name, HostFunction};
use crate::options::{CalculationOptions, DebugSink, DEFAULT_MAX_CALL_DEPTH};
use crate::registry::Registry;
use bigdecimal::BigDecimal;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

/// Collects the configuration for a [`Calculator`] returning `R`.
///
/// ```
/// use scalc_rs::CalculatorBuilder;
///
/// let mut calculator = CalculatorBuilder::<f64>::new()
///     .expression("a + b")
///     .build();
/// calculator.parameter("a", 10)?.parameter("b", 2.1)?;
/// assert_eq!(calculator.calc()?, 12.1);
/// # Ok::<(), scalc_rs::CalcError>(())
/// ```
pub struct CalculatorBuilder<R> {
    expression: String,
    calculation: MathContext,
    result: MathContext,
    functions: HashMap<String, HostFunction>,
    converters: ConverterRegistry,
    registry: Arc<Registry>,
    debug_sink: Option<DebugSink>,
    remove_null_parameters: bool,
    max_call_depth: usize,
    _result: PhantomData<fn() -> R>,
}

impl<R: 'static> Default for CalculatorBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: 'static> CalculatorBuilder<R> {
    pub fn new() -> Self {
        Self {
            expression: String::new(),
            calculation: MathContext::default(),
            result: MathContext::default(),
            functions: HashMap::new(),
            converters: ConverterRegistry::empty(),
            registry: Arc::new(Registry::default()),
            debug_sink: None,
            remove_null_parameters: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            _result: PhantomData,
        }
    }

    pub fn expression(mut self, expression: &str) -> Self {
        self.expression = expression.to_string();
        self
    }

    /// Reads the expression from a UTF-8 file.
    pub fn expression_from_path<P: AsRef<Path>>(self, path: P) -> Result<Self, CalcError> {
        let path = path.as_ref();
        let expression = fs::read_to_string(path).map_err(|source| CalcError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Loaded expression from {}", path.display());
        Ok(self.expression(&expression))
    }

    /// Adds all parameters up.
    pub fn sum_expression(self) -> Self {
        self.expression("+")
    }

    pub fn subtract_expression(self) -> Self {
        self.expression("-")
    }

    pub fn multiply_expression(self) -> Self {
        self.expression("*")
    }

    pub fn divide_expression(self) -> Self {
        self.expression("/")
    }

    pub fn pow_expression(self) -> Self {
        self.expression("^")
    }

    pub fn calculation_scale(mut self, scale: i64, rounding: RoundingMode) -> Self {
        self.calculation = MathContext::new(scale, rounding);
        self
    }

    pub fn result_scale(mut self, scale: i64, rounding: RoundingMode) -> Self {
        self.result = MathContext::new(scale, rounding);
        self
    }

    /// Drops parameters without a value before calculating.
    pub fn remove_null_parameters(mut self, remove: bool) -> Self {
        self.remove_null_parameters = remove;
        self
    }

    /// Receives every trace line, in addition to the `log` output at debug level.
    pub fn debug_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.debug_sink = Some(Arc::new(sink));
        self
    }

    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Registers a function for calculators built by this builder only.
    /// It takes precedence over a function of the same name in the registry.
    pub fn register_function<F>(mut self, name: &str, function: F) -> Result<Self, CalcError>
    where
        F: Fn(&CalculationOptions, &[BigDecimal]) -> Result<BigDecimal, CalcError>
            + Send
            + Sync
            + 'static,
    {
        validate_function_name(name)?;
        self.functions.insert(name.to_string(), Arc::new(function));
        Ok(self)
    }

    pub fn register_converter<T, C>(mut self, converter: C) -> Self
    where
        T: 'static,
        C: NumberConverter<T> + 'static,
    {
        self.converters.register::<T, C>(converter);
        self
    }

    /// Shares host functions and converters with other builders.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn build(self) -> Calculator<R> {
        let mut functions = self.registry.functions_snapshot();
        functions.extend(self.functions);
        let mut converters = self.registry.converters_snapshot();
        converters.merge(&self.converters);

        debug!(
            "Built calculator for '{}' ({} host function(s))",
            self.expression,
            functions.len()
        );
        Calculator {
            options: CalculationOptions {
                expression: self.expression,
                calculation: self.calculation,
                result: self.result,
                functions: Arc::new(functions),
                converters: Arc::new(converters),
                debug_sink: self.debug_sink,
                remove_null_parameters: self.remove_null_parameters,
                max_call_depth: self.max_call_depth,
            },
            params: ParameterBag::new(),
            _result: PhantomData,
        }
    }

    /// Builds and calculates without any parameters.
    pub fn build_and_calc(self) -> Result<R, CalcError> {
        self.build().calc()
    }
}

/// A configured expression. Parameters are collected on the calculator and
/// cleared after every successful [`calc`](Calculator::calc).
pub struct Calculator<R> {
    options: CalculationOptions,
    params: ParameterBag,
    _result: PhantomData<fn() -> R>,
}

impl<R: 'static> Calculator<R> {
    pub fn options(&self) -> &CalculationOptions {
        &self.options
    }

    pub fn params(&self) -> &ParameterBag {
        &self.params
    }

    /// Binds `name` to `value`, converted with the converter registered for `T`.
    pub fn parameter<T: 'static>(&mut self, name: &str, value: T) -> Result<&mut Self, CalcError> {
        let value = self.options.converters().to_decimal(&value)?;
        self.params.insert(name.to_string(), Some(value));
        Ok(self)
    }

    pub fn null_parameter(&mut self, name: &str) -> &mut Self {
        self.params.insert(name.to_string(), None);
        self
    }

    pub fn parameters<I, K, T>(&mut self, params: I) -> Result<&mut Self, CalcError>
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
        T: 'static,
    {
        for (name, value) in params {
            self.parameter(name.as_ref(), value)?;
        }
        Ok(self)
    }

    /// Binds unnamed values as `_p0`, `_p1`, ... in the given order. Useful for
    /// single operator expressions and `ALL_PARAMS`.
    pub fn values<I, T>(&mut self, values: I) -> Result<&mut Self, CalcError>
    where
        I: IntoIterator<Item = T>,
        T: 'static,
    {
        for value in values {
            let name = format!("_p{}", self.params.len());
            self.parameter(&name, value)?;
        }
        Ok(self)
    }

    pub fn reset(&mut self) -> &mut Self {
        self.params.clear();
        self
    }

    /// Calculates with the collected parameters, then clears them.
    pub fn calc(&mut self) -> Result<R, CalcError> {
        let result = self.calc_with(&self.params)?;
        self.params.clear();
        Ok(result)
    }

    /// Calculates with `params` instead of the collected parameters.
    pub fn calc_with(&self, params: &ParameterBag) -> Result<R, CalcError> {
        engine::calculate(&self.options, params)
            .and_then(|value| self.options.converters().from_decimal::<R>(&value))
            .map_err(|source| CalcError::Calculation {
                expression: self.options.expression().to_string(),
                params: render_params(params),
                source: Box::new(source),
            })
    }
}

fn render_params(params: &ParameterBag) -> String {
    let entries: Vec<String> = params
        .iter()
        .map(|(name, value)| match value {
            Some(value) => format!("{}={}", name, plain_string(value)),
            None => format!("{}=null", name),
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}
