use crate::convert::ConverterRegistry;
use crate::decimal::MathContext;
use crate::functions::HostFunction;
use log::{debug, log_enabled, Level};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Receives every trace line of an evaluation in addition to the `log` record.
pub type DebugSink = Arc<dyn Fn(&str) + Send + Sync>;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// Immutable configuration of one evaluation request.
///
/// Host functions and converters are snapshots taken when the options were built,
/// so evaluations never contend on the shared [`Registry`](crate::Registry).
#[derive(Clone)]
pub struct CalculationOptions {
    pub(crate) expression: String,
    pub(crate) calculation: MathContext,
    pub(crate) result: MathContext,
    pub(crate) functions: Arc<HashMap<String, HostFunction>>,
    pub(crate) converters: Arc<ConverterRegistry>,
    pub(crate) debug_sink: Option<DebugSink>,
    pub(crate) remove_null_parameters: bool,
    pub(crate) max_call_depth: usize,
}

impl CalculationOptions {
    pub fn new(expression: &str) -> Self {
        Self {
            expression: expression.to_string(),
            calculation: MathContext::default(),
            result: MathContext::default(),
            functions: Arc::new(HashMap::new()),
            converters: Arc::new(ConverterRegistry::default()),
            debug_sink: None,
            remove_null_parameters: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Scale and rounding used for literals, division, powers and function results.
    pub fn calculation(&self) -> &MathContext {
        &self.calculation
    }

    /// Scale and rounding applied once to the final answer.
    pub fn result(&self) -> &MathContext {
        &self.result
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn host_function(&self, name: &str) -> Option<&HostFunction> {
        self.functions.get(name)
    }

    pub fn remove_null_parameters(&self) -> bool {
        self.remove_null_parameters
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Whether trace lines go anywhere, to skip rendering them otherwise.
    pub(crate) fn tracing(&self) -> bool {
        self.debug_sink.is_some() || log_enabled!(Level::Debug)
    }

    pub(crate) fn trace(&self, message: fmt::Arguments<'_>) {
        if !self.tracing() {
            return;
        }
        debug!("{}", message);
        if let Some(sink) = &self.debug_sink {
            sink(&message.to_string());
        }
    }
}

impl fmt::Debug for CalculationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<&String> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("CalculationOptions")
            .field("expression", &self.expression)
            .field("calculation", &self.calculation)
            .field("result", &self.result)
            .field("functions", &functions)
            .field("debug", &self.debug_sink.is_some())
            .field("remove_null_parameters", &self.remove_null_parameters)
            .field("max_call_depth", &self.max_call_depth)
            .finish()
    }
}
