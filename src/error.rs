use thiserror::Error;

/// Coarse classification of every failure the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedText,
    UnresolvedReference,
    ArityMismatch,
    NumericFailure,
    MissingTerminal,
    LimitExceeded,
    Io,
}

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Malformed expression: {0}")]
    Malformed(String),

    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Function '{function}' expects {expected} argument(s), but got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("Invalid function name '{0}': only ASCII letters, '√', '∑', German umlauts, 'ß' and '_' are allowed")]
    InvalidFunctionName(String),

    #[error("Invalid rounding mode '{0}'. Possible values: HALF_UP (0), HALF_EVEN (1), HALF_DOWN (2)")]
    InvalidRoundingMode(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result of '{0}' is not a finite number")]
    NonFinite(String),

    #[error("Changing the scale by {0} digits is out of range")]
    ScaleOutOfRange(u64),

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Cannot find converter for '{0}'")]
    MissingConverter(&'static str),

    #[error("No 'return ...' statement was found in the given expression")]
    MissingReturn,

    #[error("Local function calls nested deeper than {0} levels")]
    CallDepthExceeded(usize),

    #[error("Could not read expression from '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected error on calculation of expression: {expression}")]
    Expression {
        expression: String,
        #[source]
        source: Box<CalcError>,
    },

    #[error("Unexpected error on calculation of expression: {expression} using params: {params}")]
    Calculation {
        expression: String,
        params: String,
        #[source]
        source: Box<CalcError>,
    },
}

impl CalcError {
    pub fn arity(function: &str, expected: &str, found: usize) -> Self {
        CalcError::Arity {
            function: function.to_string(),
            expected: expected.to_string(),
            found,
        }
    }

    /// Wraps `self` with the text of the expression that was being evaluated.
    pub fn in_expression(self, expression: &str) -> Self {
        CalcError::Expression {
            expression: expression.to_string(),
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::Malformed(_)
            | CalcError::UnexpectedCharacter { .. }
            | CalcError::UnexpectedEnd
            | CalcError::InvalidFunctionName(_)
            | CalcError::InvalidRoundingMode(_) => ErrorKind::MalformedText,
            CalcError::UnknownFunction(_) => ErrorKind::UnresolvedReference,
            CalcError::Arity { .. } => ErrorKind::ArityMismatch,
            CalcError::DivisionByZero
            | CalcError::NonFinite(_)
            | CalcError::ScaleOutOfRange(_)
            | CalcError::Conversion(_)
            | CalcError::MissingConverter(_) => ErrorKind::NumericFailure,
            CalcError::MissingReturn => ErrorKind::MissingTerminal,
            CalcError::CallDepthExceeded(_) => ErrorKind::LimitExceeded,
            CalcError::Io { .. } => ErrorKind::Io,
            CalcError::Expression { source, .. } | CalcError::Calculation { source, .. } => {
                source.kind()
            }
        }
    }

    /// The innermost error, skipping any expression/parameter context wrappers.
    pub fn root_cause(&self) -> &CalcError {
        match self {
            CalcError::Expression { source, .. } | CalcError::Calculation { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
