use crate::parser::ParseError;
use crate::value::Kind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("\"{operator}\" argument {index}: {reason}")]
    ArgumentTypeMismatch {
        operator: String,
        index: usize,
        reason: String,
    },

    #[error("\"{operator}\" operator expects {expected} arguments, got {got}")]
    ArgumentCountMismatch {
        operator: String,
        expected: String,
        got: usize,
    },

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("expression nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("cannot compare {0} with {1}")]
    NotComparable(Kind, Kind),

    #[error("division by zero")]
    DivisionByZero,

    #[error("operation not supported for {0} and {1}")]
    NotSupported(Kind, Kind),

    #[error("no value getter in context")]
    MissingValueGetter,

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("\"{0}\" used outside of an iteration")]
    InvalidIterationContext(&'static str),

    #[error("{0} is not iterable")]
    NotIterable(Kind),

    #[error("evaluation cancelled")]
    Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
