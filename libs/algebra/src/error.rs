//! Error types for the expression engine

use crate::operator::Arity;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Expression engine errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("operator registration is closed once an expression has been resolved")]
    Sealed,

    #[error("operator '{token}' is not registrable: {message}")]
    InvalidOperator { token: String, message: &'static str },

    #[error("{message} at position {pos}")]
    Syntax { pos: usize, message: &'static str },

    #[error("No variables found")]
    NoVariables,

    #[error("Variables remain on stack")]
    VariablesRemain,

    #[error("Missing operand {index} for '{op}' at position {pos}")]
    MissingOperand {
        op: String,
        pos: usize,
        index: usize,
    },

    #[error("Function '{name}' at position {pos} expects {} argument(s), got {got}", describe_arity(.expected))]
    ArityMismatch {
        name: String,
        pos: usize,
        expected: Arity,
        got: usize,
    },

    #[error("Malformed numeric literal '{token}' at position {pos}")]
    NumberParse { token: String, pos: usize },

    #[error("Unrecognized expression '{token}' at position {pos}.{}", did_you_mean(.suggestions))]
    UnknownName {
        token: String,
        pos: usize,
        suggestions: Vec<String>,
    },

    /// Raised by the variable algebra while applying an operator.
    #[error("{0}")]
    Variable(String),
}

fn describe_arity(arity: &Arity) -> String {
    match arity {
        Arity::Exact(n) => n.to_string(),
        Arity::Variadic => "at least 1".to_string(),
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" Did you mean: {}?", suggestions.join(", "))
    }
}
