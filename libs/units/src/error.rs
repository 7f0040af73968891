//! Error types for the unit engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Unit resolution and conversion errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure while resolving a unit expression, prefixed with the
    /// offending expression text.
    #[error("{expr}: {}", resolve_message(.source))]
    Resolve {
        expr: String,
        source: mensura_algebra::Error,
    },

    #[error("Units must be commensurable")]
    Incommensurable,

    #[error(
        "Units with offsets (e.g. degC, degF) should be converted to base (e.g. degK) \
         or delta variants (delC, delF) before being combined with other units"
    )]
    OffsetMisuse,

    #[error("Units with offsets cannot be raised to a power")]
    OffsetPower,

    #[error("Units can only be raised to a unitless power")]
    DimensionedExponent,

    #[error("unit exponent exceeds the representable range")]
    ExponentOverflow,

    #[error("'{0}' is not a time unit")]
    NotATimeUnit(String),

    #[error("a negative interval cannot be represented as a duration")]
    NegativeDuration,
}

impl Error {
    /// Hand a domain error back to the expression engine as an
    /// operator-application failure.
    pub(crate) fn into_variable(self) -> mensura_algebra::Error {
        mensura_algebra::Error::Variable(self.to_string())
    }
}

/// The engine is domain-agnostic; the caller-visible diagnostic names what
/// actually failed to parse — a unit expression.
fn resolve_message(source: &mensura_algebra::Error) -> String {
    match source {
        mensura_algebra::Error::UnknownName { .. } => source.to_string().replacen(
            "Unrecognized expression",
            "Unrecognized unit expression",
            1,
        ),
        _ => source.to_string(),
    }
}
