use super::HmmState;
use thiserror::Error;

/// Failures of profile construction, parsing, alignment and generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Malformed alignment: {0}")]
    MalformedAlignment(String),

    #[error("Unknown symbol '{symbol}' at position {position}")]
    UnknownSymbol { symbol: char, position: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{state:?} emissions at model position {position} have no counts")]
    UndefinedEmission { state: HmmState, position: usize },

    #[error("State path has no state after column {column}")]
    IncompleteStatePath { column: usize },

    #[error("Query sequence is empty")]
    EmptyQuery,

    #[error("No alignment path with finite score")]
    NoViablePath,

    #[error("Model file line {line}: {message}")]
    ModelFormat { line: usize, message: String },

    #[error("Inconsistent profile: {0}")]
    InconsistentProfile(String),
}
