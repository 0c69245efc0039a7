//! Error types for sat-report

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Syntax error in filter query '{query}': {message}")]
    Syntax { query: String, message: String },

    #[error("Row does not match headings: {0}")]
    ShapeMismatch(String),

    #[error("No field matching '{key}' (known fields: {})", .known.join(", "))]
    MissingField { key: String, known: Vec<String> },

    #[error("Incompatible types: {0}")]
    IncompatibleType(String),

    #[error("Duplicate heading: {0}")]
    DuplicateHeading(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
