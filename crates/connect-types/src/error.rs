//! Error types for connect-types crate.

use thiserror::Error;

/// Errors raised while building schemas, populating structs or reading envelopes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypesError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Field '{field}' not found in schema {schema}")]
    UnknownField { schema: String, field: String },

    #[error("Struct requires a struct schema, got {0}")]
    NotAStructSchema(String),

    #[error("Invalid payload for {expected}: {message}")]
    InvalidPayload { expected: String, message: String },

    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("{logical} value out of range: {value}")]
    OutOfRange { logical: &'static str, value: i64 },

    #[error("JSON parse error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for TypesError {
    fn from(e: serde_json::Error) -> Self {
        TypesError::Json(e.to_string())
    }
}

/// Result type alias for connect-types operations.
pub type Result<T> = std::result::Result<T, TypesError>;
