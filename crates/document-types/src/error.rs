//! Error types for document conversion.

use crate::path::FieldPath;
use connect_types::SchemaType;
use thiserror::Error;

/// Why a conversion could not proceed.
///
/// Every variant records the [`FieldPath`] at which it was raised. Errors propagate
/// unchanged to the entry point; no partial document is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Missing required field at {path}: value is null and the schema declares no default")]
    MissingRequiredField { path: FieldPath },

    #[error("Mismatched schema at {path}: expected {expected}, struct carries {actual}")]
    SchemaMismatch {
        path: FieldPath,
        expected: String,
        actual: String,
    },

    #[error("Invalid type for declared schema type {expected} at {path}: found {actual}")]
    InvalidTypeForSchema {
        path: FieldPath,
        expected: SchemaType,
        actual: &'static str,
    },

    #[error("Invalid {expected} value at {path}: {message}")]
    InvalidValue {
        path: FieldPath,
        expected: String,
        message: String,
    },

    #[error("Unimplemented variant at {path}: {value} ({kind})")]
    UnsupportedVariant {
        path: FieldPath,
        value: String,
        kind: &'static str,
    },

    #[error("Invalid top-level input: {0}")]
    InvalidTopLevelInput(String),
}

/// Coarse classification of a [`ConversionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRequiredField,
    SchemaMismatch,
    InvalidTypeForSchema,
    UnsupportedVariant,
    InvalidTopLevelInput,
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Self::InvalidTypeForSchema { .. } | Self::InvalidValue { .. } => {
                ErrorKind::InvalidTypeForSchema
            }
            Self::UnsupportedVariant { .. } => ErrorKind::UnsupportedVariant,
            Self::InvalidTopLevelInput(_) => ErrorKind::InvalidTopLevelInput,
        }
    }

    /// Where the error was raised, if it is tied to a position in the input.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::MissingRequiredField { path }
            | Self::SchemaMismatch { path, .. }
            | Self::InvalidTypeForSchema { path, .. }
            | Self::InvalidValue { path, .. }
            | Self::UnsupportedVariant { path, .. } => Some(path),
            Self::InvalidTopLevelInput(_) => None,
        }
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_types() {
        let err = ConversionError::InvalidTypeForSchema {
            path: FieldPath::root(),
            expected: SchemaType::Bytes,
            actual: "String",
        };
        assert_eq!(
            err.to_string(),
            "Invalid type for declared schema type bytes at <root>: found String"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidTypeForSchema);

        let err = ConversionError::InvalidTopLevelInput("expecting a structured value".into());
        assert_eq!(err.kind(), ErrorKind::InvalidTopLevelInput);
        assert!(err.path().is_none());
    }
}
