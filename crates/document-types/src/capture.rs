//! Error-capturing wrappers.
//!
//! Every conversion entry point has a `try_` counterpart that never unwinds: a
//! [`ConversionError`] is returned as [`Failure::Conversion`], and a panic raised inside
//! the conversion is caught and returned as [`Failure::Fault`].

use crate::document::{DocValue, Document};
use crate::error::{ConversionError, ErrorKind, Result};
use connect_types::{SchemaRef, Value};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Failure reported by the `try_` entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Failure {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Unexpected fault during conversion: {0}")]
    Fault(String),
}

impl Failure {
    /// Kind of the underlying conversion error; `None` for faults.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Conversion(err) => Some(err.kind()),
            Self::Fault(_) => None,
        }
    }
}

pub type Captured<T> = std::result::Result<T, Failure>;

/// Run a conversion, turning both its error and any panic into a [`Failure`].
pub fn capture<T, F>(f: F) -> Captured<T>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.map_err(Failure::Conversion),
        Err(payload) => Err(Failure::Fault(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

pub fn try_convert(schema: Option<&SchemaRef>, value: &Value) -> Captured<Option<DocValue>> {
    capture(|| crate::record::convert(schema, value))
}

pub fn try_from_typed_record(schema: Option<&SchemaRef>, value: &Value) -> Captured<Document> {
    capture(|| crate::record::from_typed_record(schema, value))
}

pub fn try_from_json_tree(json: &serde_json::Value) -> Captured<Document> {
    capture(|| crate::json::from_json_tree(json))
}

pub fn try_from_dynamic_map<M>(map: &M) -> Captured<Document>
where
    M: Serialize + ?Sized,
{
    capture(|| crate::dynamic::from_dynamic_map(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_types::SchemaBuilder;
    use serde::Serializer;
    use serde_json::json;

    struct Exploding;

    impl Serialize for Exploding {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            panic!("serializer exploded");
        }
    }

    #[test]
    fn test_success_passes_through() {
        let doc = try_from_json_tree(&json!({ "a": 1 })).unwrap();
        assert_eq!(doc.get("a"), Some(&DocValue::Int64(1)));

        let schema = SchemaBuilder::string().build().unwrap();
        assert_eq!(
            try_convert(Some(&schema), &Value::from("x")).unwrap(),
            Some(DocValue::from("x"))
        );
    }

    #[test]
    fn test_conversion_error_is_captured() {
        let failure = try_from_json_tree(&json!("hello")).unwrap_err();
        assert_eq!(failure.kind(), Some(ErrorKind::InvalidTopLevelInput));

        let failure = try_from_typed_record(None, &Value::Int32(1)).unwrap_err();
        assert!(matches!(
            failure,
            Failure::Conversion(ConversionError::InvalidTopLevelInput(_))
        ));
    }

    #[test]
    fn test_panic_becomes_fault() {
        let failure = try_from_dynamic_map(&Exploding).unwrap_err();
        assert_eq!(failure, Failure::Fault("serializer exploded".to_string()));
        assert_eq!(failure.kind(), None);
    }

    #[test]
    fn test_formatted_panic_message() {
        let failure = capture::<(), _>(|| panic!("bad index {}", 3)).unwrap_err();
        assert_eq!(failure.to_string(), "Unexpected fault during conversion: bad index 3");
    }
}
