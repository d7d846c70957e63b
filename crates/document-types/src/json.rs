//! JSON tree conversion.
//!
//! Objects become documents, arrays become arrays and scalars map to the closest
//! document value. JSON null is treated as absent: object fields holding null are
//! omitted and null array elements are dropped.

use crate::document::{DocValue, Document};
use crate::error::{ConversionError, Result};
use crate::path::FieldPath;
use serde_json::{Map, Number, Value as JsonValue};
use tracing::debug;

/// Convert a JSON object into a document.
pub fn from_json_tree(json: &JsonValue) -> Result<Document> {
    let JsonValue::Object(object) = json else {
        return Err(ConversionError::InvalidTopLevelInput(format!(
            "expecting a JSON object, found {}",
            json_kind(json)
        )));
    };

    let mut path = FieldPath::root();
    let doc = convert_object(object, &mut path)?;
    debug!(fields = doc.len(), "Converted JSON tree");
    Ok(doc)
}

fn convert_object(object: &Map<String, JsonValue>, path: &mut FieldPath) -> Result<Document> {
    let mut fields = Vec::with_capacity(object.len());
    for (name, value) in object {
        path.push_field(name);
        let converted = convert_value(value, path);
        path.pop();
        if let Some(v) = converted? {
            fields.push((name.clone(), v));
        }
    }
    Ok(fields.into_iter().collect())
}

fn convert_value(value: &JsonValue, path: &mut FieldPath) -> Result<Option<DocValue>> {
    let converted = match value {
        JsonValue::Null => return Ok(None),
        JsonValue::Bool(b) => DocValue::Boolean(*b),
        JsonValue::Number(n) => convert_number(n, path)?,
        JsonValue::String(s) => DocValue::String(s.clone()),
        JsonValue::Array(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                let result = convert_value(item, path);
                path.pop();
                if let Some(v) = result? {
                    converted.push(v);
                }
            }
            DocValue::Array(converted)
        }
        JsonValue::Object(object) => DocValue::Document(convert_object(object, path)?),
    };
    Ok(Some(converted))
}

fn convert_number(n: &Number, path: &FieldPath) -> Result<DocValue> {
    if let Some(i) = n.as_i64() {
        return Ok(DocValue::Int64(i));
    }
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            return Ok(DocValue::Double(f));
        }
    }
    // Unsigned integers beyond i64::MAX have no lossless document representation
    Err(ConversionError::UnsupportedVariant {
        path: path.clone(),
        value: n.to_string(),
        kind: "unsigned integer",
    })
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        let doc = from_json_tree(&json!({
            "flag": true,
            "count": 42,
            "ratio": 0.25,
            "name": "widget",
        }))
        .unwrap();

        assert_eq!(doc.get("flag"), Some(&DocValue::Boolean(true)));
        assert_eq!(doc.get("count"), Some(&DocValue::Int64(42)));
        assert_eq!(doc.get("ratio"), Some(&DocValue::Double(0.25)));
        assert_eq!(doc.get("name"), Some(&DocValue::from("widget")));
    }

    #[test]
    fn test_nested_objects_keep_field_order() {
        let doc = from_json_tree(&json!({ "z": 1, "a": { "y": "x", "b": 2 }, "m": 3 })).unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);

        let nested = doc.get("a").and_then(DocValue::as_document).unwrap();
        assert_eq!(nested.keys().collect::<Vec<_>>(), vec!["y", "b"]);
    }

    #[test]
    fn test_nulls_are_absent() {
        let doc = from_json_tree(&json!({
            "a": null,
            "b": [1, null, 2],
            "c": { "d": null },
        }))
        .unwrap();

        assert!(!doc.contains_key("a"));
        assert_eq!(
            doc.get("b"),
            Some(&DocValue::Array(vec![DocValue::Int64(1), DocValue::Int64(2)]))
        );
        assert!(doc.get("c").and_then(DocValue::as_document).unwrap().is_empty());
    }

    #[test]
    fn test_wide_object() {
        let object: serde_json::Map<String, JsonValue> = (0..50_000)
            .map(|i| (format!("k{i}"), json!(i)))
            .collect();
        let doc = from_json_tree(&JsonValue::Object(object)).unwrap();

        assert_eq!(doc.len(), 50_000);
        assert_eq!(doc.keys().nth(49_999), Some("k49999"));
        assert_eq!(doc.get("k12345"), Some(&DocValue::Int64(12_345)));
    }

    #[test]
    fn test_empty_object() {
        assert!(from_json_tree(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_non_object_root_rejected() {
        for root in [json!([1, 2]), json!("text"), json!(null), json!(3)] {
            let err = from_json_tree(&root).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidTopLevelInput);
        }
    }

    #[test]
    fn test_large_unsigned_is_unsupported() {
        let err = from_json_tree(&json!({ "ids": [1, u64::MAX] })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);
        assert_eq!(err.path().unwrap().to_string(), "ids[1]");
        assert!(err.to_string().contains(&u64::MAX.to_string()));
    }
}
