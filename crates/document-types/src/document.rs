//! Canonical document model.
//!
//! A [`Document`] is an ordered mapping from field names to [`DocValue`]s. There is
//! no null variant: absent values are omitted from their container, so a document
//! can never carry a null field.

use base64::Engine;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::json;

/// Value stored in a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    /// Boolean value
    Boolean(bool),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit floating point
    Double(f64),

    /// String value
    String(String),

    /// Binary data
    Binary(Vec<u8>),

    /// High-precision decimal
    Decimal(Decimal),

    /// Nested document
    Document(Document),

    /// Ordered sequence of values
    Array(Vec<DocValue>),
}

impl DocValue {
    /// Name of the variant, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::Binary(_) => "Binary",
            Self::Decimal(_) => "Decimal",
            Self::Document(_) => "Document",
            Self::Array(_) => "Array",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value of either width.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(i) => Some(i64::from(*i)),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DocValue]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Convert to a JSON value. Binary becomes base64 text and decimals keep their
    /// exact string form; non-finite doubles become JSON null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Boolean(b) => json!(*b),
            Self::Int32(i) => json!(*i),
            Self::Int64(i) => json!(*i),
            Self::Double(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(s) => json!(s),
            Self::Binary(b) => json!(base64::engine::general_purpose::STANDARD.encode(b)),
            Self::Decimal(d) => json!(d.to_string()),
            Self::Document(d) => d.to_json(),
            Self::Array(arr) => serde_json::Value::Array(arr.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<bool> for DocValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for DocValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for DocValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for DocValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for DocValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for DocValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Decimal> for DocValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<Document> for DocValue {
    fn from(v: Document) -> Self {
        Self::Document(v)
    }
}

impl From<Vec<DocValue>> for DocValue {
    fn from(v: Vec<DocValue>) -> Self {
        Self::Array(v)
    }
}

impl Serialize for DocValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Int32(i) => serializer.serialize_i32(*i),
            Self::Int64(i) => serializer.serialize_i64(*i),
            Self::Double(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Binary(b) => {
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(b))
            }
            Self::Decimal(d) => serializer.serialize_str(&d.to_string()),
            Self::Document(d) => d.serialize(serializer),
            Self::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for item in arr {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Ordered field-name → value mapping.
///
/// Equality is order-sensitive: two documents are equal when they hold the same fields in
/// the same order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    fields: IndexMap<String, DocValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DocValue> {
        self.fields.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Insert a field. An existing field keeps its position and has its value
    /// replaced; the previous value is returned.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DocValue>) -> Option<DocValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field, returning its value. Remaining fields keep their order.
    pub fn remove(&mut self, name: &str) -> Option<DocValue> {
        self.fields.shift_remove(name)
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert to a JSON object, see [`DocValue::to_json`].
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl FromIterator<(String, DocValue)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, DocValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, DocValue);
    type IntoIter = indexmap::map::IntoIter<String, DocValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
