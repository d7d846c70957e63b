//! Runtime values for structured records.
//!
//! A [`Value`] is what a record actually carries; its meaning is given by the
//! [`Schema`](crate::Schema) it is paired with. Logical types may appear either in
//! their physical form (e.g. `Int32` day count for a date) or in their logical
//! runtime form (e.g. `Date`).

use crate::error::{Result, TypesError};
use crate::schema::{SchemaRef, SchemaType};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

/// Runtime value of a structured record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 8-bit signed integer
    Int8(i8),

    /// 16-bit signed integer
    Int16(i16),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 32-bit floating point
    Float32(f32),

    /// 64-bit floating point
    Float64(f64),

    /// String value
    String(String),

    /// Owned byte array
    Bytes(Vec<u8>),

    /// Shared byte buffer
    Buffer(bytes::Bytes),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// Key/value pairs in iteration order
    Map(Vec<(Value, Value)>),

    /// Structured record
    Struct(Struct),

    /// Calendar date (logical form of the date type)
    Date(NaiveDate),

    /// Time of day (logical form of the time type)
    Time(NaiveTime),

    /// Instant in UTC (logical form of the timestamp type)
    Timestamp(DateTime<Utc>),

    /// Exact decimal (logical form of the decimal type)
    Decimal(Decimal),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the runtime variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Int8(_) => "Int8",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Float32(_) => "Float32",
            Self::Float64(_) => "Float64",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::Buffer(_) => "Buffer",
            Self::Array(_) => "Array",
            Self::Map(_) => "Map",
            Self::Struct(_) => "Struct",
            Self::Date(_) => "Date",
            Self::Time(_) => "Time",
            Self::Timestamp(_) => "Timestamp",
            Self::Decimal(_) => "Decimal",
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a struct reference.
    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Build a map value from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<bytes::Bytes> for Value {
    fn from(v: bytes::Bytes) -> Self {
        Self::Buffer(v)
    }
}

impl From<Struct> for Value {
    fn from(v: Struct) -> Self {
        Self::Struct(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Structured record bound to a struct schema.
///
/// Holds one value per schema field, in field order. Unset fields are `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    schema: SchemaRef,
    values: Vec<Value>,
}

impl Struct {
    /// Create an empty struct for the given schema.
    pub fn new(schema: SchemaRef) -> Result<Self> {
        if schema.schema_type() != SchemaType::Struct {
            return Err(TypesError::NotAStructSchema(schema.describe()));
        }
        let values = vec![Value::Null; schema.fields().len()];
        Ok(Self { schema, values })
    }

    /// Schema this struct was created with.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Set a field value by name.
    pub fn put(&mut self, field: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let index = self
            .schema
            .field(field)
            .ok_or_else(|| TypesError::UnknownField {
                schema: self.schema.describe(),
                field: field.to_string(),
            })?
            .index();
        self.values[index] = value.into();
        Ok(self)
    }

    /// Builder-style variant of [`Struct::put`].
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        self.put(field, value)?;
        Ok(self)
    }

    /// Get a field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema
            .field(field)
            .and_then(|f| self.values.get(f.index()))
    }

    /// Get a field value by position.
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;

    fn person_schema() -> SchemaRef {
        SchemaBuilder::struct_()
            .name("person")
            .field("name", SchemaBuilder::string().build().unwrap())
            .field("age", SchemaBuilder::int32().optional().build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::Null.kind(), "Null");
        assert_eq!(Value::from(42i32).kind(), "Int32");
        assert_eq!(Value::from("x").kind(), "String");
        assert_eq!(Value::from(vec![1u8, 2]).kind(), "Bytes");
        assert_eq!(Value::from(bytes::Bytes::from_static(b"ab")).kind(), "Buffer");
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Int64(3));
    }

    #[test]
    fn test_map_keeps_insertion_order() {
        let map = Value::map([("b", 2i32), ("a", 1i32)]);
        match map {
            Value::Map(entries) => {
                assert_eq!(entries[0].0, Value::from("b"));
                assert_eq!(entries[1].0, Value::from("a"));
            }
            other => panic!("Expected Map, got {other:?}"),
        }
    }

    #[test]
    fn test_struct_put_and_get() {
        let mut person = Struct::new(person_schema()).unwrap();
        assert_eq!(person.get("name"), Some(&Value::Null));

        person.put("name", "Alice").unwrap().put("age", 30i32).unwrap();
        assert_eq!(person.get("name"), Some(&Value::from("Alice")));
        assert_eq!(person.get_by_index(1), Some(&Value::Int32(30)));
        assert_eq!(person.get("unknown"), None);
    }

    #[test]
    fn test_struct_unknown_field() {
        let err = Struct::new(person_schema())
            .unwrap()
            .with("email", "a@example.com")
            .unwrap_err();
        assert!(matches!(err, TypesError::UnknownField { .. }));
    }

    #[test]
    fn test_struct_requires_struct_schema() {
        let err = Struct::new(SchemaBuilder::string().build().unwrap()).unwrap_err();
        assert!(matches!(err, TypesError::NotAStructSchema(_)));
    }
}
