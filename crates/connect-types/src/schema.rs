//! Schema definitions for structured records.
//!
//! A [`Schema`] describes the declared type of a value: its [`SchemaType`] tag, an
//! optional logical name refining that tag, optionality, a default value, and for
//! container types the nested schemas (array elements, map keys/values, struct fields).
//!
//! Schemas are immutable once built and shared through [`SchemaRef`]. Two struct values
//! are considered to carry "the same" schema only when they point at the same `Arc`.

use crate::error::{Result, TypesError};
use crate::logical::LogicalType;
use crate::values::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared, immutable schema handle.
pub type SchemaRef = Arc<Schema>;

/// Type tag of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit IEEE 754 floating point
    Float32,
    /// 64-bit IEEE 754 floating point
    Float64,
    /// Boolean value
    Boolean,
    /// UTF-8 string
    String,
    /// Byte sequence
    Bytes,
    /// Ordered sequence of elements sharing one schema
    Array,
    /// Key/value mapping
    Map,
    /// Record with named, ordered fields
    Struct,
}

impl SchemaType {
    /// Lowercase name, as used in JSON envelopes.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Array => "array",
            Self::Map => "map",
            Self::Struct => "struct",
        }
    }

    /// Check if this type is a primitive (non-container) type.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Array | Self::Map | Self::Struct)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named field of a struct schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    index: usize,
    schema: SchemaRef,
}

impl Field {
    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the field within its struct.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Schema of the field value.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }
}

/// Declared type of a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    schema_type: SchemaType,
    optional: bool,
    default_value: Option<Value>,
    name: Option<String>,
    version: Option<i32>,
    doc: Option<String>,
    parameters: BTreeMap<String, String>,
    fields: Vec<Field>,
    key_schema: Option<SchemaRef>,
    value_schema: Option<SchemaRef>,
}

impl Schema {
    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Default value used when the value is null. Never `Some(Value::Null)`.
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Schema name; for logical types this is the logical type identifier.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<i32> {
        self.version
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Struct fields in declaration order. Empty for non-struct schemas.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Key schema of a map.
    pub fn key_schema(&self) -> Option<&SchemaRef> {
        self.key_schema.as_ref()
    }

    /// Value schema of a map, or element schema of an array.
    pub fn value_schema(&self) -> Option<&SchemaRef> {
        self.value_schema.as_ref()
    }

    /// Element schema of an array.
    pub fn element_schema(&self) -> Option<&SchemaRef> {
        match self.schema_type {
            SchemaType::Array => self.value_schema.as_ref(),
            _ => None,
        }
    }

    /// Logical type recognised from the schema name, if any.
    ///
    /// An unknown name, or a known name on the wrong type tag, yields `None`.
    pub fn logical_type(&self) -> Option<LogicalType> {
        let logical = LogicalType::from_name(self.name.as_deref()?)?;
        (logical.physical_type() == self.schema_type).then_some(logical)
    }

    /// Structural comparison ignoring optionality, documentation and default values.
    ///
    /// Used to validate struct-valued defaults, which cannot carry the exact instance of
    /// the schema that declares them.
    pub fn same_structure(&self, other: &Schema) -> bool {
        fn same_ref(a: Option<&SchemaRef>, b: Option<&SchemaRef>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a.same_structure(b),
                (None, None) => true,
                _ => false,
            }
        }

        self.schema_type == other.schema_type
            && self.name == other.name
            && self.version == other.version
            && self.parameters == other.parameters
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.name == b.name && a.schema.same_structure(&b.schema))
            && same_ref(self.key_schema.as_ref(), other.key_schema.as_ref())
            && same_ref(self.value_schema.as_ref(), other.value_schema.as_ref())
    }

    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {name}", self.schema_type),
            None => self.schema_type.to_string(),
        }
    }
}

/// Fluent builder for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create a builder for the given type tag.
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema: Schema {
                schema_type,
                optional: false,
                default_value: None,
                name: None,
                version: None,
                doc: None,
                parameters: BTreeMap::new(),
                fields: Vec::new(),
                key_schema: None,
                value_schema: None,
            },
        }
    }

    pub fn int8() -> Self {
        Self::new(SchemaType::Int8)
    }

    pub fn int16() -> Self {
        Self::new(SchemaType::Int16)
    }

    pub fn int32() -> Self {
        Self::new(SchemaType::Int32)
    }

    pub fn int64() -> Self {
        Self::new(SchemaType::Int64)
    }

    pub fn float32() -> Self {
        Self::new(SchemaType::Float32)
    }

    pub fn float64() -> Self {
        Self::new(SchemaType::Float64)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaType::Boolean)
    }

    pub fn string() -> Self {
        Self::new(SchemaType::String)
    }

    pub fn bytes() -> Self {
        Self::new(SchemaType::Bytes)
    }

    pub fn struct_() -> Self {
        Self::new(SchemaType::Struct)
    }

    /// Create an array builder with the given element schema.
    pub fn array(element_schema: SchemaRef) -> Self {
        let mut builder = Self::new(SchemaType::Array);
        builder.schema.value_schema = Some(element_schema);
        builder
    }

    /// Create a map builder with the given key and value schemas.
    pub fn map(key_schema: SchemaRef, value_schema: SchemaRef) -> Self {
        let mut builder = Self::new(SchemaType::Map);
        builder.schema.key_schema = Some(key_schema);
        builder.schema.value_schema = Some(value_schema);
        builder
    }

    /// Date logical type (days since the epoch on int32).
    pub fn date() -> Self {
        Self::int32().name(LogicalType::Date.name()).version(1)
    }

    /// Time logical type (millis since midnight on int32).
    pub fn time() -> Self {
        Self::int32().name(LogicalType::Time.name()).version(1)
    }

    /// Timestamp logical type (millis since the epoch on int64).
    pub fn timestamp() -> Self {
        Self::int64().name(LogicalType::Timestamp.name()).version(1)
    }

    /// Decimal logical type (unscaled two's-complement bytes) with a fixed scale.
    pub fn decimal(scale: u32) -> Self {
        Self::bytes()
            .name(LogicalType::Decimal.name())
            .version(1)
            .parameter(crate::logical::decimal::SCALE_FIELD, scale.to_string())
    }

    pub fn optional(mut self) -> Self {
        self.schema.optional = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.schema.optional = false;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.schema.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: i32) -> Self {
        self.schema.version = Some(version);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.schema.doc = Some(doc.into());
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.schema.parameters.insert(key.into(), value.into());
        self
    }

    /// Set the default value. A null default is the same as no default.
    pub fn default_value(mut self, value: Value) -> Self {
        self.schema.default_value = (!value.is_null()).then_some(value);
        self
    }

    /// Append a struct field. Field order is declaration order.
    pub fn field(mut self, name: impl Into<String>, schema: SchemaRef) -> Self {
        let index = self.schema.fields.len();
        self.schema.fields.push(Field {
            name: name.into(),
            index,
            schema,
        });
        self
    }

    /// Validate and freeze the schema.
    pub fn build(self) -> Result<SchemaRef> {
        let schema = self.schema;

        if !schema.fields.is_empty() && schema.schema_type != SchemaType::Struct {
            return Err(TypesError::InvalidSchema(format!(
                "fields can only be declared on struct schemas, not {}",
                schema.schema_type
            )));
        }

        for (i, field) in schema.fields.iter().enumerate() {
            if schema.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(TypesError::InvalidSchema(format!(
                    "duplicate field '{}' in {}",
                    field.name,
                    schema.describe()
                )));
            }
        }

        match schema.schema_type {
            SchemaType::Array if schema.value_schema.is_none() => {
                return Err(TypesError::InvalidSchema(
                    "array schema requires an element schema".to_string(),
                ));
            }
            SchemaType::Map if schema.key_schema.is_none() || schema.value_schema.is_none() => {
                return Err(TypesError::InvalidSchema(
                    "map schema requires key and value schemas".to_string(),
                ));
            }
            _ => {}
        }

        if let Some(default) = &schema.default_value {
            if !default_matches(&schema, default) {
                return Err(TypesError::InvalidSchema(format!(
                    "default value of kind {} is not valid for {}",
                    default.kind(),
                    schema.describe()
                )));
            }
        }

        Ok(Arc::new(schema))
    }
}

/// Check that a default value has a runtime kind compatible with the schema.
fn default_matches(schema: &Schema, value: &Value) -> bool {
    let logical = schema.logical_type();
    match (schema.schema_type, value) {
        (SchemaType::Int8, Value::Int8(_))
        | (SchemaType::Int16, Value::Int16(_))
        | (SchemaType::Int32, Value::Int32(_))
        | (SchemaType::Int64, Value::Int64(_))
        | (SchemaType::Float32, Value::Float32(_))
        | (SchemaType::Float64, Value::Float64(_))
        | (SchemaType::Boolean, Value::Boolean(_))
        | (SchemaType::String, Value::String(_))
        | (SchemaType::Bytes, Value::Bytes(_) | Value::Buffer(_))
        | (SchemaType::Array, Value::Array(_))
        | (SchemaType::Map, Value::Map(_)) => true,
        (SchemaType::Struct, Value::Struct(s)) => s.schema().same_structure(schema),
        (SchemaType::Int32, Value::Date(_)) => logical == Some(LogicalType::Date),
        (SchemaType::Int32, Value::Time(_)) => logical == Some(LogicalType::Time),
        (SchemaType::Int64, Value::Timestamp(_)) => logical == Some(LogicalType::Timestamp),
        (SchemaType::Bytes, Value::Decimal(_)) => logical == Some(LogicalType::Decimal),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Struct;

    #[test]
    fn test_schema_type_names() {
        assert_eq!(SchemaType::Int32.to_string(), "int32");
        assert_eq!(SchemaType::Struct.name(), "struct");
        assert!(SchemaType::Bytes.is_primitive());
        assert!(!SchemaType::Map.is_primitive());

        let parsed: SchemaType = serde_json::from_str("\"float64\"").unwrap();
        assert_eq!(parsed, SchemaType::Float64);
    }

    #[test]
    fn test_struct_fields_keep_declaration_order() {
        let schema = SchemaBuilder::struct_()
            .name("order")
            .field("id", SchemaBuilder::int64().build().unwrap())
            .field("note", SchemaBuilder::string().optional().build().unwrap())
            .field("qty", SchemaBuilder::int32().build().unwrap())
            .build()
            .unwrap();

        let names: Vec<&str> = schema.fields().iter().map(Field::name).collect();
        assert_eq!(names, vec!["id", "note", "qty"]);
        assert_eq!(schema.field("qty").unwrap().index(), 2);
        assert!(schema.field("note").unwrap().schema().is_optional());
        assert!(schema.field("missing").is_none());
        assert_eq!(schema.describe(), "struct order");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = SchemaBuilder::struct_()
            .field("a", SchemaBuilder::int32().build().unwrap())
            .field("a", SchemaBuilder::string().build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, TypesError::InvalidSchema(_)));
    }

    #[test]
    fn test_fields_only_on_structs() {
        let err = SchemaBuilder::int32()
            .field("a", SchemaBuilder::int32().build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, TypesError::InvalidSchema(_)));
    }

    #[test]
    fn test_default_value_must_match_type() {
        let schema = SchemaBuilder::int32()
            .default_value(Value::Int32(5))
            .build()
            .unwrap();
        assert_eq!(schema.default_value(), Some(&Value::Int32(5)));

        let err = SchemaBuilder::int32()
            .default_value(Value::String("five".to_string()))
            .build()
            .unwrap_err();
        assert!(matches!(err, TypesError::InvalidSchema(_)));

        let schema = SchemaBuilder::string()
            .default_value(Value::Null)
            .build()
            .unwrap();
        assert!(schema.default_value().is_none());
    }

    #[test]
    fn test_struct_default_must_share_structure() {
        let point = || {
            SchemaBuilder::struct_()
                .name("point")
                .field("x", SchemaBuilder::int32().build().unwrap())
        };
        let origin = Struct::new(point().build().unwrap())
            .unwrap()
            .with("x", 0i32)
            .unwrap();

        let schema = point()
            .optional()
            .default_value(Value::Struct(origin))
            .build()
            .unwrap();
        assert!(schema.default_value().is_some());

        let unrelated = SchemaBuilder::struct_()
            .name("unrelated")
            .field("secret", SchemaBuilder::string().build().unwrap())
            .build()
            .unwrap();
        let leak = Struct::new(unrelated).unwrap().with("secret", "leak").unwrap();
        let err = point()
            .default_value(Value::Struct(leak))
            .build()
            .unwrap_err();
        assert!(matches!(err, TypesError::InvalidSchema(_)));
    }

    #[test]
    fn test_logical_type_detection() {
        let date = SchemaBuilder::date().build().unwrap();
        assert_eq!(date.logical_type(), Some(LogicalType::Date));

        let decimal = SchemaBuilder::decimal(2).build().unwrap();
        assert_eq!(decimal.logical_type(), Some(LogicalType::Decimal));
        assert_eq!(decimal.parameter("scale"), Some("2"));

        // Known name on the wrong physical type is ignored
        let wrong = SchemaBuilder::string()
            .name(LogicalType::Date.name())
            .build()
            .unwrap();
        assert_eq!(wrong.logical_type(), None);

        let custom = SchemaBuilder::int32().name("com.example.Custom").build().unwrap();
        assert_eq!(custom.logical_type(), None);
    }

    #[test]
    fn test_container_schemas() {
        let array = SchemaBuilder::array(SchemaBuilder::int32().build().unwrap())
            .build()
            .unwrap();
        assert_eq!(
            array.element_schema().unwrap().schema_type(),
            SchemaType::Int32
        );

        let map = SchemaBuilder::map(
            SchemaBuilder::string().build().unwrap(),
            SchemaBuilder::float64().build().unwrap(),
        )
        .build()
        .unwrap();
        assert_eq!(map.key_schema().unwrap().schema_type(), SchemaType::String);
        assert_eq!(map.value_schema().unwrap().schema_type(), SchemaType::Float64);
        assert!(map.element_schema().is_none());
    }
}
