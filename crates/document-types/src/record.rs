//! Schema-driven conversion: `Schema` + `Value` → `DocValue`.
//!
//! The converter walks the schema and the value together. Dispatch happens on the
//! schema type tag; when no schema is available the runtime kind of the value decides.
//! Null handling (defaults, optionality) is resolved before any dispatch.
//!
//! The schema path is open-world: type tags without special handling pass their value
//! through. Values that cannot satisfy the handling their tag requires fail with
//! [`ConversionError::InvalidTypeForSchema`].

use crate::document::{DocValue, Document};
use crate::error::{ConversionError, Result};
use crate::path::FieldPath;
use chrono::{Datelike, NaiveDate, NaiveTime};
use connect_types::logical::{date, decimal, time, timestamp};
use connect_types::{LogicalType, Schema, SchemaRef, SchemaType, Struct, TypesError, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Convert a value under an optional schema.
///
/// Returns `Ok(None)` when the value is absent and that is acceptable (no schema, or an
/// optional schema without default); the caller omits the field.
pub fn convert(schema: Option<&SchemaRef>, value: &Value) -> Result<Option<DocValue>> {
    Converter::default().convert(schema, value)
}

/// Convert a structured record into a document.
///
/// The value must be a [`Struct`]. When `schema` is `None` the struct's own schema is
/// used; otherwise the struct must carry exactly that schema instance.
pub fn from_typed_record(schema: Option<&SchemaRef>, value: &Value) -> Result<Document> {
    let record = value.as_struct().ok_or_else(|| {
        ConversionError::InvalidTopLevelInput(format!(
            "expecting a structured value, found {}",
            value.kind()
        ))
    })?;
    let schema = schema.unwrap_or_else(|| record.schema());

    match Converter::default().convert(Some(schema), value)? {
        Some(DocValue::Document(doc)) => {
            debug!(
                schema = %schema.describe(),
                fields = doc.len(),
                "Converted typed record"
            );
            Ok(doc)
        }
        other => Err(ConversionError::InvalidTopLevelInput(format!(
            "record under {} converted to {} instead of a document",
            schema.describe(),
            other.as_ref().map_or("nothing", DocValue::kind)
        ))),
    }
}

#[derive(Debug, Default)]
struct Converter {
    path: FieldPath,
}

impl Converter {
    fn convert(&mut self, schema: Option<&SchemaRef>, value: &Value) -> Result<Option<DocValue>> {
        if value.is_null() {
            return self.convert_null(schema);
        }
        match schema {
            Some(schema) => self.convert_with_schema(schema, value),
            None => self.infer(value),
        }
    }

    fn convert_null(&mut self, schema: Option<&SchemaRef>) -> Result<Option<DocValue>> {
        let Some(schema) = schema else {
            return Ok(None);
        };

        if let Some(default) = schema.default_value() {
            trace!(path = %self.path, "Null value, using schema default");
            // A struct default is bound to the schema instance it was built against,
            // which must still have the declared structure
            let default_schema = match default {
                Value::Struct(s) if !s.schema().same_structure(schema) => {
                    return Err(ConversionError::SchemaMismatch {
                        path: self.path.clone(),
                        expected: schema.describe(),
                        actual: s.schema().describe(),
                    });
                }
                Value::Struct(s) => s.schema(),
                _ => schema,
            };
            return self.convert(Some(default_schema), default);
        }

        if schema.is_optional() {
            return Ok(None);
        }

        Err(ConversionError::MissingRequiredField {
            path: self.path.clone(),
        })
    }

    fn convert_with_schema(&mut self, schema: &SchemaRef, value: &Value) -> Result<Option<DocValue>> {
        let logical = schema.logical_type();

        let converted = match schema.schema_type() {
            SchemaType::Int32 => match (logical, value) {
                (Some(LogicalType::Date), Value::Int32(days)) => {
                    DocValue::String(format_days(i64::from(*days)))
                }
                (Some(LogicalType::Date), Value::Date(d)) => DocValue::String(format_date(d)),
                (Some(LogicalType::Time), Value::Int32(millis)) => {
                    let t = time::to_logical(*millis).map_err(|e| self.invalid_value(schema, e))?;
                    DocValue::String(format_time(&t))
                }
                (Some(LogicalType::Time), Value::Time(t)) => DocValue::String(format_time(t)),
                (_, Value::Int32(i)) => DocValue::Int32(*i),
                _ => return Err(self.invalid_type(SchemaType::Int32, value)),
            },

            SchemaType::Int64 => match (logical, value) {
                // Epoch millis are already the stored form, whatever instant they denote
                (Some(LogicalType::Timestamp), Value::Int64(millis)) => DocValue::Int64(*millis),
                (Some(LogicalType::Timestamp), Value::Timestamp(instant)) => {
                    DocValue::Int64(timestamp::from_logical(instant))
                }
                (_, Value::Int64(i)) => DocValue::Int64(*i),
                _ => return Err(self.invalid_type(SchemaType::Int64, value)),
            },

            SchemaType::String => match value {
                Value::String(s) => DocValue::String(s.clone()),
                _ => return Err(self.invalid_type(SchemaType::String, value)),
            },

            SchemaType::Bytes => self.convert_bytes(schema, logical, value)?,

            SchemaType::Array => match value {
                Value::Array(items) => self.convert_array(schema.element_schema(), items)?,
                _ => return Err(self.invalid_type(SchemaType::Array, value)),
            },

            SchemaType::Map => match value {
                Value::Map(entries) => self.convert_map(Some(schema), entries)?,
                _ => return Err(self.invalid_type(SchemaType::Map, value)),
            },

            SchemaType::Struct => match value {
                Value::Struct(record) => self.convert_struct(schema, record)?,
                _ => return Err(self.invalid_type(SchemaType::Struct, value)),
            },

            SchemaType::Int8
            | SchemaType::Int16
            | SchemaType::Float32
            | SchemaType::Float64
            | SchemaType::Boolean => return self.infer(value),
        };

        Ok(Some(converted))
    }

    fn convert_bytes(
        &mut self,
        schema: &Schema,
        logical: Option<LogicalType>,
        value: &Value,
    ) -> Result<DocValue> {
        match (logical, value) {
            (Some(LogicalType::Decimal), Value::Bytes(b)) => self.decode_decimal(schema, b),
            (Some(LogicalType::Decimal), Value::Buffer(b)) => self.decode_decimal(schema, b),
            (Some(LogicalType::Decimal), Value::Decimal(d)) => Ok(DocValue::Decimal(*d)),
            (_, Value::Bytes(b)) => Ok(DocValue::Binary(b.clone())),
            (_, Value::Buffer(b)) => Ok(DocValue::Binary(b.to_vec())),
            _ => Err(self.invalid_type(SchemaType::Bytes, value)),
        }
    }

    fn decode_decimal(&self, schema: &Schema, bytes: &[u8]) -> Result<DocValue> {
        let scale = decimal::scale(schema).map_err(|e| self.invalid_value(schema, e))?;
        let d = decimal::to_logical(bytes, scale).map_err(|e| self.invalid_value(schema, e))?;
        Ok(DocValue::Decimal(d))
    }

    fn convert_array(&mut self, element_schema: Option<&SchemaRef>, items: &[Value]) -> Result<DocValue> {
        let mut converted = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            self.path.push_index(i);
            let result = self.convert(element_schema, item);
            self.path.pop();
            if let Some(v) = result? {
                converted.push(v);
            }
        }
        Ok(DocValue::Array(converted))
    }

    fn convert_map(&mut self, schema: Option<&SchemaRef>, entries: &[(Value, Value)]) -> Result<DocValue> {
        let key_schema = schema.and_then(|s| s.key_schema());
        let value_schema = schema.and_then(|s| s.value_schema());

        // Without a schema, the first key decides the encoding for the whole map
        let object_mode = match key_schema {
            Some(k) => k.schema_type() == SchemaType::String,
            None => matches!(entries.first(), Some((Value::String(_), _))),
        };

        if object_mode {
            let mut fields = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let Value::String(name) = key else {
                    return Err(self.invalid_type(SchemaType::String, key));
                };
                self.path.push_key(name);
                let result = self.convert(value_schema, value);
                self.path.pop();
                if let Some(v) = result? {
                    fields.push((name.clone(), v));
                }
            }
            return Ok(DocValue::Document(fields.into_iter().collect()));
        }

        if !entries.is_empty() {
            debug!(path = %self.path, "Map keys are not strings, encoding entries as [key, value] pairs");
        }

        let mut pairs = Vec::with_capacity(entries.len());
        for (i, (key, value)) in entries.iter().enumerate() {
            self.path.push_index(i);
            let result = self
                .convert(key_schema, key)
                .and_then(|k| Ok((k, self.convert(value_schema, value)?)));
            self.path.pop();
            if let (Some(k), Some(v)) = result? {
                pairs.push(DocValue::Array(vec![k, v]));
            }
        }
        Ok(DocValue::Array(pairs))
    }

    fn convert_struct(&mut self, schema: &SchemaRef, record: &Struct) -> Result<DocValue> {
        if !Arc::ptr_eq(record.schema(), schema) {
            let actual = if **record.schema() == **schema {
                format!("{} (equal structure, different instance)", record.schema().describe())
            } else {
                record.schema().describe()
            };
            return Err(ConversionError::SchemaMismatch {
                path: self.path.clone(),
                expected: schema.describe(),
                actual,
            });
        }

        let mut fields = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let value = record.get_by_index(field.index()).unwrap_or(&Value::Null);
            self.path.push_field(field.name());
            let result = self.convert(Some(field.schema()), value);
            self.path.pop();
            if let Some(v) = result? {
                fields.push((field.name().to_string(), v));
            }
        }
        Ok(DocValue::Document(fields.into_iter().collect()))
    }

    /// Convert by runtime kind alone.
    fn infer(&mut self, value: &Value) -> Result<Option<DocValue>> {
        let converted = match value {
            Value::Null => return Ok(None),
            Value::Boolean(b) => DocValue::Boolean(*b),
            Value::Int8(i) => DocValue::Int32(i32::from(*i)),
            Value::Int16(i) => DocValue::Int32(i32::from(*i)),
            Value::Int32(i) => DocValue::Int32(*i),
            Value::Int64(i) => DocValue::Int64(*i),
            Value::Float32(f) => DocValue::Double(f64::from(*f)),
            Value::Float64(f) => DocValue::Double(*f),
            Value::String(s) => DocValue::String(s.clone()),
            Value::Bytes(b) => DocValue::Binary(b.clone()),
            Value::Buffer(b) => DocValue::Binary(b.to_vec()),
            Value::Array(items) => self.convert_array(None, items)?,
            Value::Map(entries) => self.convert_map(None, entries)?,
            Value::Struct(record) => self.convert_struct(record.schema(), record)?,
            Value::Date(d) => DocValue::String(format_date(d)),
            Value::Time(t) => DocValue::String(format_time(t)),
            Value::Timestamp(instant) => DocValue::Int64(timestamp::from_logical(instant)),
            Value::Decimal(d) => DocValue::Decimal(*d),
        };
        Ok(Some(converted))
    }

    fn invalid_type(&self, expected: SchemaType, value: &Value) -> ConversionError {
        ConversionError::InvalidTypeForSchema {
            path: self.path.clone(),
            expected,
            actual: value.kind(),
        }
    }

    fn invalid_value(&self, schema: &Schema, err: TypesError) -> ConversionError {
        ConversionError::InvalidValue {
            path: self.path.clone(),
            expected: schema.describe(),
            message: err.to_string(),
        }
    }
}

/// ISO-8601 date-time at UTC midnight, millisecond precision. Years outside
/// `0..=9999` carry an explicit sign.
fn format_civil(year: i64, month: u32, day: u32) -> String {
    let year = if (0..=9999).contains(&year) {
        format!("{year:04}")
    } else {
        format!("{year:+05}")
    };
    format!("{year}-{month:02}-{day:02}T00:00:00.000Z")
}

fn format_days(days: i64) -> String {
    let (year, month, day) = date::civil_from_days(days);
    format_civil(year, month, day)
}

fn format_date(d: &NaiveDate) -> String {
    format_civil(i64::from(d.year()), d.month(), d.day())
}

/// Time of day with millisecond precision and a numeric UTC offset.
fn format_time(t: &NaiveTime) -> String {
    format!("{}+0000", t.format("%H:%M:%S%.3f"))
}
