//! Schema-carrying JSON envelopes.
//!
//! Records serialized with embedded schemas look like:
//!
//! ```json
//! {
//!   "schema": {
//!     "type": "struct",
//!     "name": "user",
//!     "fields": [
//!       { "field": "id", "type": "int64" },
//!       { "field": "tags", "type": "array", "items": { "type": "string" }, "optional": true }
//!     ]
//!   },
//!   "payload": { "id": 7, "tags": ["a", "b"] }
//! }
//! ```
//!
//! This module turns such documents into a [`SchemaRef`] and a [`Value`]. Bytes and
//! decimals travel as base64 strings (decimals may also be plain JSON numbers), dates
//! as day counts, times and timestamps as millis, and maps with non-string keys as
//! arrays of `[key, value]` pairs.

use crate::error::{Result, TypesError};
use crate::logical::LogicalType;
use crate::schema::{SchemaBuilder, SchemaRef, SchemaType};
use crate::values::{Struct, Value};
use base64::Engine;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A parsed schema/payload pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub schema: SchemaRef,
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
struct SchemaJson {
    #[serde(rename = "type")]
    schema_type: SchemaType,
    #[serde(default)]
    optional: bool,
    name: Option<String>,
    version: Option<i32>,
    doc: Option<String>,
    #[serde(default)]
    parameters: BTreeMap<String, String>,
    default: Option<JsonValue>,
    #[serde(default)]
    fields: Vec<FieldJson>,
    items: Option<Box<SchemaJson>>,
    keys: Option<Box<SchemaJson>>,
    values: Option<Box<SchemaJson>>,
}

#[derive(Debug, Deserialize)]
struct FieldJson {
    field: String,
    #[serde(flatten)]
    schema: SchemaJson,
}

/// Parse an envelope from its JSON text.
pub fn parse_envelope_str(s: &str) -> Result<Envelope> {
    let json: JsonValue = serde_json::from_str(s)?;
    parse_envelope(&json)
}

/// Parse an envelope from a JSON tree with `schema` and `payload` members.
pub fn parse_envelope(json: &JsonValue) -> Result<Envelope> {
    let obj = json.as_object().ok_or_else(|| {
        TypesError::InvalidSchema(format!(
            "envelope must be a JSON object, found {}",
            json_kind(json)
        ))
    })?;
    let schema_json = obj
        .get("schema")
        .ok_or_else(|| TypesError::InvalidSchema("envelope has no 'schema' member".to_string()))?;
    let schema = parse_schema(schema_json)?;
    let payload = payload_to_value(&schema, obj.get("payload").unwrap_or(&JsonValue::Null))?;
    Ok(Envelope { schema, payload })
}

/// Parse a schema description.
pub fn parse_schema(json: &JsonValue) -> Result<SchemaRef> {
    let parsed = SchemaJson::deserialize(json)
        .map_err(|e| TypesError::InvalidSchema(e.to_string()))?;
    build_schema(parsed)
}

fn build_schema(json: SchemaJson) -> Result<SchemaRef> {
    let mut builder = match json.schema_type {
        SchemaType::Array => {
            let items = json.items.ok_or_else(|| {
                TypesError::InvalidSchema("array schema requires 'items'".to_string())
            })?;
            SchemaBuilder::array(build_schema(*items)?)
        }
        SchemaType::Map => match (json.keys, json.values) {
            (Some(keys), Some(values)) => {
                SchemaBuilder::map(build_schema(*keys)?, build_schema(*values)?)
            }
            _ => {
                return Err(TypesError::InvalidSchema(
                    "map schema requires 'keys' and 'values'".to_string(),
                ))
            }
        },
        other => SchemaBuilder::new(other),
    };

    if json.optional {
        builder = builder.optional();
    }
    if let Some(name) = json.name {
        builder = builder.name(name);
    }
    if let Some(version) = json.version {
        builder = builder.version(version);
    }
    if let Some(doc) = json.doc {
        builder = builder.doc(doc);
    }
    for (key, value) in json.parameters {
        builder = builder.parameter(key, value);
    }
    for field in json.fields {
        builder = builder.field(field.field, build_schema(field.schema)?);
    }

    if let Some(default) = json.default {
        // The default is read against the schema as declared so far
        let declared = builder.clone().build()?;
        let value = payload_to_value(&declared, &default)?;
        builder = builder.default_value(value);
    }

    builder.build()
}

/// Convert a JSON payload into a [`Value`] according to its schema.
///
/// JSON null always yields [`Value::Null`]; whether null is acceptable is decided by
/// the consumer of the value, which knows about defaults and optionality.
pub fn payload_to_value(schema: &SchemaRef, json: &JsonValue) -> Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }

    let invalid = || TypesError::InvalidPayload {
        expected: schema.describe(),
        message: format!("found {}", json_kind(json)),
    };

    let value = match schema.schema_type() {
        SchemaType::Int8 => Value::Int8(integer(json).ok_or_else(invalid)?),
        SchemaType::Int16 => Value::Int16(integer(json).ok_or_else(invalid)?),
        SchemaType::Int32 => Value::Int32(integer(json).ok_or_else(invalid)?),
        SchemaType::Int64 => Value::Int64(json.as_i64().ok_or_else(invalid)?),
        SchemaType::Float32 => Value::Float32(json.as_f64().ok_or_else(invalid)? as f32),
        SchemaType::Float64 => Value::Float64(json.as_f64().ok_or_else(invalid)?),
        SchemaType::Boolean => Value::Boolean(json.as_bool().ok_or_else(invalid)?),
        SchemaType::String => Value::String(json.as_str().ok_or_else(invalid)?.to_string()),
        SchemaType::Bytes => match json {
            JsonValue::String(s) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(s)
                    .map_err(|e| TypesError::InvalidPayload {
                        expected: schema.describe(),
                        message: format!("invalid base64: {e}"),
                    })?;
                Value::Bytes(bytes)
            }
            JsonValue::Number(n) if schema.logical_type() == Some(LogicalType::Decimal) => {
                let decimal = Decimal::from_str(&n.to_string())
                    .or_else(|_| Decimal::from_scientific(&n.to_string()))
                    .map_err(|e| TypesError::InvalidDecimal(format!("{n}: {e}")))?;
                Value::Decimal(decimal)
            }
            _ => return Err(invalid()),
        },
        SchemaType::Array => {
            let items = json.as_array().ok_or_else(invalid)?;
            let element_schema = schema
                .element_schema()
                .ok_or_else(|| TypesError::InvalidSchema("array without items".to_string()))?;
            Value::Array(
                items
                    .iter()
                    .map(|item| payload_to_value(element_schema, item))
                    .collect::<Result<Vec<_>>>()?,
            )
        }
        SchemaType::Map => map_payload(schema, json)?,
        SchemaType::Struct => {
            let members = json.as_object().ok_or_else(invalid)?;
            let mut record = Struct::new(schema.clone())?;
            for field in schema.fields() {
                if let Some(member) = members.get(field.name()) {
                    let value = payload_to_value(field.schema(), member)?;
                    record.put(field.name(), value)?;
                }
            }
            Value::Struct(record)
        }
    };

    Ok(value)
}

fn map_payload(schema: &SchemaRef, json: &JsonValue) -> Result<Value> {
    let (key_schema, value_schema) = match (schema.key_schema(), schema.value_schema()) {
        (Some(k), Some(v)) => (k, v),
        _ => {
            return Err(TypesError::InvalidSchema(
                "map without key or value schema".to_string(),
            ))
        }
    };

    match json {
        JsonValue::Object(members) if key_schema.schema_type() == SchemaType::String => {
            let mut entries = Vec::with_capacity(members.len());
            for (key, member) in members {
                entries.push((
                    Value::String(key.clone()),
                    payload_to_value(value_schema, member)?,
                ));
            }
            Ok(Value::Map(entries))
        }
        JsonValue::Array(pairs) => {
            let mut entries = Vec::with_capacity(pairs.len());
            for pair in pairs {
                match pair.as_array().map(Vec::as_slice) {
                    Some([key, value]) => entries.push((
                        payload_to_value(key_schema, key)?,
                        payload_to_value(value_schema, value)?,
                    )),
                    _ => {
                        return Err(TypesError::InvalidPayload {
                            expected: schema.describe(),
                            message: format!("map entry must be a [key, value] pair, found {pair}"),
                        })
                    }
                }
            }
            Ok(Value::Map(entries))
        }
        other => Err(TypesError::InvalidPayload {
            expected: schema.describe(),
            message: format!("found {}", json_kind(other)),
        }),
    }
}

fn integer<T: TryFrom<i64>>(json: &JsonValue) -> Option<T> {
    json.as_i64().and_then(|i| T::try_from(i).ok())
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
