//! Schema and value model for the connect-document converter.
//!
//! This crate provides the structured-data types consumed by the converter:
//!
//! - [`SchemaType`] - Type tag of a schema (int32, string, struct, ...)
//! - [`Schema`] / [`SchemaRef`] - Schema description shared through `Arc`
//! - [`SchemaBuilder`] - Fluent construction of schemas
//! - [`Struct`] - Structured record bound to its schema
//! - [`Value`] - Runtime value paired conceptually with a schema
//! - [`logical`] - Date, time, timestamp and decimal logical types
//! - [`envelope`] - Parsing of `{"schema": ..., "payload": ...}` JSON envelopes
//!
//! # Architecture
//!
//! ```text
//! connect-types (this crate)
//!    │
//!    └─── document-types   (converts Value + Schema into Documents)
//! ```
//!
//! # Example
//!
//! ```rust
//! use connect_types::{SchemaBuilder, Struct, Value};
//!
//! let schema = SchemaBuilder::struct_()
//!     .name("user")
//!     .field("id", SchemaBuilder::int64().build().unwrap())
//!     .field("email", SchemaBuilder::string().optional().build().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let user = Struct::new(schema)
//!     .unwrap()
//!     .with("id", Value::Int64(7))
//!     .unwrap();
//! assert_eq!(user.get("id"), Some(&Value::Int64(7)));
//! assert_eq!(user.get("email"), Some(&Value::Null));
//! ```

pub mod envelope;
pub mod error;
pub mod logical;
pub mod schema;
pub mod values;

// Re-exports for convenience
pub use error::{Result, TypesError};
pub use logical::LogicalType;
pub use schema::{Field, Schema, SchemaBuilder, SchemaRef, SchemaType};
pub use values::{Struct, Value};
