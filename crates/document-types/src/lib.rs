//! Document conversion for connect-types records, JSON trees and dynamic maps.
//!
//! This crate converts three input forms into one canonical [`Document`]:
//!
//! ```text
//! Schema + Value        ──► record::from_typed_record ──┐
//! serde_json::Value     ──► json::from_json_tree     ───┼──► Document ──► JSON / BSON
//! impl Serialize (map)  ──► dynamic::from_dynamic_map ──┘
//! ```
//!
//! # Modules
//!
//! - [`document`] - Ordered output model ([`Document`], [`DocValue`])
//! - [`record`] - Schema-driven recursive conversion
//! - [`json`] - JSON tree conversion
//! - [`dynamic`] - Schema-less map conversion
//! - [`capture`] - Error-capturing wrappers around every entry point
//! - [`bson`] - Export to `bson::Document`
//! - [`error`] - Conversion error taxonomy
//!
//! # Example
//!
//! ```rust
//! use document_types::{from_json_tree, DocValue};
//! use serde_json::json;
//!
//! let doc = from_json_tree(&json!({ "a": 1, "b": { "c": "x" }, "d": null })).unwrap();
//! assert_eq!(doc.get("a"), Some(&DocValue::Int64(1)));
//! assert!(!doc.contains_key("d"));
//! ```

pub mod bson;
pub mod capture;
pub mod document;
pub mod dynamic;
pub mod error;
pub mod json;
pub mod path;
pub mod record;

// Re-export main types for convenient access
pub use capture::{
    capture, try_convert, try_from_dynamic_map, try_from_json_tree, try_from_typed_record,
    Captured, Failure,
};
pub use document::{DocValue, Document};
pub use dynamic::from_dynamic_map;
pub use error::{ConversionError, ErrorKind, Result};
pub use json::from_json_tree;
pub use path::FieldPath;
pub use record::{convert, from_typed_record};
