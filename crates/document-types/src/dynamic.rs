//! Schema-less map conversion.
//!
//! Any serializable string-keyed map (a `HashMap`, a `BTreeMap`, a
//! `serde_json::Map`, or a struct deriving `Serialize`) is encoded to a JSON tree
//! and then converted with the same rules as [`from_json_tree`].

use crate::document::Document;
use crate::error::{ConversionError, Result};
use crate::json::from_json_tree;
use serde::Serialize;
use tracing::trace;

/// Convert a dynamic map into a document.
///
/// Fails with [`ConversionError::InvalidTopLevelInput`] when the input does not encode
/// to a JSON object, e.g. a map with non-string keys or a sequence.
pub fn from_dynamic_map<M>(map: &M) -> Result<Document>
where
    M: Serialize + ?Sized,
{
    let tree = serde_json::to_value(map).map_err(|e| {
        ConversionError::InvalidTopLevelInput(format!("failed to encode map to JSON: {e}"))
    })?;
    trace!("Encoded dynamic map to JSON tree");

    if !tree.is_object() {
        return Err(ConversionError::InvalidTopLevelInput(
            "dynamic input must encode to a JSON object".to_string(),
        ));
    }
    from_json_tree(&tree)
}
