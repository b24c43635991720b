//! Recursive-distinct deep merge for YAML configuration documents.
//!
//! Merge semantics:
//! - Mappings: deep-merge by key (recursive)
//! - Sequences: REPLACE (overlay wins entirely, no concatenation)
//! - Scalars: override (overlay wins)
//! - Type mismatch: overlay wins wholesale, no partial merge
//!
//! Keys present only in the base are left untouched.

use serde_yaml::{Mapping, Value};

/// A parsed configuration document: string keys to nested values.
pub type ConfigDocument = Mapping;

/// Deep merge two YAML values.
///
/// Only when both sides are mappings does the merge recurse; in every other
/// case the overlay replaces the base.
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        // Both mappings: deep merge
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            Value::Mapping(merge_documents(base_map, overlay_map))
        }

        // Sequences, scalars, tagged values, mismatches: overlay wins
        (_, overlay) => overlay,
    }
}

/// Deep merge `overlay` into `base`, returning the merged document.
///
/// Existing keys keep their position; new keys are appended in overlay order.
pub fn merge_documents(mut base: ConfigDocument, overlay: ConfigDocument) -> ConfigDocument {
    for (key, overlay_value) in overlay {
        match base.get_mut(&key) {
            Some(slot) => {
                let base_value = std::mem::replace(slot, Value::Null);
                *slot = merge_values(base_value, overlay_value);
            }
            None => {
                base.insert(key, overlay_value);
            }
        }
    }
    base
}

/// Merge multiple documents in order (first is base, last has highest precedence).
pub fn merge_layers<I>(layers: I) -> ConfigDocument
where
    I: IntoIterator<Item = ConfigDocument>,
{
    layers
        .into_iter()
        .fold(ConfigDocument::new(), merge_documents)
}

/// Accept a parsed value as a document only if its top level is a mapping.
///
/// Scalars, sequences, tagged values and null (an empty file) carry no
/// content to merge.
pub fn as_document(value: Value) -> Option<ConfigDocument> {
    match value {
        Value::Mapping(map) => Some(map),
        _ => None,
    }
}
