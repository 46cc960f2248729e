//! JSON serialization of element lists.
//!
//! Output follows the element schema (`type`, `element_id`, `text`,
//! `metadata`). Reading is forward compatible: metadata keys this version
//! does not know are logged and dropped instead of failing the parse.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{Element, ElementMetadata};
use crate::error::{Error, Result};

/// Serialize one element to a JSON value.
pub fn element_to_value(element: &Element) -> Result<Value> {
    Ok(serde_json::to_value(element)?)
}

/// Parse one element from a JSON value, dropping unknown metadata keys.
pub fn element_from_value(mut value: Value) -> Result<Element> {
    let object = value
        .as_object_mut()
        .ok_or_else(|| Error::InvalidElement("element must be a JSON object".to_string()))?;

    if let Some(Value::Object(metadata)) = object.get_mut("metadata") {
        let unknown: Vec<String> = metadata
            .keys()
            .filter(|k| !ElementMetadata::KNOWN_FIELDS.contains(&k.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            log::warn!("ignoring unknown metadata field '{}'", key);
            metadata.remove(&key);
        }
    }

    Ok(serde_json::from_value(value)?)
}

/// Serialize elements to a pretty-printed JSON array.
pub fn elements_to_json(elements: &[Element]) -> Result<String> {
    Ok(serde_json::to_string_pretty(elements)?)
}

/// Parse a JSON array of elements.
pub fn elements_from_json(json: &str) -> Result<Vec<Element>> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(items) => items.into_iter().map(element_from_value).collect(),
        _ => Err(Error::InvalidElement("expected a JSON array of elements".to_string())),
    }
}

/// Write elements to a JSON file.
pub fn elements_to_file(elements: &[Element], path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, elements_to_json(elements)?)?;
    Ok(())
}

/// Read elements from a JSON file.
pub fn elements_from_file(path: impl AsRef<Path>) -> Result<Vec<Element>> {
    let json = fs::read_to_string(path)?;
    elements_from_json(&json)
}
