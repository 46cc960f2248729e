//! Element identifiers.
//!
//! Ids are either a truncated SHA-256 over the element's text and salient
//! metadata (reproducible across runs on identical input) or a random UUID.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Element;

/// Number of hex characters kept from the SHA-256 digest.
const HASH_ID_LEN: usize = 32;

/// How element ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdMode {
    /// Deterministic hash of text and salient metadata.
    #[default]
    Hash,
    /// Random v4 UUID.
    Uuid,
}

/// Stable identifier of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A fresh random id.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Provisional id derived from content alone.
    ///
    /// Used until [`assign_ids`] runs, which is once the final order is known.
    pub fn from_content(category: &str, text: &str) -> Self {
        Self(hash_hex(&[category, text]))
    }

    /// Deterministic id from the element's position and salient metadata.
    pub fn hashed(sequence: usize, element: &Element) -> Self {
        let sequence = sequence.to_string();
        let page = element
            .metadata
            .page_number
            .map(|p| p.to_string())
            .unwrap_or_default();
        let filename = element.metadata.filename.as_deref().unwrap_or("");
        Self(hash_hex(&[&sequence, filename, &page, &element.text]))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn hash_hex(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        // unit separator keeps ("ab", "c") distinct from ("a", "bc")
        hasher.update([0x1f]);
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(HASH_ID_LEN);
    for byte in digest.iter().take(HASH_ID_LEN / 2) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Replace every element's id according to `mode`.
///
/// `parent_id` references set before this call are remapped to the new id of
/// the nearest preceding element that carried the old id.
pub fn assign_ids(elements: &mut [Element], mode: IdMode) {
    let mut remap: HashMap<ElementId, ElementId> = HashMap::new();

    for (sequence, element) in elements.iter_mut().enumerate() {
        if let Some(parent) = element.metadata.parent_id.take() {
            match remap.get(&parent) {
                Some(new_parent) => element.metadata.parent_id = Some(new_parent.clone()),
                None => {
                    log::debug!(
                        "dropping parent_id {} of element {}: no preceding element carries it",
                        parent,
                        sequence
                    );
                },
            }
        }

        let new_id = match mode {
            IdMode::Hash => ElementId::hashed(sequence, element),
            IdMode::Uuid => ElementId::random(),
        };
        let old_id = std::mem::replace(&mut element.id, new_id.clone());
        remap.insert(old_id, new_id);
    }
}
