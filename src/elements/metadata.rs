//! Metadata envelope shared by every element category.

use std::io::{Read, Write};

use base64::Engine;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Element, ElementId};
use crate::geometry::CoordinatesMetadata;

/// Which raw extractor produced a candidate element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Text embedded in the source file (e.g. PDF text operators).
    EmbeddedText,
    /// Regions from a layout-detection model.
    LayoutModel,
    /// Optical character recognition.
    Ocr,
}

impl CandidateSource {
    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            CandidateSource::EmbeddedText => "embedded_text",
            CandidateSource::LayoutModel => "layout_model",
            CandidateSource::Ocr => "ocr",
        }
    }
}

/// Typographic role of a Title normalised from a headline label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingRole {
    /// Page headline
    Headline,
    /// Subheadline below a headline
    Subheadline,
}

impl HeadingRole {
    /// Depth given to Titles with this role.
    pub fn depth(&self) -> u32 {
        match self {
            HeadingRole::Headline => 1,
            HeadingRole::Subheadline => 2,
        }
    }
}

/// Provenance of the document in the system it was fetched from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSourceMetadata {
    /// Location of the document in its source system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Version of the document in its source system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Connector-specific keys that locate the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_locator: Option<IndexMap<String, serde_json::Value>>,
    /// Creation timestamp in the source system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    /// Modification timestamp in the source system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
    /// When the document was processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_processed: Option<String>,
    /// Access-control data, passed through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions_data: Option<Vec<serde_json::Value>>,
}

/// Metadata carried by every element.
///
/// All fields are optional. `text_as_html` is only ever populated on Table
/// and TableChunk elements; it is set through [`Element::table`],
/// [`Element::table_chunk`] or [`Element::set_text_as_html`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// Source file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Directory of the source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_directory: Option<String>,
    /// Last modification time of the source file (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// MIME type of the source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
    /// 1-based page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Sheet or slide name for formats with named pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    /// Location on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<CoordinatesMetadata>,
    /// Nesting level relative to same-category siblings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_depth: Option<u32>,
    /// Id of the nearest enclosing structural element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) text_as_html: Option<String>,
    /// Languages, most probable first (ISO 639-3)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    /// Emphasized runs of text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasized_text_contents: Option<Vec<String>>,
    /// Tags (`b`, `i`, ...) parallel to `emphasized_text_contents`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasized_text_tags: Option<Vec<String>>,
    /// Link targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_urls: Option<Vec<String>>,
    /// Link anchor texts, parallel to `link_urls`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_texts: Option<Vec<String>>,
    /// Set on every piece after the first of a split element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_continuation: Option<bool>,
    /// Confidence of the detector that produced the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_class_prob: Option<f32>,
    /// Extractor whose candidate won the layout merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_origin: Option<CandidateSource>,
    /// Headline or subheadline origin of a Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_role: Option<HeadingRole>,
    /// Provenance in the source system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceMetadata>,
    /// Elements a chunk was built from
    #[serde(default, skip_serializing_if = "Option::is_none", with = "orig_elements_codec")]
    pub orig_elements: Option<Vec<Element>>,
}

impl ElementMetadata {
    /// Every field name this version reads. Anything else is dropped on read.
    pub const KNOWN_FIELDS: &'static [&'static str] = &[
        "filename",
        "file_directory",
        "last_modified",
        "filetype",
        "page_number",
        "page_name",
        "coordinates",
        "category_depth",
        "parent_id",
        "text_as_html",
        "languages",
        "emphasized_text_contents",
        "emphasized_text_tags",
        "link_urls",
        "link_texts",
        "is_continuation",
        "detection_class_prob",
        "detection_origin",
        "heading_role",
        "data_source",
        "orig_elements",
    ];

    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// HTML rendering of a table element.
    pub fn text_as_html(&self) -> Option<&str> {
        self.text_as_html.as_deref()
    }

    /// Whether two elements come from the same source document.
    ///
    /// Element-specific fields (coordinates, detection probability, hierarchy)
    /// never take part.
    pub fn same_document(&self, other: &ElementMetadata) -> bool {
        self.filename == other.filename
            && self.file_directory == other.file_directory
            && self.filetype == other.filetype
            && self.data_source == other.data_source
    }
}

/// `orig_elements` travel as base64 of gzip-compressed element JSON.
mod orig_elements_codec {
    use super::*;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<Element>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(elements) => {
                let encoded = encode(elements).map_err(S::Error::custom)?;
                serializer.serialize_str(&encoded)
            },
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Element>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| decode(&s)).transpose().map_err(D::Error::custom)
    }

    pub(super) fn encode(elements: &[Element]) -> crate::error::Result<String> {
        let json = serde_json::to_vec(elements)?;
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;
        Ok(base64::engine::general_purpose::STANDARD.encode(compressed))
    }

    pub(super) fn decode(payload: &str) -> crate::error::Result<Vec<Element>> {
        let compressed = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| crate::error::Error::InvalidElement(format!("orig_elements: {}", e)))?;
        let mut json = Vec::new();
        flate2::read::GzDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;
        Ok(serde_json::from_slice(&json)?)
    }
}
