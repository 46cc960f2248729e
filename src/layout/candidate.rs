//! Raw candidate elements as supplied by external extractors.
//!
//! Extractors (embedded text, layout detection, OCR) each propose elements
//! for a page. A proposal carries a free-form category label, text, an
//! optional box and the source that produced it. [`CategoryHint`] maps the
//! labels seen in practice onto [`ElementType`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::elements::{CandidateSource, DataSourceMetadata, ElementMetadata, ElementType, HeadingRole};
use crate::geometry::{CoordinateSystem, CoordinateSystemKind, Rect};

/// Raw category label of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryHint(String);

/// Category, depth and heading role a label normalises to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedCategory {
    /// Element category
    pub category: ElementType,
    /// Depth implied by the label, if any
    pub depth: Option<u32>,
    /// Headline origin of a Title
    pub role: Option<HeadingRole>,
}

impl NormalizedCategory {
    fn plain(category: ElementType) -> Self {
        Self {
            category,
            depth: None,
            role: None,
        }
    }

    fn heading(role: HeadingRole) -> Self {
        Self {
            category: ElementType::Title,
            depth: Some(role.depth()),
            role: Some(role),
        }
    }
}

impl CategoryHint {
    /// Wrap a raw label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The raw label.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Map the label onto an element category.
    ///
    /// Exact category names are accepted as-is. Layout-model labels are
    /// matched ignoring case, spaces, hyphens and underscores. Anything else
    /// is UncategorizedText.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::elements::ElementType;
    /// use element_oxide::layout::CategoryHint;
    ///
    /// assert_eq!(CategoryHint::new("Section-header").normalize().category, ElementType::Title);
    /// assert_eq!(CategoryHint::new("Headline").normalize().depth, Some(1));
    /// assert_eq!(CategoryHint::new("blob").normalize().category, ElementType::UncategorizedText);
    /// ```
    pub fn normalize(&self) -> NormalizedCategory {
        if let Some(category) = ElementType::from_name(self.0.trim()) {
            return NormalizedCategory::plain(category);
        }

        let key: String = self
            .0
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(|c| c.to_lowercase())
            .collect();

        match key.as_str() {
            "headline" => NormalizedCategory::heading(HeadingRole::Headline),
            "subheadline" => NormalizedCategory::heading(HeadingRole::Subheadline),
            "title" | "sectionheader" | "heading" | "header1" => NormalizedCategory::plain(ElementType::Title),
            "text" | "paragraph" | "footnote" | "narrativetext" | "abstract" => {
                NormalizedCategory::plain(ElementType::NarrativeText)
            },
            "listitem" | "list" => NormalizedCategory::plain(ElementType::ListItem),
            "table" => NormalizedCategory::plain(ElementType::Table),
            "picture" | "figure" | "image" => NormalizedCategory::plain(ElementType::Image),
            "caption" | "figurecaption" => NormalizedCategory::plain(ElementType::FigureCaption),
            "pageheader" | "header" => NormalizedCategory::plain(ElementType::Header),
            "pagefooter" | "footer" => NormalizedCategory::plain(ElementType::Footer),
            "formula" | "equation" => NormalizedCategory::plain(ElementType::Formula),
            "checked" | "unchecked" | "checkbox" => NormalizedCategory::plain(ElementType::CheckBox),
            "code" | "codesnippet" => NormalizedCategory::plain(ElementType::CodeSnippet),
            "address" => NormalizedCategory::plain(ElementType::Address),
            "email" | "emailaddress" => NormalizedCategory::plain(ElementType::EmailAddress),
            "pagebreak" => NormalizedCategory::plain(ElementType::PageBreak),
            _ => NormalizedCategory::plain(ElementType::UncategorizedText),
        }
    }
}

impl From<&str> for CategoryHint {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ElementType> for CategoryHint {
    fn from(category: ElementType) -> Self {
        Self::new(category.as_str())
    }
}

/// Axis-aligned box given by two corners, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a box from its corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// As a [`Rect`]; swapped corners are put back in order.
    pub fn to_rect(&self) -> Rect {
        Rect::from_points(
            self.x0.min(self.x1),
            self.y0.min(self.y1),
            self.x0.max(self.x1),
            self.y0.max(self.y1),
        )
    }
}

/// One element proposed by an extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateElement {
    /// Raw category label
    #[serde(default)]
    pub category_hint: CategoryHint,
    /// Text content
    #[serde(default)]
    pub text: String,
    /// Location on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    /// Page number; defaults to the page the candidate is listed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Extractor that produced the candidate
    pub source: CandidateSource,
    /// Detector confidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Nesting depth supplied by the source format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_depth: Option<u32>,
    /// Table HTML supplied by the extractor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_as_html: Option<String>,
    /// Languages supplied by the extractor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

impl CandidateElement {
    /// Create a candidate without geometry.
    pub fn new(category_hint: impl Into<CategoryHint>, text: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            category_hint: category_hint.into(),
            text: text.into(),
            bbox: None,
            page_number: None,
            source,
            confidence: None,
            category_depth: None,
            text_as_html: None,
            languages: None,
        }
    }

    /// Set the bounding box from its corners.
    pub fn with_bbox(mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.bbox = Some(BoundingBox::new(x0, y0, x1, y1));
        self
    }

    /// Set the page number.
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    /// Set the detector confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set the table HTML.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.text_as_html = Some(html.into());
        self
    }

    /// Set the category depth.
    pub fn with_category_depth(mut self, depth: u32) -> Self {
        self.category_depth = Some(depth);
        self
    }
}

/// All candidates proposed for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCandidates {
    /// 1-based page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Page width in layout units
    pub width: f32,
    /// Page height in layout units
    pub height: f32,
    /// System the candidate boxes are expressed in
    #[serde(default = "default_system")]
    pub coordinate_system: CoordinateSystemKind,
    /// Proposals from every source, in any order
    #[serde(default)]
    pub candidates: Vec<CandidateElement>,
}

fn default_system() -> CoordinateSystemKind {
    CoordinateSystemKind::PixelSpace
}

impl PageCandidates {
    /// Create an empty pixel-space page.
    pub fn new(page_number: Option<u32>, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            coordinate_system: default_system(),
            candidates: Vec::new(),
        }
    }

    /// Add a candidate.
    pub fn with_candidate(mut self, candidate: CandidateElement) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// The page's coordinate system.
    pub fn system(&self) -> CoordinateSystem {
        CoordinateSystem::new(self.coordinate_system.clone(), self.width, self.height)
    }
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Source file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Directory of the source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_directory: Option<String>,
    /// MIME type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
    /// Last modification time (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Provenance in the source system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceMetadata>,
    /// Per-page candidates
    #[serde(default)]
    pub pages: Vec<PageCandidates>,
}

impl DocumentInput {
    /// Create an empty document.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Default::default()
        }
    }

    /// Add a page.
    pub fn with_page(mut self, page: PageCandidates) -> Self {
        self.pages.push(page);
        self
    }

    /// Group a flat candidate list into pages by candidate page number.
    ///
    /// Every page gets the same size; candidates without a page number form
    /// one page of their own.
    pub fn from_candidates(
        filename: impl Into<String>,
        candidates: Vec<CandidateElement>,
        width: f32,
        height: f32,
    ) -> Self {
        let mut pages: BTreeMap<Option<u32>, PageCandidates> = BTreeMap::new();
        for candidate in candidates {
            pages
                .entry(candidate.page_number)
                .or_insert_with(|| PageCandidates::new(candidate.page_number, width, height))
                .candidates
                .push(candidate);
        }
        Self {
            pages: pages.into_values().collect(),
            ..Self::new(filename)
        }
    }

    /// Document-level metadata shared by every element.
    pub fn base_metadata(&self) -> ElementMetadata {
        ElementMetadata {
            filename: self.filename.clone(),
            file_directory: self.file_directory.clone(),
            filetype: self.filetype.clone(),
            last_modified: self.last_modified.clone(),
            data_source: self.data_source.clone(),
            ..Default::default()
        }
    }
}
