//! Typed document elements.
//!
//! An [`Element`] is one unit of extracted content: a category from a closed
//! set, its text and the shared [`ElementMetadata`] envelope. Category-specific
//! data (only tables carry HTML) is enforced by the constructors rather than
//! by separate types, so every stage can handle elements uniformly.
//!
//! ## Example
//!
//! ```
//! use element_oxide::elements::{Element, ElementType};
//!
//! let title = Element::new(ElementType::Title, "Introduction").with_page_number(1);
//! assert!(title.category.is_title());
//!
//! let table = Element::table("a b", "<table><tr><td>a</td><td>b</td></tr></table>");
//! assert!(table.text_as_html().is_some());
//! ```

mod id;
pub mod json;
mod metadata;
pub mod table;

pub use id::{assign_ids, ElementId, IdMode};
pub use json::{
    element_from_value, element_to_value, elements_from_file, elements_from_json,
    elements_to_file, elements_to_json,
};
pub use metadata::{CandidateSource, DataSourceMetadata, ElementMetadata, HeadingRole};
pub use table::{HtmlCell, HtmlRow, HtmlTable};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{CoordinateSystem, CoordinatesMetadata, Orientation, Rect};

/// Closed set of element categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    /// Heading of a section
    Title,
    /// Running prose
    NarrativeText,
    /// Item of a bulleted or numbered list
    ListItem,
    /// Table; may carry `text_as_html`
    Table,
    /// Picture or figure
    Image,
    /// Caption of a figure or table
    FigureCaption,
    /// Running page header
    Header,
    /// Running page footer
    Footer,
    /// Postal address
    Address,
    /// E-mail address
    EmailAddress,
    /// Page boundary marker
    PageBreak,
    /// Mathematical formula
    Formula,
    /// Form check box
    CheckBox,
    /// Source code
    CodeSnippet,
    /// Text that could not be classified
    UncategorizedText,
    /// Chunk of text elements (chunking output)
    CompositeElement,
    /// Piece of a split table (chunking output)
    TableChunk,
}

impl ElementType {
    /// Every category, in declaration order.
    pub const ALL: [ElementType; 17] = [
        ElementType::Title,
        ElementType::NarrativeText,
        ElementType::ListItem,
        ElementType::Table,
        ElementType::Image,
        ElementType::FigureCaption,
        ElementType::Header,
        ElementType::Footer,
        ElementType::Address,
        ElementType::EmailAddress,
        ElementType::PageBreak,
        ElementType::Formula,
        ElementType::CheckBox,
        ElementType::CodeSnippet,
        ElementType::UncategorizedText,
        ElementType::CompositeElement,
        ElementType::TableChunk,
    ];

    /// Serialized name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Title => "Title",
            ElementType::NarrativeText => "NarrativeText",
            ElementType::ListItem => "ListItem",
            ElementType::Table => "Table",
            ElementType::Image => "Image",
            ElementType::FigureCaption => "FigureCaption",
            ElementType::Header => "Header",
            ElementType::Footer => "Footer",
            ElementType::Address => "Address",
            ElementType::EmailAddress => "EmailAddress",
            ElementType::PageBreak => "PageBreak",
            ElementType::Formula => "Formula",
            ElementType::CheckBox => "CheckBox",
            ElementType::CodeSnippet => "CodeSnippet",
            ElementType::UncategorizedText => "UncategorizedText",
            ElementType::CompositeElement => "CompositeElement",
            ElementType::TableChunk => "TableChunk",
        }
    }

    /// Look a category up by its serialized name.
    pub fn from_name(name: &str) -> Option<ElementType> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Whether this is the Title category.
    pub fn is_title(&self) -> bool {
        matches!(self, ElementType::Title)
    }

    /// Whether elements of this category may carry `text_as_html`.
    pub fn is_table(&self) -> bool {
        matches!(self, ElementType::Table | ElementType::TableChunk)
    }

    /// Whether this category is produced only by chunking.
    pub fn is_chunk(&self) -> bool {
        matches!(self, ElementType::CompositeElement | ElementType::TableChunk)
    }

    /// Whether this category says more than "some text".
    pub fn is_specific(&self) -> bool {
        !matches!(self, ElementType::UncategorizedText)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ElementRepr")]
pub struct Element {
    /// Element identifier
    #[serde(rename = "element_id")]
    pub id: ElementId,
    /// Element category
    #[serde(rename = "type")]
    pub category: ElementType,
    /// UTF-8 text content
    pub text: String,
    /// Metadata envelope
    pub metadata: ElementMetadata,
}

/// Wire shape of an element before construction rules are applied.
#[derive(Deserialize)]
struct ElementRepr {
    #[serde(rename = "element_id")]
    id: ElementId,
    #[serde(rename = "type")]
    category: ElementType,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: ElementMetadata,
}

impl From<ElementRepr> for Element {
    fn from(repr: ElementRepr) -> Self {
        let mut metadata = repr.metadata;
        if !repr.category.is_table() && metadata.text_as_html.is_some() {
            log::warn!(
                "dropping text_as_html on {} element {}: only tables carry HTML",
                repr.category,
                repr.id
            );
            metadata.text_as_html = None;
        }
        Element {
            id: repr.id,
            category: repr.category,
            text: repr.text,
            metadata,
        }
    }
}

impl Element {
    /// Create an element with empty metadata and a provisional content id.
    pub fn new(category: ElementType, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: ElementId::from_content(category.as_str(), &text),
            category,
            text,
            metadata: ElementMetadata::default(),
        }
    }

    /// Create a Table element with its HTML rendering.
    pub fn table(text: impl Into<String>, html: impl Into<String>) -> Self {
        let mut element = Self::new(ElementType::Table, text);
        element.metadata.text_as_html = Some(html.into());
        element
    }

    /// Create a TableChunk element with its HTML fragment.
    pub fn table_chunk(text: impl Into<String>, html: Option<String>) -> Self {
        let mut element = Self::new(ElementType::TableChunk, text);
        element.metadata.text_as_html = html;
        element
    }

    /// Create a page boundary marker.
    pub fn page_break() -> Self {
        Self::new(ElementType::PageBreak, "")
    }

    /// HTML rendering (tables only).
    pub fn text_as_html(&self) -> Option<&str> {
        self.metadata.text_as_html()
    }

    /// Set the HTML rendering.
    ///
    /// Fails with [`Error::InvalidElement`] unless the element is a Table or
    /// TableChunk.
    pub fn set_text_as_html(&mut self, html: Option<String>) -> Result<()> {
        if html.is_some() && !self.category.is_table() {
            return Err(Error::InvalidElement(format!(
                "{} elements cannot carry text_as_html",
                self.category
            )));
        }
        self.metadata.text_as_html = html;
        Ok(())
    }

    /// Set the page number.
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.metadata.page_number = Some(page_number);
        self
    }

    /// Set the category depth.
    pub fn with_category_depth(mut self, depth: u32) -> Self {
        self.metadata.category_depth = Some(depth);
        self
    }

    /// Set the source filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.metadata.filename = Some(filename.into());
        self
    }

    /// Set coordinates from a top-left anchored box.
    pub fn with_bbox(mut self, bbox: Rect, system: &CoordinateSystem) -> Self {
        self.metadata.coordinates = Some(CoordinatesMetadata::from_rect(bbox, system));
        self
    }

    /// Replace the metadata wholesale.
    ///
    /// HTML on non-table categories is discarded.
    pub fn with_metadata(mut self, mut metadata: ElementMetadata) -> Self {
        if !self.category.is_table() {
            metadata.text_as_html = None;
        }
        self.metadata = metadata;
        self
    }

    /// Bounding box, when the element has usable coordinates.
    pub fn bbox(&self) -> Option<Rect> {
        self.metadata
            .coordinates
            .as_ref()
            .filter(|c| c.is_usable())
            .map(|c| c.bounding_rect())
    }

    /// Bounding box with the origin at the top-left of the page.
    ///
    /// Boxes of y-up systems are flipped so that a smaller `y` is always
    /// nearer the top of the page.
    pub fn layout_bbox(&self) -> Option<Rect> {
        let coords = self.metadata.coordinates.as_ref().filter(|c| c.is_usable())?;
        let rect = coords.bounding_rect();
        match coords.system.orientation() {
            Orientation::Screen => Some(rect),
            Orientation::Cartesian => Some(Rect::new(
                rect.x,
                coords.layout_height - rect.bottom(),
                rect.width,
                rect.height,
            )),
        }
    }

    /// Number of characters (not bytes) of text.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Express this element's coordinates in `target`.
    ///
    /// Returns the converted coordinates (or `None` if the element has none).
    /// When `in_place` is set they also replace the element's own.
    pub fn convert_coordinates_to_new_system(
        &mut self,
        target: &CoordinateSystem,
        in_place: bool,
    ) -> Result<Option<CoordinatesMetadata>> {
        let converted = match &self.metadata.coordinates {
            Some(coords) => coords.to_system(target)?,
            None => return Ok(None),
        };
        if in_place {
            self.metadata.coordinates = Some(converted.clone());
        }
        Ok(Some(converted))
    }
}
