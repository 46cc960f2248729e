//! Reading order strategies for structured elements.
//!
//! This module provides pluggable strategies for determining the reading order
//! of the elements on one page.
//!
//! # Available Strategies
//!
//! - [`XYCutStrategy`]: Recursive XY-Cut spatial partitioning (multi-column layouts)
//! - [`OriginalOrderStrategy`]: Keep extraction order (HTML, Word, email, ...)
//!
//! Pages are ordered independently; [`order_document`] stitches them together
//! in ascending page order.

mod original_order;
mod xycut;

pub use original_order::OriginalOrderStrategy;
pub use xycut::XYCutStrategy;

use std::collections::BTreeMap;

use crate::elements::Element;
use crate::error::Result;
use crate::geometry::Rect;
use crate::pipeline::config::{ReadingOrderConfig, ReadingOrderStrategyType};
use crate::pipeline::OrderedElement;

/// Trait for determining reading order of the elements on one page.
///
/// Implementations must be deterministic: identical input geometry always
/// yields the identical order, and re-ordering an already ordered page is a
/// no-op.
pub trait ReadingOrderStrategy: Send + Sync {
    /// Apply reading order to the elements of one page.
    ///
    /// # Arguments
    ///
    /// * `elements` - The page's elements in extraction order
    /// * `context` - Page information
    ///
    /// # Returns
    ///
    /// Elements with reading order indices `0..n`, in that order.
    fn apply(&self, elements: Vec<Element>, context: &ReadingOrderContext) -> Result<Vec<OrderedElement>>;

    /// Return the name of this strategy for debugging.
    fn name(&self) -> &'static str;
}

/// Context information for reading order determination.
#[derive(Debug, Default)]
pub struct ReadingOrderContext {
    /// Page number, if the format has pages.
    pub page_number: Option<u32>,

    /// Page bounding box (if available).
    pub page_bbox: Option<Rect>,
}

impl ReadingOrderContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number.
    pub fn with_page(mut self, page_number: Option<u32>) -> Self {
        self.page_number = page_number;
        self
    }

    /// Set the page bounding box.
    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.page_bbox = Some(bbox);
        self
    }
}

/// Create a reading order strategy based on configuration.
pub fn create_strategy(config: &ReadingOrderConfig) -> Box<dyn ReadingOrderStrategy> {
    match config.strategy {
        ReadingOrderStrategyType::XYCut => Box::new(XYCutStrategy::with_config(config.xycut)),
        ReadingOrderStrategyType::OriginalOrder => Box::new(OriginalOrderStrategy),
    }
}

/// Order a whole document page by page.
///
/// Elements are grouped by page number (elements without one come first),
/// pages are visited in ascending order and each page is ordered by
/// `strategy`. The returned `reading_order` indices are document-wide.
pub fn order_document(
    strategy: &dyn ReadingOrderStrategy,
    elements: Vec<Element>,
) -> Result<Vec<OrderedElement>> {
    let mut pages: BTreeMap<Option<u32>, Vec<Element>> = BTreeMap::new();
    for element in elements {
        pages.entry(element.metadata.page_number).or_default().push(element);
    }

    let mut ordered = Vec::new();
    for (page_number, page_elements) in pages {
        let page_bbox = page_elements
            .iter()
            .find_map(|e| e.metadata.coordinates.as_ref())
            .map(|c| Rect::new(0.0, 0.0, c.layout_width, c.layout_height));
        let mut context = ReadingOrderContext::new().with_page(page_number);
        if let Some(bbox) = page_bbox {
            context = context.with_bbox(bbox);
        }

        let base = ordered.len();
        for mut item in strategy.apply(page_elements, &context)? {
            item.reading_order += base;
            ordered.push(item);
        }
    }

    Ok(ordered)
}
