//! Elements paired with their reading order.
//!
//! [`OrderedElement`] wraps an [`Element`] with its position in the final
//! document order and a record of which strategy decided that position.

use crate::elements::Element;

/// Source of reading order assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingOrderSource {
    /// Order from XY-Cut recursive partitioning.
    ///
    /// Confidence: 0.90 (robust for multi-column layouts).
    XYCut,
    /// Order the elements were produced in, by configuration.
    ///
    /// Confidence: 1.0 for formats whose extraction order is authoritative.
    #[default]
    OriginalOrder,
    /// Original order kept because the page had unusable geometry.
    ///
    /// Confidence: 0.65 (best-effort).
    Fallback,
}

impl ReadingOrderSource {
    /// Get the default confidence for this source type.
    pub fn default_confidence(&self) -> f32 {
        match self {
            ReadingOrderSource::XYCut => 0.90,
            ReadingOrderSource::OriginalOrder => 1.0,
            ReadingOrderSource::Fallback => 0.65,
        }
    }

    /// Get strategy name for debugging.
    pub fn name(&self) -> &'static str {
        match self {
            ReadingOrderSource::XYCut => "XYCut",
            ReadingOrderSource::OriginalOrder => "OriginalOrder",
            ReadingOrderSource::Fallback => "Fallback",
        }
    }
}

/// Reading order metadata for an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReadingOrderInfo {
    /// Which strategy assigned this reading order.
    pub source: ReadingOrderSource,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl ReadingOrderInfo {
    /// Create with source and default confidence.
    pub fn from_source(source: ReadingOrderSource) -> Self {
        Self {
            confidence: source.default_confidence(),
            source,
        }
    }

    /// Create for XY-Cut source.
    pub fn xycut() -> Self {
        Self::from_source(ReadingOrderSource::XYCut)
    }

    /// Create for original-order source.
    pub fn original() -> Self {
        Self::from_source(ReadingOrderSource::OriginalOrder)
    }

    /// Create for a page that fell back to original order.
    pub fn fallback() -> Self {
        Self::from_source(ReadingOrderSource::Fallback)
    }
}

/// An element with an assigned reading order index.
///
/// `reading_order` is the position in the final document output
/// (0 = first to be read).
#[derive(Debug, Clone)]
pub struct OrderedElement {
    /// The underlying element.
    pub element: Element,

    /// Index in reading order (0 = first to be read).
    pub reading_order: usize,

    /// Reading order source and confidence information.
    pub order_info: ReadingOrderInfo,
}

impl OrderedElement {
    /// Create with explicit source info.
    pub fn with_info(element: Element, reading_order: usize, order_info: ReadingOrderInfo) -> Self {
        Self {
            element,
            reading_order,
            order_info,
        }
    }

    /// Get the reading order source.
    pub fn source(&self) -> ReadingOrderSource {
        self.order_info.source
    }

    /// Get the reading order confidence.
    pub fn confidence(&self) -> f32 {
        self.order_info.confidence
    }
}

/// Strip ordering information, sorted by `reading_order`.
pub fn into_elements(mut ordered: Vec<OrderedElement>) -> Vec<Element> {
    ordered.sort_by_key(|o| o.reading_order);
    ordered.into_iter().map(|o| o.element).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementType;

    #[test]
    fn test_default_confidences() {
        assert_eq!(ReadingOrderInfo::xycut().confidence, 0.90);
        assert_eq!(ReadingOrderInfo::fallback().source.name(), "Fallback");
        assert_eq!(ReadingOrderInfo::default().source, ReadingOrderSource::OriginalOrder);
    }

    #[test]
    fn test_into_elements_sorts_by_reading_order() {
        let ordered = vec![
            OrderedElement::with_info(Element::new(ElementType::Title, "b"), 1, ReadingOrderInfo::xycut()),
            OrderedElement::with_info(Element::new(ElementType::Title, "a"), 0, ReadingOrderInfo::xycut()),
        ];
        let texts: Vec<String> = into_elements(ordered).into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }
}
