//! Keep-as-produced reading order strategy.

use crate::elements::Element;
use crate::error::Result;
use crate::pipeline::{OrderedElement, ReadingOrderInfo};

use super::{ReadingOrderContext, ReadingOrderStrategy};

/// Keeps elements in the order the extractor produced them.
///
/// Right for formats whose extraction order is already the reading order
/// (HTML, Word, email bodies) and for callers that sort elements themselves.
pub struct OriginalOrderStrategy;

impl ReadingOrderStrategy for OriginalOrderStrategy {
    fn apply(&self, elements: Vec<Element>, _context: &ReadingOrderContext) -> Result<Vec<OrderedElement>> {
        Ok(elements
            .into_iter()
            .enumerate()
            .map(|(order, element)| OrderedElement::with_info(element, order, ReadingOrderInfo::original()))
            .collect())
    }

    fn name(&self) -> &'static str {
        "OriginalOrderStrategy"
    }
}
