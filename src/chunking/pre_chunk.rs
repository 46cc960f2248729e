//! Grouping of elements into pre-chunks.
//!
//! A pre-chunk is the set of elements that will become one chunk (or, for an
//! oversize element or a table, one run of split pieces). Pre-chunks never
//! cross a section boundary; small ones are combined afterwards.

use crate::elements::{Element, ElementType};

use super::config::{ChunkingOptions, ChunkingStrategy};

/// Elements destined for one chunk.
#[derive(Debug, Clone)]
pub(crate) enum PreChunk {
    /// Text elements, joined with the separator
    Text(TextPreChunk),
    /// A single table, never mixed with text
    Table(Element),
}

/// Text elements of one pre-chunk.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextPreChunk {
    pub(crate) elements: Vec<Element>,
    text_len: usize,
}

impl TextPreChunk {
    /// Joined text of the elements; empty texts are skipped.
    pub(crate) fn text(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(ChunkingOptions::SEPARATOR)
    }

    /// Length of [`TextPreChunk::text`] in characters.
    pub(crate) fn text_len(&self) -> usize {
        self.text_len
    }

    /// Length after appending text of `len` characters.
    fn len_with(&self, len: usize) -> usize {
        joined_len(self.text_len, len)
    }

    fn push(&mut self, element: Element) {
        self.text_len = self.len_with(element.text.trim().chars().count());
        self.elements.push(element);
    }

    fn append(&mut self, other: TextPreChunk) {
        self.text_len = self.len_with(other.text_len);
        self.elements.extend(other.elements);
    }

    /// Whether `next` may be appended under the small-section rule.
    fn can_combine(&self, next: &TextPreChunk, options: &ChunkingOptions) -> bool {
        if self.text_len >= options.combine_under() {
            return false;
        }
        if self.len_with(next.text_len) > options.hard_max() {
            return false;
        }
        match (self.elements.last(), next.elements.first()) {
            (Some(last), Some(first)) => {
                last.metadata.same_document(&first.metadata)
                    && (options.multipage_sections || last.metadata.page_number == first.metadata.page_number)
            },
            _ => true,
        }
    }
}

fn joined_len(current: usize, added: usize) -> usize {
    match (current, added) {
        (0, n) => n,
        (c, 0) => c,
        (c, n) => c + ChunkingOptions::SEPARATOR.len() + n,
    }
}

/// Accumulates text elements until the next one no longer fits.
struct PreChunkBuilder<'a> {
    options: &'a ChunkingOptions,
    current: TextPreChunk,
}

impl<'a> PreChunkBuilder<'a> {
    fn new(options: &'a ChunkingOptions) -> Self {
        Self {
            options,
            current: TextPreChunk::default(),
        }
    }

    /// An empty builder takes anything. A builder past the soft cap takes
    /// nothing more; otherwise the joined text must stay within the hard cap.
    fn will_fit(&self, element: &Element) -> bool {
        if self.current.elements.is_empty() {
            return true;
        }
        if self.current.text_len > self.options.soft_max() {
            return false;
        }
        self.current.len_with(element.text.trim().chars().count()) <= self.options.hard_max()
    }

    fn add(&mut self, element: Element) {
        self.current.push(element);
    }

    fn flush(&mut self) -> Option<PreChunk> {
        if self.current.elements.is_empty() {
            return None;
        }
        Some(PreChunk::Text(std::mem::take(&mut self.current)))
    }
}

/// Whether `element` opens a new section after `previous`.
fn starts_section(previous: Option<&Element>, element: &Element, options: &ChunkingOptions) -> bool {
    if options.strategy == ChunkingStrategy::ByTitle && element.category.is_title() {
        return true;
    }
    let Some(previous) = previous else {
        return false;
    };
    if !options.multipage_sections && previous.metadata.page_number != element.metadata.page_number {
        return true;
    }
    !previous.metadata.same_document(&element.metadata)
}

/// Group `elements` into pre-chunks, in order. PageBreaks are dropped.
pub(crate) fn pre_chunk(elements: &[Element], options: &ChunkingOptions) -> Vec<PreChunk> {
    let mut pre_chunks = Vec::new();
    let mut builder = PreChunkBuilder::new(options);
    let mut previous: Option<&Element> = None;

    for element in elements {
        if element.category == ElementType::PageBreak {
            continue;
        }

        if starts_section(previous, element, options) {
            pre_chunks.extend(builder.flush());
        }
        previous = Some(element);

        if element.category == ElementType::Table {
            pre_chunks.extend(builder.flush());
            pre_chunks.push(PreChunk::Table(element.clone()));
            continue;
        }

        if !builder.will_fit(element) {
            pre_chunks.extend(builder.flush());
        }
        builder.add(element.clone());
    }

    pre_chunks.extend(builder.flush());
    pre_chunks
}

/// Combine runs of small text pre-chunks.
///
/// A text pre-chunk shorter than the small-section threshold absorbs the
/// following text pre-chunks while the result fits the hard cap. Tables are
/// never combined.
pub(crate) fn combine_pre_chunks(pre_chunks: Vec<PreChunk>, options: &ChunkingOptions) -> Vec<PreChunk> {
    if options.combine_under() == 0 {
        return pre_chunks;
    }

    let mut combined: Vec<PreChunk> = Vec::with_capacity(pre_chunks.len());
    for pre_chunk in pre_chunks {
        let fits = match (combined.last(), &pre_chunk) {
            (Some(PreChunk::Text(accum)), PreChunk::Text(next)) => accum.can_combine(next, options),
            _ => false,
        };
        if !fits {
            combined.push(pre_chunk);
            continue;
        }
        if let (Some(PreChunk::Text(accum)), PreChunk::Text(next)) = (combined.last_mut(), pre_chunk) {
            accum.append(next);
        }
    }
    combined
}
