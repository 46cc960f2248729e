//! Chunking engine.
//!
//! Turns the final, annotated element stream into retrieval-sized chunks.
//!
//! # Pipeline
//!
//! 1. **Pre-chunking**: elements are grouped until the next one would break
//!    the soft or hard cap or opens a new section. Tables always form their
//!    own group; PageBreaks are dropped
//! 2. **Combining** (by_title): groups shorter than
//!    `combine_text_under_n_chars` absorb the following groups while the
//!    result fits `max_characters`
//! 3. **Materialising**: each text group becomes a CompositeElement whose
//!    text is the element texts joined by a blank line. A group longer than
//!    the cap (a single oversize element) is split into continuation pieces.
//!    A table becomes one Table, or TableChunk pieces split at row and cell
//!    boundaries
//!
//! Chunk metadata keeps the document-level fields of its elements and drops
//! element-specific ones.
//!
//! # Examples
//!
//! ```
//! use element_oxide::chunking::{Chunker, ChunkingOptions};
//! use element_oxide::elements::{Element, ElementType};
//!
//! let chunker = Chunker::new(ChunkingOptions::by_title(100)).unwrap();
//! let chunks = chunker.chunk(&[
//!     Element::new(ElementType::Title, "Intro"),
//!     Element::new(ElementType::NarrativeText, "Body text."),
//! ]);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].text, "Intro\n\nBody text.");
//! ```

mod config;
mod consolidate;
mod pre_chunk;
mod table;
mod text_splitter;

pub use config::{ChunkingOptions, ChunkingStrategy};
pub use text_splitter::TextSplitter;

use crate::elements::{Element, ElementType};
use crate::error::Result;

use consolidate::consolidate_metadata;
use pre_chunk::{combine_pre_chunks, pre_chunk, PreChunk, TextPreChunk};

/// Groups elements into chunks.
#[derive(Debug, Clone)]
pub struct Chunker {
    options: ChunkingOptions,
}

impl Chunker {
    /// Create a chunker; fails with `InvalidChunkingConfig` on bad options.
    pub fn new(options: ChunkingOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options in use.
    pub fn options(&self) -> &ChunkingOptions {
        &self.options
    }

    /// Chunk `elements`, in order.
    pub fn chunk(&self, elements: &[Element]) -> Vec<Element> {
        let pre_chunks = combine_pre_chunks(pre_chunk(elements, &self.options), &self.options);

        let mut chunks = Vec::with_capacity(pre_chunks.len());
        for pre_chunk in pre_chunks {
            match pre_chunk {
                PreChunk::Text(text) => chunks.extend(self.text_chunks(text)),
                PreChunk::Table(table) => {
                    let metadata = consolidate_metadata(std::slice::from_ref(&table), self.options.include_orig_elements);
                    chunks.extend(table::chunk_table(&table, self.options.hard_max(), metadata));
                },
            }
        }

        log::debug!("chunked {} elements into {} chunks", elements.len(), chunks.len());
        chunks
    }

    fn text_chunks(&self, pre_chunk: TextPreChunk) -> Vec<Element> {
        let text = pre_chunk.text();
        let metadata = consolidate_metadata(&pre_chunk.elements, self.options.include_orig_elements);
        let max = self.options.hard_max();

        if pre_chunk.text_len() <= max {
            return vec![Element::new(ElementType::CompositeElement, text).with_metadata(metadata)];
        }

        let pieces = TextSplitter::new(max, self.options.overlap).split(&text);
        log::debug!(
            "splitting oversize text of {} characters into {} pieces of at most {}",
            pre_chunk.text_len(),
            pieces.len(),
            max
        );
        pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| {
                let mut metadata = metadata.clone();
                if i > 0 {
                    metadata.is_continuation = Some(true);
                }
                Element::new(ElementType::CompositeElement, piece).with_metadata(metadata)
            })
            .collect()
    }
}

/// Chunk `elements` with `options` in one call.
pub fn chunk_elements(elements: &[Element], options: ChunkingOptions) -> Result<Vec<Element>> {
    Ok(Chunker::new(options)?.chunk(elements))
}
