//! Document structuring pipeline.
//!
//! ```text
//! DocumentInput (per-page candidates from every extractor)
//!     ↓
//! [LayoutMerger] (one element per region)
//!     ↓
//! [ReadingOrderStrategy] (pluggable, per page)
//!     ↓
//! OrderedElement[] → Element[] with final ids and languages
//!     ↓
//! [HierarchyBuilder] (category_depth, parent_id)
//!     ↓
//! [Chunker] (optional)
//!     ↓
//! ProcessedDocument
//! ```
//!
//! # Key Design Principles
//!
//! 1. **Strictly sequential stages**: each stage consumes the complete output
//!    of the previous one for the whole document.
//!
//! 2. **Local fallbacks**: geometry and merge anomalies are resolved inside
//!    the stage that meets them; only configuration errors fail, and they
//!    fail at construction.
//!
//! 3. **Pluggable Strategies**: reading order is trait-based.
//!
//! 4. **Explicit configuration**: all settings in
//!    [`StructuringConfig`](crate::config::StructuringConfig).

pub mod config;
pub mod ordered_element;
pub mod reading_order;

// Re-export main types
pub use config::{
    HierarchyConfig, LanguageConfig, MergeConfig, ReadingOrderConfig, ReadingOrderStrategyType, XYCutConfig,
};
pub use ordered_element::{into_elements, OrderedElement, ReadingOrderInfo, ReadingOrderSource};
pub use reading_order::{
    create_strategy, order_document, OriginalOrderStrategy, ReadingOrderContext, ReadingOrderStrategy,
    XYCutStrategy,
};

use crate::chunking::Chunker;
use crate::config::StructuringConfig;
use crate::elements::{assign_ids, Element};
use crate::error::Result;
use crate::languages::apply_languages;
use crate::layout::{DocumentInput, LayoutMerger, TableStructureSource};
use crate::structure::HierarchyBuilder;

/// Output of the pipeline for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    /// Elements in reading order, with ids, languages and hierarchy
    pub elements: Vec<Element>,
    /// How each element's position was decided
    pub order_info: Vec<ReadingOrderInfo>,
    /// Index of each element's parent in `elements`
    pub parents: Vec<Option<usize>>,
    /// Chunks, when chunking is configured
    pub chunks: Option<Vec<Element>>,
}

impl ProcessedDocument {
    /// Chunks if chunking ran, elements otherwise.
    pub fn output(&self) -> &[Element] {
        self.chunks.as_deref().unwrap_or(&self.elements)
    }
}

/// The structuring pipeline - orchestrates the full flow.
///
/// Construction validates the whole configuration; a constructed pipeline
/// holds no per-document state and can process any number of documents.
pub struct StructuringPipeline {
    config: StructuringConfig,
    merger: LayoutMerger,
    reading_order_strategy: Box<dyn ReadingOrderStrategy>,
    hierarchy: HierarchyBuilder,
    chunker: Option<Chunker>,
}

impl StructuringPipeline {
    /// Create a pipeline; fails on an invalid configuration.
    pub fn new(config: StructuringConfig) -> Result<Self> {
        config.validate()?;
        let merger = LayoutMerger::new(config.merge.clone())?;
        let reading_order_strategy = create_strategy(&config.reading_order);
        let hierarchy = HierarchyBuilder::new(config.hierarchy.clone())?;
        let chunker = config.chunking.clone().map(Chunker::new).transpose()?;
        Ok(Self {
            config,
            merger,
            reading_order_strategy,
            hierarchy,
            chunker,
        })
    }

    /// Use `source` to fill HTML of merged tables.
    pub fn with_table_source(mut self, source: Box<dyn TableStructureSource>) -> Self {
        self.merger = self.merger.with_table_source(source);
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &StructuringConfig {
        &self.config
    }

    /// Run every stage on one document's candidates.
    pub fn process(&self, document: &DocumentInput) -> Result<ProcessedDocument> {
        let elements = self.merger.merge_document(document);
        log::debug!(
            "{}: {} elements after layout merge",
            document.filename.as_deref().unwrap_or("<unnamed>"),
            elements.len()
        );
        self.structure_elements(elements)
    }

    /// Run every stage after the layout merge on already merged elements.
    ///
    /// This is the entry point for formats whose extractor produces final
    /// elements directly (HTML, Word, email).
    pub fn structure_elements(&self, elements: Vec<Element>) -> Result<ProcessedDocument> {
        let mut ordered = order_document(self.reading_order_strategy.as_ref(), elements)?;
        ordered.sort_by_key(|o| o.reading_order);
        let order_info: Vec<ReadingOrderInfo> = ordered.iter().map(|o| o.order_info).collect();

        let mut elements = into_elements(ordered);
        assign_ids(&mut elements, self.config.id_mode);
        apply_languages(&mut elements, &self.config.languages);

        self.hierarchy.normalize_depths(&mut elements);
        let parents = self.hierarchy.build(&mut elements);

        let chunks = self.chunker.as_ref().map(|chunker| {
            let mut chunks = chunker.chunk(&elements);
            assign_ids(&mut chunks, self.config.id_mode);
            chunks
        });

        Ok(ProcessedDocument {
            elements,
            order_info,
            parents,
            chunks,
        })
    }
}

/// Process documents one after another.
///
/// A failing document yields its error in its slot; the others are
/// unaffected.
pub fn process_batch(pipeline: &StructuringPipeline, documents: &[DocumentInput]) -> Vec<Result<ProcessedDocument>> {
    documents
        .iter()
        .enumerate()
        .map(|(index, document)| {
            let result = pipeline.process(document);
            if let Err(e) = &result {
                log::warn!(
                    "document {} ({}) failed: {}",
                    index,
                    document.filename.as_deref().unwrap_or("<unnamed>"),
                    e
                );
            }
            result
        })
        .collect()
}
