//! Layout analysis: extractor candidates and their reconciliation.
//!
//! Extractors hand over [`CandidateElement`]s per page; [`LayoutMerger`]
//! turns them into one deduplicated element set, and [`classify_text`]
//! names what no extractor could.

pub mod candidate;
pub mod merge;
pub mod text_classifier;

pub use candidate::{BoundingBox, CandidateElement, CategoryHint, DocumentInput, NormalizedCategory, PageCandidates};
pub use merge::{LayoutMerger, MergeStats, TableStructureSource};
pub use text_classifier::{classify_text, TextClassification};
