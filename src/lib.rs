// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::unnecessary_map_or)]

//! # Element Oxide
//!
//! Format-agnostic document structuring in Rust.
//!
//! Raw element candidates from any extractor (embedded text layer, layout
//! model, OCR) go in; a deduplicated, reading-ordered, hierarchy-annotated
//! element stream comes out, optionally packed into retrieval-sized chunks.
//!
//! ## Core Features
//!
//! - **Layout Merge**: IoU deduplication across sources with a configurable
//!   source priority, containment absorption and text-only reclassification
//! - **Reading Order**: recursive XY-Cut with top-left anchored 90% box
//!   shrinking and a per-page original-order fallback
//! - **Hierarchy**: `category_depth` normalisation and depth-stack
//!   `parent_id` assignment
//! - **Chunking**: by_title and basic strategies with hard and soft caps,
//!   small-section combining and row/cell-boundary table splitting
//! - **Element JSON**: forward-compatible round trip of the element schema
//!
//! ## Architecture
//! - **Pluggable Design**: trait-based reading order strategies and table
//!   structure sources
//! - **Explicit Configuration**: one [`StructuringConfig`] threaded through
//!   every stage, validated once
//!
//! ## Quick Start
//!
//! ```
//! use element_oxide::{DocumentInput, StructuringConfig, StructuringPipeline};
//! use element_oxide::elements::CandidateSource;
//! use element_oxide::layout::{CandidateElement, PageCandidates};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = PageCandidates::new(Some(1), 612.0, 792.0)
//!     .with_candidate(
//!         CandidateElement::new("Text", "Body of the section.", CandidateSource::EmbeddedText)
//!             .with_bbox(72.0, 120.0, 540.0, 160.0),
//!     )
//!     .with_candidate(
//!         CandidateElement::new("Section-header", "Intro", CandidateSource::LayoutModel)
//!             .with_bbox(72.0, 72.0, 540.0, 100.0),
//!     );
//! let document = DocumentInput::new("report.pdf").with_page(page);
//!
//! let pipeline = StructuringPipeline::new(StructuringConfig::default())?;
//! let processed = pipeline.process(&document)?;
//!
//! assert_eq!(processed.elements[0].text, "Intro");
//! assert_eq!(processed.elements[1].metadata.parent_id, Some(processed.elements[0].id.clone()));
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry and coordinate systems
pub mod geometry;

// Element model
pub mod elements;

// Candidates and layout merge
pub mod layout;

// Orchestration and reading order
pub mod pipeline;

// Hierarchy
pub mod structure;

// Chunking
pub mod chunking;

// Supplementary stages
pub mod languages;
pub mod strategy;

// Re-exports
pub use config::StructuringConfig;
pub use elements::{Element, ElementId, ElementMetadata, ElementType};
pub use error::{Error, Result};
pub use layout::DocumentInput;
pub use pipeline::{process_batch, ProcessedDocument, StructuringPipeline};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than all other values.
    /// This ensures that sorting operations never panic due to NaN comparisons.
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater, // NaN > all numbers
            (false, true) => Ordering::Less,    // all numbers < NaN
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
