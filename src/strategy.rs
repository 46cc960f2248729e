//! Extraction strategy selection.
//!
//! The extractors upstream of this crate run in one of several modes. The
//! requested mode is not always usable: the layout model or OCR engine may be
//! missing, or the document may have no text layer. [`determine_strategy`]
//! walks a fixed fallback cycle until it reaches a usable mode:
//!
//! ```text
//! hi_res -> fast -> ocr_only -> hi_res
//! ```
//!
//! `auto` picks its first state from the document; images are never `fast`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Extraction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Choose from the document's traits
    #[default]
    Auto,
    /// Layout model plus text layer or OCR
    HiRes,
    /// Embedded text layer only
    Fast,
    /// OCR only
    OcrOnly,
}

impl PartitionStrategy {
    /// Serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionStrategy::Auto => "auto",
            PartitionStrategy::HiRes => "hi_res",
            PartitionStrategy::Fast => "fast",
            PartitionStrategy::OcrOnly => "ocr_only",
        }
    }

    /// Next mode to try when this one is unusable.
    fn fallback(&self) -> PartitionStrategy {
        match self {
            PartitionStrategy::Auto | PartitionStrategy::HiRes => PartitionStrategy::Fast,
            PartitionStrategy::Fast => PartitionStrategy::OcrOnly,
            PartitionStrategy::OcrOnly => PartitionStrategy::HiRes,
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is known about a document and the installed extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentTraits {
    /// The document is a raster image
    pub is_image: bool,
    /// The document has an embedded text layer
    pub has_extractable_text: bool,
    /// Tables or images must be extracted with structure
    pub needs_layout: bool,
    /// A layout model is installed
    pub hi_res_available: bool,
    /// An OCR engine is installed
    pub ocr_available: bool,
}

impl DocumentTraits {
    /// Whether `strategy` can run on this document.
    pub fn supports(&self, strategy: PartitionStrategy) -> bool {
        match strategy {
            PartitionStrategy::Auto => false,
            PartitionStrategy::HiRes => self.hi_res_available,
            PartitionStrategy::Fast => self.has_extractable_text && !self.is_image,
            PartitionStrategy::OcrOnly => self.ocr_available,
        }
    }

    fn auto_choice(&self) -> PartitionStrategy {
        if self.is_image || self.needs_layout {
            PartitionStrategy::HiRes
        } else if self.has_extractable_text {
            PartitionStrategy::Fast
        } else {
            PartitionStrategy::OcrOnly
        }
    }
}

/// Resolve `requested` to a mode that can run on the document.
///
/// Fails with [`Error::StrategyUnavailable`] when no mode is usable.
///
/// # Examples
///
/// ```
/// use element_oxide::strategy::{determine_strategy, DocumentTraits, PartitionStrategy};
///
/// let scanned = DocumentTraits {
///     is_image: true,
///     ocr_available: true,
///     ..Default::default()
/// };
/// assert_eq!(determine_strategy(PartitionStrategy::Auto, &scanned).unwrap(), PartitionStrategy::OcrOnly);
/// ```
pub fn determine_strategy(requested: PartitionStrategy, traits: &DocumentTraits) -> Result<PartitionStrategy> {
    let mut state = match requested {
        PartitionStrategy::Auto => traits.auto_choice(),
        other => other,
    };

    // the cycle has three states
    for _ in 0..3 {
        if traits.supports(state) {
            return Ok(state);
        }
        let next = state.fallback();
        log::warn!("{} strategy unavailable for this document, falling back to {}", state, next);
        state = next;
    }

    Err(Error::StrategyUnavailable(format!(
        "requested {}, but no extraction mode can run (text layer: {}, layout model: {}, ocr: {})",
        requested, traits.has_extractable_text, traits.hi_res_available, traits.ocr_available
    )))
}
