//! Chunking options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How elements are grouped into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Sections start at Titles and never share a chunk
    #[default]
    ByTitle,
    /// Pack elements by size only
    Basic,
}

/// Options of the chunking engine.
///
/// # Examples
///
/// ```
/// use element_oxide::chunking::ChunkingOptions;
///
/// let options = ChunkingOptions::by_title(500).with_new_after_n_chars(300);
/// assert!(options.validate().is_ok());
/// assert_eq!(options.soft_max(), 300);
///
/// assert!(ChunkingOptions::by_title(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingOptions {
    /// Grouping strategy
    pub strategy: ChunkingStrategy,

    /// Hard cap on chunk text length, in characters.
    ///
    /// Default: 500
    pub max_characters: usize,

    /// Soft cap: once a chunk is this long it is closed at the next element
    /// boundary, whatever that element's category. The break does not wait
    /// for the next Title, so a long section can end mid-section at an
    /// element boundary.
    ///
    /// Default: `max_characters`
    pub new_after_n_chars: Option<usize>,

    /// Sections shorter than this are combined with the following ones
    /// (by_title only).
    ///
    /// Default: `max_characters`
    pub combine_text_under_n_chars: Option<usize>,

    /// Whether a section may continue across a page boundary.
    ///
    /// Default: true
    pub multipage_sections: bool,

    /// Keep the constituent elements in chunk metadata.
    ///
    /// Default: true
    pub include_orig_elements: bool,

    /// Characters repeated between consecutive pieces of a split element.
    ///
    /// Default: 0
    pub overlap: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::ByTitle,
            max_characters: 500,
            new_after_n_chars: None,
            combine_text_under_n_chars: None,
            multipage_sections: true,
            include_orig_elements: true,
            overlap: 0,
        }
    }
}

impl ChunkingOptions {
    /// Separator placed between element texts in a chunk.
    pub const SEPARATOR: &'static str = "\n\n";

    /// by_title chunking with the given hard cap.
    pub fn by_title(max_characters: usize) -> Self {
        Self {
            strategy: ChunkingStrategy::ByTitle,
            max_characters,
            ..Default::default()
        }
    }

    /// Basic chunking with the given hard cap.
    pub fn basic(max_characters: usize) -> Self {
        Self {
            strategy: ChunkingStrategy::Basic,
            max_characters,
            ..Default::default()
        }
    }

    /// Set the soft cap.
    pub fn with_new_after_n_chars(mut self, n: usize) -> Self {
        self.new_after_n_chars = Some(n);
        self
    }

    /// Set the small-section threshold.
    pub fn with_combine_text_under_n_chars(mut self, n: usize) -> Self {
        self.combine_text_under_n_chars = Some(n);
        self
    }

    /// Allow or forbid sections spanning pages.
    pub fn with_multipage_sections(mut self, multipage: bool) -> Self {
        self.multipage_sections = multipage;
        self
    }

    /// Keep or drop constituent elements in chunk metadata.
    pub fn with_include_orig_elements(mut self, include: bool) -> Self {
        self.include_orig_elements = include;
        self
    }

    /// Set the overlap between pieces of a split element.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Hard cap.
    pub fn hard_max(&self) -> usize {
        self.max_characters
    }

    /// Soft cap.
    pub fn soft_max(&self) -> usize {
        self.new_after_n_chars.unwrap_or(self.max_characters)
    }

    /// Small-section threshold; 0 disables combining.
    pub fn combine_under(&self) -> usize {
        match self.strategy {
            ChunkingStrategy::ByTitle => self.combine_text_under_n_chars.unwrap_or(self.max_characters),
            ChunkingStrategy::Basic => 0,
        }
    }

    /// Check the options; every failure is [`Error::InvalidChunkingConfig`].
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(Error::InvalidChunkingConfig(reason));

        if self.max_characters == 0 {
            return invalid("max_characters must be greater than 0".to_string());
        }
        if let Some(n) = self.new_after_n_chars {
            if n == 0 {
                return invalid("new_after_n_chars must be greater than 0".to_string());
            }
            if n > self.max_characters {
                return invalid(format!(
                    "new_after_n_chars ({}) exceeds max_characters ({})",
                    n, self.max_characters
                ));
            }
        }
        if let Some(n) = self.combine_text_under_n_chars {
            if n > self.max_characters {
                return invalid(format!(
                    "combine_text_under_n_chars ({}) exceeds max_characters ({})",
                    n, self.max_characters
                ));
            }
        }
        if self.overlap >= self.max_characters {
            return invalid(format!(
                "overlap ({}) must be smaller than max_characters ({})",
                self.overlap, self.max_characters
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ChunkingOptions::default();
        assert_eq!(options.hard_max(), 500);
        assert_eq!(options.soft_max(), 500);
        assert_eq!(options.combine_under(), 500);
        assert_eq!(ChunkingOptions::basic(500).combine_under(), 0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        for options in [
            ChunkingOptions::by_title(0),
            ChunkingOptions::by_title(100).with_new_after_n_chars(0),
            ChunkingOptions::by_title(100).with_new_after_n_chars(101),
            ChunkingOptions::by_title(100).with_combine_text_under_n_chars(200),
            ChunkingOptions::by_title(100).with_overlap(100),
        ] {
            match options.validate() {
                Err(Error::InvalidChunkingConfig(_)) => {},
                other => panic!("expected InvalidChunkingConfig for {:?}, got {:?}", options, other),
            }
        }
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&ChunkingStrategy::ByTitle).unwrap();
        assert_eq!(json, "\"by_title\"");
        let options: ChunkingOptions = serde_json::from_str(r#"{"strategy": "basic", "max_characters": 80}"#).unwrap();
        assert_eq!(options.strategy, ChunkingStrategy::Basic);
        assert!(options.multipage_sections);
    }
}
