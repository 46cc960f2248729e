//! Configuration of the structuring pipeline.
//!
//! One explicit struct is threaded through every stage; nothing is read from
//! the environment. Each stage section keeps its own defaults, so a partial
//! JSON document is a valid configuration:
//!
//! ```
//! use element_oxide::config::StructuringConfig;
//!
//! let config: StructuringConfig =
//!     serde_json::from_str(r#"{"chunking": {"max_characters": 300}}"#).unwrap();
//! assert_eq!(config.chunking.unwrap().max_characters, 300);
//! assert_eq!(config.merge.iou_threshold, 0.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::chunking::ChunkingOptions;
use crate::elements::IdMode;
use crate::error::Result;
use crate::pipeline::config::{HierarchyConfig, LanguageConfig, MergeConfig, ReadingOrderConfig};

/// Configuration of every pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuringConfig {
    /// How element ids are generated
    pub id_mode: IdMode,
    /// Layout merge
    pub merge: MergeConfig,
    /// Reading order
    pub reading_order: ReadingOrderConfig,
    /// Hierarchy builder
    pub hierarchy: HierarchyConfig,
    /// Language metadata
    pub languages: LanguageConfig,
    /// Chunking; `None` skips the stage
    pub chunking: Option<ChunkingOptions>,
}

impl StructuringConfig {
    /// Create a configuration with default settings and no chunking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id mode.
    pub fn with_id_mode(mut self, id_mode: IdMode) -> Self {
        self.id_mode = id_mode;
        self
    }

    /// Set the merge configuration.
    pub fn with_merge(mut self, merge: MergeConfig) -> Self {
        self.merge = merge;
        self
    }

    /// Set the reading order configuration.
    pub fn with_reading_order(mut self, reading_order: ReadingOrderConfig) -> Self {
        self.reading_order = reading_order;
        self
    }

    /// Set the hierarchy configuration.
    pub fn with_hierarchy(mut self, hierarchy: HierarchyConfig) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Set the language configuration.
    pub fn with_languages(mut self, languages: LanguageConfig) -> Self {
        self.languages = languages;
        self
    }

    /// Enable chunking.
    pub fn with_chunking(mut self, chunking: ChunkingOptions) -> Self {
        self.chunking = Some(chunking);
        self
    }

    /// Validate every stage configuration.
    pub fn validate(&self) -> Result<()> {
        self.merge.validate()?;
        self.reading_order.validate()?;
        self.hierarchy.validate()?;
        if let Some(chunking) = &self.chunking {
            chunking.validate()?;
        }
        Ok(())
    }
}
