//! Stage configuration for the structuring pipeline.
//!
//! Each stage owns one configuration struct. They are aggregated by
//! [`crate::config::StructuringConfig`] and validated once, when the pipeline
//! is constructed.

use serde::{Deserialize, Serialize};

use crate::elements::{CandidateSource, ElementType};
use crate::error::{Error, Result};

/// Configuration of the layout merge stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Two candidates overlap when their IoU exceeds this value.
    ///
    /// Default: 0.5
    pub iou_threshold: f32,

    /// Fraction of a candidate's area that must lie inside a higher-priority
    /// region for the candidate to be absorbed into it.
    ///
    /// Default: 0.9
    pub containment_threshold: f32,

    /// Candidate sources from highest to lowest priority.
    ///
    /// Default: layout model, embedded text, OCR
    pub source_priority: Vec<CandidateSource>,

    /// Outward margin (layout units) added to table regions before table
    /// structure extraction.
    ///
    /// Default: 12.0
    pub table_padding: f32,

    /// Run the text-only classifier on UncategorizedText elements.
    ///
    /// Default: true
    pub reclassify_uncategorized: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            containment_threshold: 0.9,
            source_priority: vec![
                CandidateSource::LayoutModel,
                CandidateSource::EmbeddedText,
                CandidateSource::Ocr,
            ],
            table_padding: 12.0,
            reclassify_uncategorized: true,
        }
    }
}

impl MergeConfig {
    /// Set the IoU threshold.
    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Set the source priority order.
    pub fn with_source_priority(mut self, priority: Vec<CandidateSource>) -> Self {
        self.source_priority = priority;
        self
    }

    /// Set the table padding.
    pub fn with_table_padding(mut self, padding: f32) -> Self {
        self.table_padding = padding;
        self
    }

    /// Rank of a source; lower ranks win. Unlisted sources rank last.
    pub fn priority_rank(&self, source: CandidateSource) -> usize {
        self.source_priority
            .iter()
            .position(|s| *s == source)
            .unwrap_or(self.source_priority.len())
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "iou_threshold must be in (0, 1], got {}",
                self.iou_threshold
            )));
        }
        if !(self.containment_threshold > 0.0 && self.containment_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "containment_threshold must be in (0, 1], got {}",
                self.containment_threshold
            )));
        }
        if !(self.table_padding.is_finite() && self.table_padding >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "table_padding must be a non-negative number, got {}",
                self.table_padding
            )));
        }
        for (i, source) in self.source_priority.iter().enumerate() {
            if self.source_priority[..i].contains(source) {
                return Err(Error::InvalidConfig(format!(
                    "source '{}' listed twice in source_priority",
                    source.name()
                )));
            }
        }
        Ok(())
    }
}

/// Available reading order strategy types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingOrderStrategyType {
    /// Recursive XY-Cut spatial partitioning.
    ///
    /// Falls back to the original order on pages where any element lacks
    /// usable coordinates.
    #[default]
    #[serde(rename = "xycut")]
    XYCut,

    /// Keep the order elements were produced in.
    OriginalOrder,
}

/// Tunable constants of the XY-Cut algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XYCutConfig {
    /// Boxes are scaled by this factor around their top-left corner before
    /// projection.
    ///
    /// Default: 0.9
    pub shrink_factor: f32,

    /// Width of one projection bin in layout units.
    ///
    /// Default: 1.0
    pub bin_size: f32,

    /// Bins whose density is at most this value count as empty.
    ///
    /// Default: 0.0
    pub gap_density_threshold: f32,

    /// Narrowest gap (layout units) that may separate two groups.
    ///
    /// Default: 1.0
    pub min_gap_width: f32,
}

impl Default for XYCutConfig {
    fn default() -> Self {
        Self {
            shrink_factor: 0.9,
            bin_size: 1.0,
            gap_density_threshold: 0.0,
            min_gap_width: 1.0,
        }
    }
}

impl XYCutConfig {
    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.shrink_factor > 0.0 && self.shrink_factor <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "shrink_factor must be in (0, 1], got {}",
                self.shrink_factor
            )));
        }
        if !(self.bin_size.is_finite() && self.bin_size > 0.0) {
            return Err(Error::InvalidConfig(format!("bin_size must be > 0, got {}", self.bin_size)));
        }
        if !(self.gap_density_threshold.is_finite() && self.gap_density_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "gap_density_threshold must be >= 0, got {}",
                self.gap_density_threshold
            )));
        }
        if !(self.min_gap_width.is_finite() && self.min_gap_width >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min_gap_width must be >= 0, got {}",
                self.min_gap_width
            )));
        }
        Ok(())
    }
}

/// Configuration for reading order strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingOrderConfig {
    /// The reading order strategy to use.
    pub strategy: ReadingOrderStrategyType,

    /// XY-Cut parameters; ignored by other strategies.
    pub xycut: XYCutConfig,
}

impl ReadingOrderConfig {
    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        self.xycut.validate()
    }
}

/// Configuration of the hierarchy builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Categories that open a section and can be parents.
    ///
    /// Default: Title
    pub structural_categories: Vec<ElementType>,

    /// Give depth 0 to depth-less Titles on pages that also carry
    /// headline or subheadline Titles.
    ///
    /// Default: true
    pub headline_page_depth: bool,

    /// Keep a `parent_id` supplied by the source format when it points to an
    /// earlier, shallower element.
    ///
    /// Default: true
    pub preserve_upstream_parent: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            structural_categories: vec![ElementType::Title],
            headline_page_depth: true,
            preserve_upstream_parent: true,
        }
    }
}

impl HierarchyConfig {
    /// Whether elements of `category` open sections.
    pub fn is_structural(&self, category: ElementType) -> bool {
        self.structural_categories.contains(&category)
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(chunk) = self.structural_categories.iter().find(|c| c.is_chunk()) {
            return Err(Error::InvalidConfig(format!("{} cannot be a structural category", chunk)));
        }
        Ok(())
    }
}

/// Language metadata configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Languages of the whole document. Two-letter codes and common names
    /// are normalised to ISO 639-3.
    pub languages: Option<Vec<String>>,

    /// Detect languages per element instead of using the document list.
    pub detect_per_element: bool,
}

impl LanguageConfig {
    /// Use a fixed document language list.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = Some(languages);
        self
    }

    /// Detect per element.
    pub fn with_detection(mut self, detect: bool) -> Self {
        self.detect_per_element = detect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_defaults() {
        let config = MergeConfig::default();
        assert_eq!(config.iou_threshold, 0.5);
        assert_eq!(config.priority_rank(CandidateSource::LayoutModel), 0);
        assert_eq!(config.priority_rank(CandidateSource::Ocr), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_validation() {
        assert!(MergeConfig::default().with_iou_threshold(0.0).validate().is_err());
        assert!(MergeConfig::default().with_iou_threshold(1.5).validate().is_err());
        assert!(MergeConfig::default().with_table_padding(-1.0).validate().is_err());
        let dup = MergeConfig::default()
            .with_source_priority(vec![CandidateSource::Ocr, CandidateSource::Ocr]);
        assert!(dup.validate().is_err());
    }

    #[test]
    fn test_unlisted_source_ranks_last() {
        let config = MergeConfig::default().with_source_priority(vec![CandidateSource::Ocr]);
        assert_eq!(config.priority_rank(CandidateSource::Ocr), 0);
        assert_eq!(config.priority_rank(CandidateSource::LayoutModel), 1);
    }

    #[test]
    fn test_xycut_validation() {
        assert!(XYCutConfig::default().validate().is_ok());
        let bad = XYCutConfig {
            shrink_factor: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = XYCutConfig {
            bin_size: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_reading_order_serde_names() {
        let json = serde_json::to_string(&ReadingOrderStrategyType::XYCut).unwrap();
        assert_eq!(json, "\"xycut\"");
        let parsed: ReadingOrderConfig =
            serde_json::from_str(r#"{"strategy":"original_order"}"#).unwrap();
        assert_eq!(parsed.strategy, ReadingOrderStrategyType::OriginalOrder);
        assert_eq!(parsed.xycut, XYCutConfig::default());
    }

    #[test]
    fn test_hierarchy_rejects_chunk_categories() {
        let config = HierarchyConfig {
            structural_categories: vec![ElementType::CompositeElement],
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(HierarchyConfig::default().is_structural(ElementType::Title));
        assert!(!HierarchyConfig::default().is_structural(ElementType::ListItem));
    }
}
