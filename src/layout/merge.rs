//! Layout merge engine.
//!
//! Several extractors may describe the same physical region of a page: the
//! embedded text layer, a layout-detection model and OCR. The merger keeps
//! one element per region.
//!
//! # Algorithm
//!
//! 1. Normalise every candidate's label; candidates with degenerate boxes
//!    skip deduplication and are emitted without coordinates
//! 2. If the page only has OCR candidates, they are kept as they are
//! 3. Otherwise candidates are visited by (source priority, specific
//!    category first, larger area first, input position). A candidate whose
//!    IoU with an already kept one exceeds the threshold is absorbed into it:
//!    the kept element inherits missing text, a specific category in place of
//!    UncategorizedText and missing table HTML
//! 4. A candidate lying almost entirely inside a kept region of a higher
//!    priority source is absorbed too; its text fills the region when the
//!    region has none
//! 5. Remaining UncategorizedText goes through [`classify_text`]
//! 6. Output keeps the candidates' input order

use crate::elements::{CandidateSource, Element, ElementMetadata, ElementType, HeadingRole, HtmlTable};
use crate::error::Result;
use crate::geometry::{CoordinatesMetadata, Rect};
use crate::layout::candidate::{CandidateElement, DocumentInput, PageCandidates};
use crate::layout::text_classifier::classify_text;
use crate::pipeline::config::MergeConfig;
use crate::utils::safe_float_cmp;

/// External table-structure extractor.
///
/// Called once per merged Table element that has no HTML yet, with the
/// table's padded region.
pub trait TableStructureSource: Send + Sync {
    /// HTML of the table found in `region` of `page`, if any.
    fn extract_table(&self, page: &PageCandidates, region: Rect) -> Option<String>;
}

/// Counters of one page merge, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Candidates on the page
    pub candidates: usize,
    /// Elements produced
    pub elements: usize,
    /// Candidates absorbed by IoU overlap
    pub duplicates: usize,
    /// Candidates absorbed by containment
    pub contained: usize,
    /// Overlaps between candidates of equal priority
    pub conflicts: usize,
    /// Candidates whose box was degenerate
    pub invalid_geometry: usize,
}

/// A candidate on its way to becoming an element.
#[derive(Debug, Clone)]
struct Proposal {
    index: usize,
    category: ElementType,
    depth: Option<u32>,
    role: Option<HeadingRole>,
    text: String,
    rect: Option<Rect>,
    source: CandidateSource,
    rank: usize,
    confidence: Option<f32>,
    html: Option<String>,
    languages: Option<Vec<String>>,
    page_number: Option<u32>,
    contained: Vec<(Rect, String)>,
}

impl Proposal {
    fn area(&self) -> f32 {
        self.rect.map(|r| r.area()).unwrap_or(0.0)
    }

    /// Take over what `other` knows and `self` lacks.
    fn absorb(&mut self, other: Proposal) {
        if self.text.trim().is_empty() && !other.text.trim().is_empty() {
            self.text = other.text;
        }
        if !self.category.is_specific() && other.category.is_specific() {
            self.category = other.category;
            self.depth = other.depth;
            self.role = other.role;
        }
        if self.html.is_none() {
            self.html = other.html;
        }
        if self.languages.is_none() {
            self.languages = other.languages;
        }
        self.contained.extend(other.contained);
    }
}

/// Reconciles candidates from several extractors into one element set.
pub struct LayoutMerger {
    config: MergeConfig,
    table_source: Option<Box<dyn TableStructureSource>>,
}

impl LayoutMerger {
    /// Create a merger; fails on an invalid configuration.
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            table_source: None,
        })
    }

    /// Fill Table elements without HTML from `source`.
    pub fn with_table_source(mut self, source: Box<dyn TableStructureSource>) -> Self {
        self.table_source = Some(source);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge every page of a document, in page order as given.
    pub fn merge_document(&self, document: &DocumentInput) -> Vec<Element> {
        let base = document.base_metadata();
        document
            .pages
            .iter()
            .flat_map(|page| self.merge_page(page, &base))
            .collect()
    }

    /// Merge the candidates of one page.
    ///
    /// `base` supplies document-level metadata (filename, filetype, ...).
    pub fn merge_page(&self, page: &PageCandidates, base: &ElementMetadata) -> Vec<Element> {
        let (proposals, mut stats) = self.merged_proposals(page);

        let elements: Vec<Element> = proposals
            .into_iter()
            .map(|p| self.build_element(p, page, base))
            .collect();

        stats.elements = elements.len();
        log::debug!(
            "page {:?}: merged {} candidates into {} elements ({} duplicates, {} contained, {} conflicts, {} without geometry)",
            page.page_number,
            stats.candidates,
            stats.elements,
            stats.duplicates,
            stats.contained,
            stats.conflicts,
            stats.invalid_geometry
        );
        elements
    }

    /// Padded, page-clipped regions of the page's merged Table elements.
    ///
    /// These are the regions handed to a table-structure extractor.
    pub fn table_extraction_regions(&self, page: &PageCandidates) -> Vec<Rect> {
        let (proposals, _) = self.merged_proposals(page);
        proposals
            .iter()
            .filter(|p| p.category == ElementType::Table)
            .filter_map(|p| p.rect)
            .map(|r| self.table_region(r, page))
            .collect()
    }

    fn table_region(&self, rect: Rect, page: &PageCandidates) -> Rect {
        rect.pad(self.config.table_padding).clip_to(page.width, page.height)
    }

    fn merged_proposals(&self, page: &PageCandidates) -> (Vec<Proposal>, MergeStats) {
        let mut stats = MergeStats {
            candidates: page.candidates.len(),
            ..Default::default()
        };

        let proposals: Vec<Proposal> = page
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| self.proposal(index, candidate, page, &mut stats))
            .collect();

        let ocr_only = proposals.iter().all(|p| p.source == CandidateSource::Ocr);
        let mut merged = if ocr_only {
            proposals
        } else {
            self.deduplicate(proposals, &mut stats)
        };

        if self.config.reclassify_uncategorized {
            for proposal in &mut merged {
                if proposal.category == ElementType::UncategorizedText {
                    let classified = classify_text(&proposal.text);
                    proposal.category = classified.category;
                    proposal.text = classified.text;
                }
            }
        }

        (merged, stats)
    }

    fn proposal(
        &self,
        index: usize,
        candidate: &CandidateElement,
        page: &PageCandidates,
        stats: &mut MergeStats,
    ) -> Proposal {
        let normalized = candidate.category_hint.normalize();

        let rect = candidate.bbox.and_then(|bbox| {
            let rect = bbox.to_rect();
            match rect.validate() {
                Ok(()) => Some(rect),
                Err(e) => {
                    log::warn!(
                        "page {:?}: candidate {} ({}) dropped from layout analysis: {}",
                        page.page_number,
                        index,
                        candidate.source.name(),
                        e
                    );
                    stats.invalid_geometry += 1;
                    None
                },
            }
        });

        Proposal {
            index,
            category: normalized.category,
            depth: candidate.category_depth.or(normalized.depth),
            role: normalized.role,
            text: candidate.text.clone(),
            rect,
            source: candidate.source,
            rank: self.config.priority_rank(candidate.source),
            confidence: candidate.confidence,
            html: candidate.text_as_html.clone(),
            languages: candidate.languages.clone(),
            page_number: candidate.page_number.or(page.page_number),
            contained: Vec::new(),
        }
    }

    fn deduplicate(&self, proposals: Vec<Proposal>, stats: &mut MergeStats) -> Vec<Proposal> {
        let (mut ordered, without_geometry): (Vec<Proposal>, Vec<Proposal>) =
            proposals.into_iter().partition(|p| p.rect.is_some());

        ordered.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| b.category.is_specific().cmp(&a.category.is_specific()))
                .then_with(|| safe_float_cmp(b.area(), a.area()))
                .then_with(|| a.index.cmp(&b.index))
        });

        let mut kept: Vec<Proposal> = Vec::with_capacity(ordered.len());
        for proposal in ordered {
            let Some(rect) = proposal.rect else {
                continue;
            };

            let overlapping = kept
                .iter()
                .position(|k| k.rect.is_some_and(|kr| kr.iou(&rect) > self.config.iou_threshold));
            if let Some(pos) = overlapping {
                let winner = &mut kept[pos];
                if winner.rank == proposal.rank {
                    stats.conflicts += 1;
                    log::debug!(
                        "equal-priority overlap between candidates {} and {} ({}), keeping {}",
                        winner.index,
                        proposal.index,
                        proposal.source.name(),
                        winner.index
                    );
                }
                stats.duplicates += 1;
                winner.absorb(proposal);
                continue;
            }

            let container = kept.iter().position(|k| {
                k.rank < proposal.rank
                    && k.rect
                        .is_some_and(|kr| contained_fraction(&rect, &kr) >= self.config.containment_threshold)
            });
            if let Some(pos) = container {
                stats.contained += 1;
                if !proposal.text.trim().is_empty() {
                    kept[pos].contained.push((rect, proposal.text));
                }
                continue;
            }

            kept.push(proposal);
        }

        for region in &mut kept {
            fill_from_contained(region);
        }

        kept.extend(without_geometry);
        kept.sort_by_key(|p| p.index);
        kept
    }

    fn build_element(&self, proposal: Proposal, page: &PageCandidates, base: &ElementMetadata) -> Element {
        let system = page.system();
        let is_table = proposal.category.is_table();

        let mut metadata = base.clone();
        metadata.page_number = proposal.page_number;
        metadata.coordinates = proposal.rect.map(|r| CoordinatesMetadata::from_rect(r, &system));
        metadata.category_depth = proposal.depth;
        metadata.heading_role = proposal.role;
        metadata.detection_class_prob = proposal.confidence;
        metadata.detection_origin = Some(proposal.source);
        metadata.languages = proposal.languages;
        metadata.text_as_html = proposal.html.filter(|_| is_table);

        let mut text = proposal.text;
        if proposal.category == ElementType::Table && metadata.text_as_html.is_none() {
            if let (Some(source), Some(rect)) = (&self.table_source, proposal.rect) {
                let region = self.table_region(rect, page);
                if let Some(html) = source.extract_table(page, region) {
                    if text.trim().is_empty() {
                        match HtmlTable::parse(&html) {
                            Ok(table) => text = table.text(),
                            Err(e) => log::debug!("table text unavailable from extracted html: {}", e),
                        }
                    }
                    metadata.text_as_html = Some(html);
                }
            }
        }

        Element::new(proposal.category, text).with_metadata(metadata)
    }
}

/// Share of `inner`'s area that lies inside `outer`.
fn contained_fraction(inner: &Rect, outer: &Rect) -> f32 {
    let area = inner.area();
    if area <= 0.0 {
        return 0.0;
    }
    inner.intersection(outer).map(|i| i.area() / area).unwrap_or(0.0)
}

/// Give a text-less region the text of the pieces it contains, in
/// top-to-bottom, left-to-right order.
fn fill_from_contained(region: &mut Proposal) {
    let mut pieces = std::mem::take(&mut region.contained);
    if pieces.is_empty() || !region.text.trim().is_empty() {
        return;
    }
    pieces.sort_by(|(a, _), (b, _)| safe_float_cmp(a.top(), b.top()).then_with(|| safe_float_cmp(a.left(), b.left())));
    region.text = pieces
        .into_iter()
        .map(|(_, text)| text.trim().to_string())
        .collect::<Vec<_>>()
        .join(" ");
}
