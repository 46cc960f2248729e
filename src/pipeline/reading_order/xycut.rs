//! XY-Cut recursive spatial partitioning for multi-column layouts.
//!
//! Uses projection profiles to find empty gutters between groups of
//! elements, without any semantic heuristics.
//!
//! # Algorithm Overview
//!
//! 1. Shrink every box around its top-left corner (default 90%) so that
//!    touching neighbours gain separation
//! 2. Project the boxes onto the X axis; the first empty run of bins between
//!    occupied bins is a vertical cut, the left group is read first
//! 3. Otherwise project onto the Y axis; the top group is read first
//! 4. Recurse into both groups
//! 5. Base case: a group with no cut is read by (x ascending, y ascending)
//!
//! The column-first base case keeps a right-hand column from interleaving
//! with a left-hand column whose row bands overlap it.
//!
//! # Performance
//!
//! Projection cost is linear in the covered bins; the bin count of one
//! projection is capped, so huge coordinate ranges coarsen the bins instead
//! of allocating without bound.

use super::{ReadingOrderContext, ReadingOrderStrategy};
use crate::elements::{Element, ElementType};
use crate::error::Result;
use crate::geometry::Rect;
use crate::pipeline::config::XYCutConfig;
use crate::pipeline::{OrderedElement, ReadingOrderInfo};
use crate::utils::safe_float_cmp;

/// Upper bound on the number of bins of one projection profile.
const MAX_BINS: usize = 100_000;

/// Projection axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Profile along X; gaps are vertical cuts
    X,
    /// Profile along Y; gaps are horizontal cuts
    Y,
}

impl Axis {
    /// (start, end) along the axis and the extent across it.
    fn project(&self, rect: &Rect) -> (f32, f32, f32) {
        match self {
            Axis::X => (rect.left(), rect.right(), rect.height),
            Axis::Y => (rect.top(), rect.bottom(), rect.width),
        }
    }
}

/// XY-Cut recursive spatial partitioning strategy.
///
/// Runs only on pages where every element has usable coordinates; any other
/// page keeps its original order.
#[derive(Debug, Clone, Default)]
pub struct XYCutStrategy {
    config: XYCutConfig,
}

impl XYCutStrategy {
    /// Create a new XY-Cut strategy with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with explicit parameters.
    pub fn with_config(config: XYCutConfig) -> Self {
        Self { config }
    }

    /// The parameters in use.
    pub fn config(&self) -> &XYCutConfig {
        &self.config
    }

    /// Reading order of `boxes`, as indices into the slice.
    ///
    /// Every box must be non-degenerate.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::geometry::Rect;
    /// use element_oxide::pipeline::XYCutStrategy;
    ///
    /// let boxes = [
    ///     Rect::from_points(0.0, 25.0, 100.0, 100.0), // body
    ///     Rect::from_points(0.0, 0.0, 100.0, 20.0),   // heading
    /// ];
    /// assert_eq!(XYCutStrategy::new().order_indices(&boxes), vec![1, 0]);
    /// ```
    pub fn order_indices(&self, boxes: &[Rect]) -> Vec<usize> {
        let shrunk: Vec<(usize, Rect)> = boxes
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.shrink_top_left(self.config.shrink_factor)))
            .collect();

        let mut order = Vec::with_capacity(boxes.len());
        self.partition_region(shrunk, &mut order);
        order
    }

    /// Core recursive partitioning algorithm.
    fn partition_region(&self, items: Vec<(usize, Rect)>, out: &mut Vec<usize>) {
        if items.len() <= 1 {
            out.extend(items.iter().map(|(i, _)| *i));
            return;
        }

        for axis in [Axis::X, Axis::Y] {
            if let Some((before, after)) = self.find_cut(&items, axis) {
                log::trace!("xycut: {:?} cut {} | {} boxes", axis, before.len(), after.len());
                self.partition_region(before, out);
                self.partition_region(after, out);
                return;
            }
        }

        out.extend(self.sort_leaf(items));
    }

    /// Split `items` in two at the first gap of the projection along `axis`.
    ///
    /// Returns `None` unless both sides are non-empty.
    fn find_cut(&self, items: &[(usize, Rect)], axis: Axis) -> Option<(Vec<(usize, Rect)>, Vec<(usize, Rect)>)> {
        let profile = self.projection(items, axis)?;
        let cut = self.find_gap(&profile)?;

        let mut before = Vec::new();
        let mut after = Vec::new();
        for (item, start_bin) in items.iter().zip(&profile.start_bins) {
            if *start_bin < cut {
                before.push(*item);
            } else {
                after.push(*item);
            }
        }

        if before.is_empty() || after.is_empty() {
            return None;
        }
        Some((before, after))
    }

    /// Accumulate box extents into bins along `axis`.
    fn projection(&self, items: &[(usize, Rect)], axis: Axis) -> Option<ProjectionProfile> {
        let mut lo = f32::MAX;
        let mut hi = f32::MIN;
        for (_, rect) in items {
            let (start, end, _) = axis.project(rect);
            lo = lo.min(start);
            hi = hi.max(end);
        }

        let span = hi - lo;
        if !(span.is_finite() && span > 0.0) {
            return None;
        }

        let mut bin_size = self.config.bin_size;
        if span / bin_size > MAX_BINS as f32 {
            bin_size = span / MAX_BINS as f32;
        }
        let bin_count = ((span / bin_size).ceil() as usize).max(1);

        let mut density = vec![0.0f32; bin_count];
        let mut start_bins = Vec::with_capacity(items.len());
        for (_, rect) in items {
            let (start, end, weight) = axis.project(rect);
            let first = (((start - lo) / bin_size).floor() as usize).min(bin_count - 1);
            let last = (((end - lo) / bin_size).ceil() as usize).clamp(first + 1, bin_count);
            for bin in &mut density[first..last] {
                *bin += weight;
            }
            start_bins.push(first);
        }

        Some(ProjectionProfile {
            density,
            start_bins,
            bin_size,
        })
    }

    /// First bin of the first qualifying gap.
    ///
    /// A gap is a run of bins at or below the density threshold that lies
    /// strictly between occupied bins and is at least `min_gap_width` wide.
    fn find_gap(&self, profile: &ProjectionProfile) -> Option<usize> {
        let mut run_start: Option<usize> = None;

        for (i, &density) in profile.density.iter().enumerate() {
            if density <= self.config.gap_density_threshold {
                if run_start.is_none() {
                    run_start = Some(i);
                }
            } else if let Some(start) = run_start.take() {
                let width = (i - start) as f32 * profile.bin_size;
                if start > 0 && width >= self.config.min_gap_width {
                    return Some(start);
                }
            }
        }

        None
    }

    /// Order a group with no cut: x ascending, then y ascending.
    fn sort_leaf(&self, mut items: Vec<(usize, Rect)>) -> Vec<usize> {
        items.sort_by(|(ia, a), (ib, b)| {
            safe_float_cmp(a.left(), b.left())
                .then_with(|| safe_float_cmp(a.top(), b.top()))
                .then_with(|| ia.cmp(ib))
        });
        items.into_iter().map(|(i, _)| i).collect()
    }
}

/// Internal projection profile representation.
struct ProjectionProfile {
    /// Accumulated cross-axis extent per bin
    density: Vec<f32>,
    /// First bin of each item, parallel to the input
    start_bins: Vec<usize>,
    /// Effective bin width
    bin_size: f32,
}

impl ReadingOrderStrategy for XYCutStrategy {
    fn apply(&self, elements: Vec<Element>, context: &ReadingOrderContext) -> Result<Vec<OrderedElement>> {
        // page breaks carry no geometry; they close the page
        let (breaks, elements): (Vec<Element>, Vec<Element>) = elements
            .into_iter()
            .partition(|e| e.category == ElementType::PageBreak);

        let boxes: Vec<Option<Rect>> = elements.iter().map(|e| e.layout_bbox()).collect();
        let missing = boxes.iter().filter(|b| b.is_none()).count();

        let (order, info) = if missing == 0 {
            let boxes: Vec<Rect> = boxes.into_iter().flatten().collect();
            (self.order_indices(&boxes), ReadingOrderInfo::xycut())
        } else {
            if missing < elements.len() {
                log::warn!(
                    "page {:?}: {} of {} elements lack usable coordinates, keeping original order",
                    context.page_number,
                    missing,
                    elements.len()
                );
            } else {
                log::debug!("page {:?}: no coordinates, keeping original order", context.page_number);
            }
            ((0..elements.len()).collect(), ReadingOrderInfo::fallback())
        };

        let mut slots: Vec<Option<Element>> = elements.into_iter().map(Some).collect();
        let mut ordered: Vec<OrderedElement> = Vec::with_capacity(slots.len() + breaks.len());
        for index in order {
            if let Some(element) = slots[index].take() {
                let position = ordered.len();
                ordered.push(OrderedElement::with_info(element, position, info));
            }
        }
        for element in breaks {
            let position = ordered.len();
            ordered.push(OrderedElement::with_info(element, position, ReadingOrderInfo::original()));
        }

        Ok(ordered)
    }

    fn name(&self) -> &'static str {
        "XYCutStrategy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CoordinateSystem;
    use crate::pipeline::ReadingOrderSource;

    fn make_element(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Element {
        let system = CoordinateSystem::pixel_space(1000.0, 1000.0);
        Element::new(ElementType::NarrativeText, text)
            .with_page_number(1)
            .with_bbox(Rect::from_points(x0, y0, x1, y1), &system)
    }

    fn texts(ordered: &[OrderedElement]) -> Vec<&str> {
        ordered.iter().map(|o| o.element.text.as_str()).collect()
    }

    fn apply(elements: Vec<Element>) -> Vec<OrderedElement> {
        XYCutStrategy::new()
            .apply(elements, &ReadingOrderContext::new())
            .unwrap()
    }

    #[test]
    fn test_heading_above_body() {
        let ordered = apply(vec![
            make_element("Body", 0.0, 25.0, 100.0, 100.0),
            make_element("Intro", 0.0, 0.0, 100.0, 20.0),
        ]);
        assert_eq!(texts(&ordered), vec!["Intro", "Body"]);
        assert!(ordered.iter().all(|o| o.source() == ReadingOrderSource::XYCut));
    }

    #[test]
    fn test_same_row_reads_left_to_right() {
        let ordered = apply(vec![
            make_element("Right", 150.0, 0.0, 250.0, 20.0),
            make_element("Left", 0.0, 0.0, 100.0, 20.0),
        ]);
        assert_eq!(texts(&ordered), vec!["Left", "Right"]);
    }

    #[test]
    fn test_two_columns_under_full_width_title() {
        let ordered = apply(vec![
            make_element("R1", 110.0, 30.0, 200.0, 60.0),
            make_element("L2", 0.0, 70.0, 90.0, 100.0),
            make_element("Title", 0.0, 0.0, 200.0, 20.0),
            make_element("R2", 110.0, 70.0, 200.0, 100.0),
            make_element("L1", 0.0, 30.0, 90.0, 60.0),
        ]);
        assert_eq!(texts(&ordered), vec!["Title", "L1", "L2", "R1", "R2"]);
    }

    #[test]
    fn test_overlapping_rows_read_column_first() {
        // no cut exists: the two boxes overlap on both axes after shrinking
        let ordered = apply(vec![
            make_element("second", 50.0, 0.0, 150.0, 40.0),
            make_element("first", 0.0, 10.0, 100.0, 50.0),
        ]);
        assert_eq!(texts(&ordered), vec!["first", "second"]);
    }

    #[test]
    fn test_touching_boxes_separated_by_shrink() {
        // stacked boxes sharing an edge: the 90% shrink opens a 2px gap
        let ordered = apply(vec![
            make_element("lower", 0.0, 20.0, 100.0, 40.0),
            make_element("upper", 10.0, 0.0, 100.0, 20.0),
        ]);
        assert_eq!(texts(&ordered), vec!["upper", "lower"]);
    }

    #[test]
    fn test_missing_coordinates_fall_back_to_input_order() {
        let ordered = apply(vec![
            make_element("Body", 0.0, 25.0, 100.0, 100.0),
            Element::new(ElementType::Title, "no-box").with_page_number(1),
            make_element("Intro", 0.0, 0.0, 100.0, 20.0),
        ]);
        assert_eq!(texts(&ordered), vec!["Body", "no-box", "Intro"]);
        assert!(ordered.iter().all(|o| o.source() == ReadingOrderSource::Fallback));
    }

    #[test]
    fn test_degenerate_box_falls_back() {
        let ordered = apply(vec![
            make_element("Body", 0.0, 25.0, 100.0, 100.0),
            make_element("flat", 0.0, 0.0, 100.0, 0.0),
        ]);
        assert_eq!(texts(&ordered), vec!["Body", "flat"]);
    }

    #[test]
    fn test_page_breaks_close_the_page() {
        let ordered = apply(vec![
            Element::page_break().with_page_number(1),
            make_element("Body", 0.0, 25.0, 100.0, 100.0),
            make_element("Intro", 0.0, 0.0, 100.0, 20.0),
        ]);
        assert_eq!(texts(&ordered), vec!["Intro", "Body", ""]);
        assert_eq!(ordered[0].source(), ReadingOrderSource::XYCut);
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let first = apply(vec![
            make_element("c", 300.0, 0.0, 400.0, 20.0),
            make_element("a", 0.0, 0.0, 100.0, 20.0),
            make_element("d", 0.0, 200.0, 400.0, 220.0),
            make_element("b", 150.0, 5.0, 250.0, 25.0),
        ]);
        let elements: Vec<Element> = first.iter().map(|o| o.element.clone()).collect();
        let second = apply(elements);
        assert_eq!(texts(&first), texts(&second));
    }

    #[test]
    fn test_huge_extent_is_binned_coarsely() {
        let strategy = XYCutStrategy::new();
        let boxes = [
            Rect::from_points(9.0e8, 0.0, 1.0e9, 10.0),
            Rect::from_points(0.0, 0.0, 1.0e6, 10.0),
        ];
        assert_eq!(strategy.order_indices(&boxes), vec![1, 0]);
    }

    #[test]
    fn test_narrow_gap_below_minimum_is_ignored() {
        let strategy = XYCutStrategy::with_config(XYCutConfig {
            min_gap_width: 50.0,
            ..Default::default()
        });
        // 10px horizontal gutter is too narrow; the vertical order decides
        let boxes = [
            Rect::from_points(110.0, 0.0, 200.0, 20.0),
            Rect::from_points(0.0, 100.0, 100.0, 120.0),
        ];
        assert_eq!(strategy.order_indices(&boxes), vec![0, 1]);
    }

    #[test]
    fn test_find_gap_ignores_edges() {
        let strategy = XYCutStrategy::new();
        let profile = ProjectionProfile {
            density: vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 2.0],
            start_bins: Vec::new(),
            bin_size: 1.0,
        };
        assert_eq!(strategy.find_gap(&profile), Some(2));

        let edges_only = ProjectionProfile {
            density: vec![0.0, 1.0, 1.0, 0.0],
            start_bins: Vec::new(),
            bin_size: 1.0,
        };
        assert_eq!(strategy.find_gap(&edges_only), None);
    }

    #[test]
    fn test_three_columns() {
        let ordered = apply(vec![
            make_element("c3", 260.0, 0.0, 340.0, 50.0),
            make_element("c1", 0.0, 0.0, 80.0, 50.0),
            make_element("c2", 130.0, 0.0, 210.0, 50.0),
        ]);
        assert_eq!(texts(&ordered), vec!["c1", "c2", "c3"]);
    }
}
