//! Integration tests for reading order.
//!
//! Covers XY-Cut ordering of single and multi-column pages, the original
//! order strategy, per-page fallback and document-wide page stitching.

use element_oxide::elements::{Element, ElementType};
use element_oxide::geometry::{CoordinateSystem, CoordinatesMetadata, Point, Rect};
use element_oxide::pipeline::{
    create_strategy, order_document, OriginalOrderStrategy, ReadingOrderConfig, ReadingOrderContext,
    ReadingOrderSource, ReadingOrderStrategy, ReadingOrderStrategyType, XYCutStrategy,
};
use element_oxide::{StructuringConfig, StructuringPipeline};

// ============================================================================
// Helpers
// ============================================================================

fn pixel_page() -> CoordinateSystem {
    CoordinateSystem::pixel_space(1000.0, 1000.0)
}

fn boxed(category: ElementType, text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Element {
    Element::new(category, text)
        .with_page_number(1)
        .with_bbox(Rect::from_points(x0, y0, x1, y1), &pixel_page())
}

fn text(label: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Element {
    boxed(ElementType::NarrativeText, label, x0, y0, x1, y1)
}

fn texts(elements: &[Element]) -> Vec<&str> {
    elements.iter().map(|e| e.text.as_str()).collect()
}

fn structure(elements: Vec<Element>) -> Vec<Element> {
    let pipeline = StructuringPipeline::new(StructuringConfig::default()).unwrap();
    pipeline.structure_elements(elements).unwrap().elements
}

// ============================================================================
// XY-Cut
// ============================================================================

#[test]
fn test_title_read_before_body_below_it() {
    let system = pixel_page();
    let mut title = Element::new(ElementType::Title, "Intro").with_page_number(1);
    title.metadata.coordinates = Some(CoordinatesMetadata::new(
        [
            Point::new(0.0, 0.0),
            Point::new(0.0, 20.0),
            Point::new(100.0, 20.0),
            Point::new(100.0, 0.0),
        ],
        &system,
    ));
    let body = boxed(ElementType::NarrativeText, "Body", 0.0, 25.0, 100.0, 100.0);

    let elements = structure(vec![body, title]);
    assert_eq!(texts(&elements), vec!["Intro", "Body"]);
}

#[test]
fn test_side_by_side_boxes_read_left_to_right() {
    let elements = structure(vec![
        text("Right", 150.0, 0.0, 250.0, 20.0),
        text("Left", 0.0, 0.0, 100.0, 20.0),
    ]);
    assert_eq!(texts(&elements), vec!["Left", "Right"]);
}

#[test]
fn test_two_column_article() {
    // full-width title over two columns of three paragraphs
    let mut elements = vec![boxed(ElementType::Title, "Title", 50.0, 40.0, 950.0, 80.0)];
    for row in 0..3 {
        let y0 = 120.0 + row as f32 * 100.0;
        elements.push(text(&format!("L{}", row + 1), 50.0, y0, 480.0, y0 + 80.0));
        elements.push(text(&format!("R{}", row + 1), 520.0, y0, 950.0, y0 + 80.0));
    }
    elements.reverse();

    let ordered = structure(elements);
    assert_eq!(
        texts(&ordered),
        vec!["Title", "L1", "L2", "L3", "R1", "R2", "R3"]
    );
}

#[test]
fn test_cartesian_coordinates_are_flipped_before_ordering() {
    // y grows upward: the box with the larger y is nearer the top
    let system = CoordinateSystem::point_space(612.0, 792.0);
    let upper = Element::new(ElementType::NarrativeText, "upper")
        .with_page_number(1)
        .with_bbox(Rect::from_points(72.0, 700.0, 540.0, 740.0), &system);
    let lower = Element::new(ElementType::NarrativeText, "lower")
        .with_page_number(1)
        .with_bbox(Rect::from_points(72.0, 100.0, 540.0, 140.0), &system);

    let elements = structure(vec![lower, upper]);
    assert_eq!(texts(&elements), vec!["upper", "lower"]);
}

#[test]
fn test_xycut_reports_its_source() {
    let ordered = XYCutStrategy::new()
        .apply(
            vec![text("b", 0.0, 50.0, 100.0, 70.0), text("a", 0.0, 0.0, 100.0, 20.0)],
            &ReadingOrderContext::new().with_page(Some(1)),
        )
        .unwrap();

    let orders: Vec<usize> = ordered.iter().map(|o| o.reading_order).collect();
    assert_eq!(orders, vec![0, 1]);
    assert!(ordered.iter().all(|o| o.source() == ReadingOrderSource::XYCut));
    assert!((ordered[0].confidence() - 0.90).abs() < f32::EPSILON);
}

// ============================================================================
// Fallback and original order
// ============================================================================

#[test]
fn test_page_without_geometry_keeps_input_order() {
    let pipeline = StructuringPipeline::new(StructuringConfig::default()).unwrap();
    let processed = pipeline
        .structure_elements(vec![
            text("Body", 0.0, 25.0, 100.0, 100.0),
            Element::new(ElementType::NarrativeText, "no coordinates").with_page_number(1),
            text("Intro", 0.0, 0.0, 100.0, 20.0),
        ])
        .unwrap();

    assert_eq!(texts(&processed.elements), vec!["Body", "no coordinates", "Intro"]);
    assert!(processed
        .order_info
        .iter()
        .all(|info| info.source == ReadingOrderSource::Fallback));
}

#[test]
fn test_fallback_is_per_page() {
    let page_two = Element::new(ElementType::NarrativeText, "p2 unboxed").with_page_number(2);
    let pipeline = StructuringPipeline::new(StructuringConfig::default()).unwrap();
    let processed = pipeline
        .structure_elements(vec![
            page_two,
            text("p1 second", 0.0, 50.0, 100.0, 70.0),
            text("p1 first", 0.0, 0.0, 100.0, 20.0),
        ])
        .unwrap();

    assert_eq!(texts(&processed.elements), vec!["p1 first", "p1 second", "p2 unboxed"]);
    let sources: Vec<ReadingOrderSource> = processed.order_info.iter().map(|i| i.source).collect();
    assert_eq!(
        sources,
        vec![
            ReadingOrderSource::XYCut,
            ReadingOrderSource::XYCut,
            ReadingOrderSource::Fallback
        ]
    );
}

#[test]
fn test_original_order_strategy_keeps_sequence() {
    let config = StructuringConfig::default().with_reading_order(ReadingOrderConfig {
        strategy: ReadingOrderStrategyType::OriginalOrder,
        ..Default::default()
    });
    let pipeline = StructuringPipeline::new(config).unwrap();
    let processed = pipeline
        .structure_elements(vec![
            text("Body", 0.0, 25.0, 100.0, 100.0),
            text("Intro", 0.0, 0.0, 100.0, 20.0),
        ])
        .unwrap();

    assert_eq!(texts(&processed.elements), vec!["Body", "Intro"]);
    assert!(processed
        .order_info
        .iter()
        .all(|info| info.source == ReadingOrderSource::OriginalOrder && info.confidence == 1.0));
}

#[test]
fn test_order_document_stitches_pages_in_ascending_order() {
    let strategy = OriginalOrderStrategy;
    let elements = vec![
        Element::new(ElementType::NarrativeText, "page 3").with_page_number(3),
        Element::new(ElementType::NarrativeText, "page 1").with_page_number(1),
        Element::new(ElementType::NarrativeText, "no page"),
        Element::new(ElementType::NarrativeText, "page 1 again").with_page_number(1),
    ];

    let ordered = order_document(&strategy, elements).unwrap();
    let labels: Vec<&str> = ordered.iter().map(|o| o.element.text.as_str()).collect();
    assert_eq!(labels, vec!["no page", "page 1", "page 1 again", "page 3"]);
    let orders: Vec<usize> = ordered.iter().map(|o| o.reading_order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
}

#[test]
fn test_strategy_from_config() {
    let strategy = create_strategy(&ReadingOrderConfig::default());
    assert_eq!(strategy.name(), "XYCutStrategy");
}

#[test]
fn test_ordering_is_deterministic() {
    let build = || {
        vec![
            text("c", 300.0, 0.0, 400.0, 20.0),
            text("a", 0.0, 0.0, 100.0, 20.0),
            text("d", 0.0, 200.0, 400.0, 220.0),
            text("b", 150.0, 5.0, 250.0, 25.0),
        ]
    };
    let first = structure(build());
    let second = structure(build());
    assert_eq!(first, second);
}
