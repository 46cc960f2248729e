//! Property-based tests for the structuring stages
//!
//! Checks invariants that must hold for every input: reading order is a
//! stable permutation, pages without geometry keep their order, parent
//! links are sound, and chunks respect the size cap without losing or
//! mixing content.

use element_oxide::chunking::{Chunker, ChunkingOptions};
use element_oxide::elements::{assign_ids, Element, ElementType, IdMode};
use element_oxide::geometry::{CoordinateSystem, Rect};
use element_oxide::pipeline::{ReadingOrderContext, ReadingOrderSource, ReadingOrderStrategy, XYCutStrategy};
use element_oxide::structure::{validate_hierarchy, HierarchyBuilder};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

// Non-degenerate boxes on a 1000x1000 page
prop_compose! {
    fn rect_strategy()(
        x in 0.0..900.0f32,
        y in 0.0..900.0f32,
        width in 1.0..100.0f32,
        height in 1.0..100.0f32
    ) -> Rect {
        Rect::new(x, y, width, height)
    }
}

// Lowercase words separated by single spaces
prop_compose! {
    fn words_strategy(max_words: usize)(
        words in prop::collection::vec("[a-z]{1,12}", 1..max_words)
    ) -> String {
        words.join(" ")
    }
}

// A heading or body element, either of them with or without a depth
fn hierarchy_element() -> impl Strategy<Value = Element> {
    let category = prop_oneof![
        Just(ElementType::Title),
        Just(ElementType::Title),
        Just(ElementType::NarrativeText),
        Just(ElementType::ListItem),
        Just(ElementType::Table),
    ];
    (category, prop::option::of(0u32..4)).prop_map(|(category, depth)| {
        let element = Element::new(category, "content");
        match depth {
            Some(depth) => element.with_category_depth(depth),
            None => element,
        }
    })
}

// HTML table with uppercase cell text
prop_compose! {
    fn table_strategy()(
        rows in prop::collection::vec(prop::collection::vec("[A-Z]{0,30}", 1..5), 1..12)
    ) -> Element {
        let mut html = String::from("<table>");
        let mut texts = Vec::new();
        for row in &rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", cell));
                if !cell.is_empty() {
                    texts.push(cell.clone());
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");
        Element::table(texts.join(" "), html)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn page_system() -> CoordinateSystem {
    CoordinateSystem::pixel_space(1000.0, 1000.0)
}

fn non_whitespace(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

fn is_permutation(order: &[usize], n: usize) -> bool {
    let mut sorted = order.to_vec();
    sorted.sort_unstable();
    sorted == (0..n).collect::<Vec<_>>()
}

// ============================================================================
// Reading order
// ============================================================================

proptest! {
    #[test]
    fn test_xycut_order_is_a_permutation(boxes in prop::collection::vec(rect_strategy(), 0..30)) {
        let order = XYCutStrategy::new().order_indices(&boxes);
        prop_assert!(is_permutation(&order, boxes.len()));
    }

    #[test]
    fn test_xycut_is_idempotent(boxes in prop::collection::vec(rect_strategy(), 1..30)) {
        let strategy = XYCutStrategy::new();
        let order = strategy.order_indices(&boxes);
        let reordered: Vec<Rect> = order.iter().map(|&i| boxes[i]).collect();

        let again = strategy.order_indices(&reordered);
        prop_assert_eq!(again, (0..boxes.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_geometry_falls_back_to_input_order(
        boxes in prop::collection::vec(prop::option::of(rect_strategy()), 1..20)
    ) {
        prop_assume!(boxes.iter().any(|b| b.is_none()));

        let elements: Vec<Element> = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let element = Element::new(ElementType::NarrativeText, format!("e{}", i)).with_page_number(1);
                match b {
                    Some(rect) => element.with_bbox(*rect, &page_system()),
                    None => element,
                }
            })
            .collect();

        let ordered = XYCutStrategy::new()
            .apply(elements, &ReadingOrderContext::new().with_page(Some(1)))
            .unwrap();

        prop_assert_eq!(ordered.len(), boxes.len());
        for (position, item) in ordered.iter().enumerate() {
            prop_assert_eq!(item.reading_order, position);
            prop_assert_eq!(&item.element.text, &format!("e{}", position));
            prop_assert_eq!(item.source(), ReadingOrderSource::Fallback);
        }
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

proptest! {
    #[test]
    fn test_parent_links_are_sound(mut elements in prop::collection::vec(hierarchy_element(), 0..40)) {
        assign_ids(&mut elements, IdMode::Hash);
        let builder = HierarchyBuilder::default();
        builder.normalize_depths(&mut elements);
        let parents = builder.build(&mut elements);

        prop_assert_eq!(parents.len(), elements.len());
        for (child, parent) in parents.iter().enumerate() {
            if let Some(parent) = parent {
                prop_assert!(*parent < child);
                prop_assert_eq!(elements[*parent].category, ElementType::Title);
                if let (Some(parent_depth), Some(child_depth)) =
                    (elements[*parent].metadata.category_depth, elements[child].metadata.category_depth)
                {
                    prop_assert!(parent_depth < child_depth);
                }
            }
        }
        prop_assert!(validate_hierarchy(&elements).is_empty());
    }
}

// ============================================================================
// Chunking
// ============================================================================

proptest! {
    #[test]
    fn test_chunks_respect_the_cap_and_keep_content(
        texts in prop::collection::vec(words_strategy(60), 1..15),
        max in 20usize..200,
        by_title in any::<bool>()
    ) {
        let elements: Vec<Element> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let category = if i % 4 == 0 { ElementType::Title } else { ElementType::NarrativeText };
                Element::new(category, t.clone())
            })
            .collect();
        let options = if by_title {
            ChunkingOptions::by_title(max)
        } else {
            ChunkingOptions::basic(max)
        };

        let chunks = Chunker::new(options).unwrap().chunk(&elements);

        for chunk in &chunks {
            prop_assert!(chunk.text_len() <= max, "{} > {}", chunk.text_len(), max);
            prop_assert_eq!(chunk.category, ElementType::CompositeElement);
        }
        let before: usize = elements.iter().map(|e| non_whitespace(&e.text)).sum();
        let after: usize = chunks.iter().map(|c| non_whitespace(&c.text)).sum();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn test_tables_are_never_mixed_with_text(
        table in table_strategy(),
        before in words_strategy(20),
        after in words_strategy(20),
        max in 40usize..400
    ) {
        let elements = vec![
            Element::new(ElementType::NarrativeText, before.clone()),
            table.clone(),
            Element::new(ElementType::NarrativeText, after.clone()),
        ];
        let chunks = Chunker::new(ChunkingOptions::by_title(max)).unwrap().chunk(&elements);

        let mut table_text = 0;
        for chunk in &chunks {
            prop_assert!(chunk.text_len() <= max);
            match chunk.category {
                ElementType::CompositeElement => {
                    // table cells are uppercase, paragraphs lowercase
                    prop_assert!(!chunk.text.chars().any(|c| c.is_ascii_uppercase()));
                    prop_assert!(chunk.text_as_html().is_none());
                },
                ElementType::Table | ElementType::TableChunk => {
                    prop_assert!(!chunk.text.chars().any(|c| c.is_ascii_lowercase()));
                    if let Some(html) = chunk.text_as_html() {
                        prop_assert!(html.chars().count() <= max);
                        prop_assert_eq!(html.matches("<tr>").count(), html.matches("</tr>").count());
                    }
                    table_text += non_whitespace(&chunk.text);
                },
                other => prop_assert!(false, "unexpected chunk category {}", other),
            }
        }
        prop_assert_eq!(table_text, non_whitespace(&table.text));
    }
}
