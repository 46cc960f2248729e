//! Depth-stack hierarchy builder.
//!
//! Annotates an ordered element stream with `category_depth` and
//! `parent_id` in one left-to-right pass.

use std::collections::{BTreeMap, HashMap};

use crate::elements::{Element, ElementId, ElementType};
use crate::error::Result;
use crate::pipeline::config::HierarchyConfig;

/// Position of an element in the section tree.
///
/// Only structural elements can be parents. When parent and child both
/// carry a `category_depth`, the parent's must be strictly smaller. Without
/// both depths, structural elements rank by depth (missing counts as 0) and
/// every other element ranks below all structural ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyRank {
    structural: bool,
    depth: Option<u32>,
}

impl HierarchyRank {
    /// Rank of `element` under `config`.
    pub fn of(element: &Element, config: &HierarchyConfig) -> Self {
        Self {
            structural: config.is_structural(element.category),
            depth: element.metadata.category_depth,
        }
    }

    /// Whether the element can be a parent.
    pub fn is_structural(&self) -> bool {
        self.structural
    }

    /// Whether an element of this rank may be the parent of `child`.
    pub fn outranks(&self, child: &HierarchyRank) -> bool {
        if !self.structural {
            return false;
        }
        match (self.depth, child.depth) {
            (Some(parent), Some(child)) => parent < child,
            _ => !child.structural || self.depth.unwrap_or(0) < child.depth.unwrap_or(0),
        }
    }
}

/// An open section on the depth stack.
#[derive(Debug, Clone, Copy)]
struct OpenSection {
    rank: HierarchyRank,
    index: usize,
}

/// Assigns depths and parents to an ordered element stream.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    config: HierarchyConfig,
}

impl HierarchyBuilder {
    /// Create a builder; fails on an invalid configuration.
    pub fn new(config: HierarchyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Make heading depths comparable within each page.
    ///
    /// Titles normalised from headline labels carry their role's depth. On a
    /// page holding such Titles, every other depth-less Title gets depth 0.
    /// Depths supplied by the source format are never changed.
    pub fn normalize_depths(&self, elements: &mut [Element]) {
        for element in elements.iter_mut() {
            if element.category == ElementType::Title && element.metadata.category_depth.is_none() {
                if let Some(role) = element.metadata.heading_role {
                    element.metadata.category_depth = Some(role.depth());
                }
            }
        }

        if !self.config.headline_page_depth {
            return;
        }

        let mut pages: BTreeMap<Option<u32>, bool> = BTreeMap::new();
        for element in elements.iter() {
            let has_role = element.category == ElementType::Title && element.metadata.heading_role.is_some();
            *pages.entry(element.metadata.page_number).or_insert(false) |= has_role;
        }

        for element in elements.iter_mut() {
            let headline_page = pages.get(&element.metadata.page_number).copied().unwrap_or(false);
            if headline_page && element.category == ElementType::Title && element.metadata.category_depth.is_none() {
                element.metadata.category_depth = Some(0);
            }
        }
    }

    /// Set `parent_id` on every element and return the parent indices.
    ///
    /// Elements must carry their final ids. A parent always precedes its
    /// child and outranks it (see [`HierarchyRank::outranks`]).
    pub fn build(&self, elements: &mut [Element]) -> Vec<Option<usize>> {
        let mut stack: Vec<OpenSection> = Vec::new();
        let mut seen: HashMap<ElementId, usize> = HashMap::new();
        let mut parents = Vec::with_capacity(elements.len());

        for index in 0..elements.len() {
            let rank = HierarchyRank::of(&elements[index], &self.config);

            while let Some(top) = stack.last() {
                if top.rank.outranks(&rank) {
                    break;
                }
                log::trace!("element {}: closing section opened by element {}", index, top.index);
                stack.pop();
            }

            let upstream = if self.config.preserve_upstream_parent {
                self.upstream_parent(elements, index, rank, &seen)
            } else {
                None
            };

            let parent = upstream.or_else(|| stack.last().map(|s| s.index));
            elements[index].metadata.parent_id = parent.map(|p| elements[p].id.clone());
            parents.push(parent);

            if rank.is_structural() {
                stack.push(OpenSection { rank, index });
            }
            seen.insert(elements[index].id.clone(), index);
        }

        parents
    }

    /// A parent supplied by the source format, if it is still valid.
    fn upstream_parent(
        &self,
        elements: &[Element],
        index: usize,
        rank: HierarchyRank,
        seen: &HashMap<ElementId, usize>,
    ) -> Option<usize> {
        let parent_id = elements[index].metadata.parent_id.as_ref()?;
        let parent = *seen.get(parent_id)?;
        if HierarchyRank::of(&elements[parent], &self.config).outranks(&rank) {
            Some(parent)
        } else {
            log::debug!(
                "element {}: ignoring upstream parent {} that does not rank above it",
                index,
                parent_id
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{assign_ids, HeadingRole, IdMode};

    fn build(mut elements: Vec<Element>) -> (Vec<Element>, Vec<Option<usize>>) {
        assign_ids(&mut elements, IdMode::Hash);
        let parents = HierarchyBuilder::default().build(&mut elements);
        (elements, parents)
    }

    #[test]
    fn test_flat_sections() {
        let (elements, parents) = build(vec![
            Element::new(ElementType::Title, "One"),
            Element::new(ElementType::NarrativeText, "a"),
            Element::new(ElementType::Title, "Two"),
            Element::new(ElementType::NarrativeText, "b"),
        ]);
        assert_eq!(parents, vec![None, Some(0), None, Some(2)]);
        assert_eq!(elements[3].metadata.parent_id, Some(elements[2].id.clone()));
    }

    #[test]
    fn test_nested_headings() {
        let (_, parents) = build(vec![
            Element::new(ElementType::Title, "Chapter").with_category_depth(0),
            Element::new(ElementType::Title, "Section").with_category_depth(1),
            Element::new(ElementType::NarrativeText, "text"),
            Element::new(ElementType::Title, "Section 2").with_category_depth(1),
            Element::new(ElementType::Title, "Chapter 2").with_category_depth(0),
            Element::new(ElementType::ListItem, "item"),
        ]);
        assert_eq!(parents, vec![None, Some(0), Some(1), Some(0), None, Some(4)]);
    }

    #[test]
    fn test_body_depth_closes_deeper_sections() {
        let (elements, parents) = build(vec![
            Element::new(ElementType::Title, "Section").with_category_depth(1),
            Element::new(ElementType::ListItem, "top-level item").with_category_depth(0),
            Element::new(ElementType::NarrativeText, "after the list"),
        ]);
        assert_eq!(parents, vec![None, None, None]);
        assert!(elements[1].metadata.parent_id.is_none());
    }

    #[test]
    fn test_body_depth_below_heading_keeps_parent() {
        let (_, parents) = build(vec![
            Element::new(ElementType::Title, "Chapter").with_category_depth(0),
            Element::new(ElementType::Title, "Section").with_category_depth(1),
            Element::new(ElementType::ListItem, "nested item").with_category_depth(2),
            Element::new(ElementType::ListItem, "shallow item").with_category_depth(1),
        ]);
        assert_eq!(parents, vec![None, Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_parent_depth_is_strictly_smaller() {
        let (elements, parents) = build(vec![
            Element::new(ElementType::Title, "Chapter").with_category_depth(0),
            Element::new(ElementType::Title, "Section").with_category_depth(2),
            Element::new(ElementType::ListItem, "item").with_category_depth(1),
            Element::new(ElementType::Table, "cell").with_category_depth(3),
        ]);
        for (child, parent) in parents.iter().enumerate() {
            let (Some(parent), Some(child_depth)) = (parent, elements[child].metadata.category_depth) else {
                continue;
            };
            let parent_depth = elements[*parent].metadata.category_depth.unwrap_or(0);
            assert!(parent_depth < child_depth, "element {} under depth {}", child, parent_depth);
        }
        assert_eq!(parents, vec![None, Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_upstream_parent_must_be_shallower() {
        let mut elements = vec![
            Element::new(ElementType::Title, "A").with_category_depth(2),
            Element::new(ElementType::ListItem, "item").with_category_depth(1),
        ];
        assign_ids(&mut elements, IdMode::Hash);
        elements[1].metadata.parent_id = Some(elements[0].id.clone());
        let parents = HierarchyBuilder::default().build(&mut elements);
        assert_eq!(parents, vec![None, None]);
        assert!(elements[1].metadata.parent_id.is_none());
    }

    #[test]
    fn test_content_before_first_title_has_no_parent() {
        let (elements, parents) = build(vec![
            Element::new(ElementType::NarrativeText, "preamble"),
            Element::new(ElementType::Title, "Heading"),
        ]);
        assert_eq!(parents, vec![None, None]);
        assert!(elements[0].metadata.parent_id.is_none());
    }

    #[test]
    fn test_valid_upstream_parent_is_kept() {
        let mut elements = vec![
            Element::new(ElementType::Title, "A").with_category_depth(0),
            Element::new(ElementType::Title, "B").with_category_depth(0),
            Element::new(ElementType::NarrativeText, "under A"),
        ];
        assign_ids(&mut elements, IdMode::Hash);
        elements[2].metadata.parent_id = Some(elements[0].id.clone());
        let parents = HierarchyBuilder::default().build(&mut elements);
        assert_eq!(parents[2], Some(0));
    }

    #[test]
    fn test_invalid_upstream_parent_is_replaced() {
        let mut elements = vec![
            Element::new(ElementType::Title, "A").with_category_depth(1),
            Element::new(ElementType::Title, "B").with_category_depth(1),
        ];
        assign_ids(&mut elements, IdMode::Hash);
        elements[1].metadata.parent_id = Some(elements[0].id.clone());
        let parents = HierarchyBuilder::default().build(&mut elements);
        assert_eq!(parents, vec![None, None]);
    }

    #[test]
    fn test_headline_page_depths() {
        let mut headline = Element::new(ElementType::Title, "Big").with_page_number(1);
        headline.metadata.heading_role = Some(HeadingRole::Headline);
        let mut sub = Element::new(ElementType::Title, "Smaller").with_page_number(1);
        sub.metadata.heading_role = Some(HeadingRole::Subheadline);
        let mut elements = vec![
            headline,
            Element::new(ElementType::Title, "Plain").with_page_number(1),
            sub,
            Element::new(ElementType::Title, "Other page").with_page_number(2),
        ];
        HierarchyBuilder::default().normalize_depths(&mut elements);
        let depths: Vec<Option<u32>> = elements.iter().map(|e| e.metadata.category_depth).collect();
        assert_eq!(depths, vec![Some(1), Some(0), Some(2), None]);
    }

    #[test]
    fn test_source_depth_is_not_overwritten() {
        let mut headline = Element::new(ElementType::Title, "Big").with_page_number(1);
        headline.metadata.heading_role = Some(HeadingRole::Headline);
        let mut elements = vec![
            headline,
            Element::new(ElementType::Title, "h3").with_page_number(1).with_category_depth(3),
        ];
        HierarchyBuilder::default().normalize_depths(&mut elements);
        assert_eq!(elements[1].metadata.category_depth, Some(3));
    }

    #[test]
    fn test_custom_structural_categories() {
        let config = HierarchyConfig {
            structural_categories: vec![ElementType::Title, ElementType::ListItem],
            ..Default::default()
        };
        let mut elements = vec![
            Element::new(ElementType::ListItem, "outer").with_category_depth(0),
            Element::new(ElementType::ListItem, "inner").with_category_depth(1),
            Element::new(ElementType::NarrativeText, "text"),
        ];
        assign_ids(&mut elements, IdMode::Hash);
        let parents = HierarchyBuilder::new(config).unwrap().build(&mut elements);
        assert_eq!(parents, vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn test_chunk_categories_rejected_as_structural() {
        let config = HierarchyConfig {
            structural_categories: vec![ElementType::CompositeElement],
            ..Default::default()
        };
        assert!(HierarchyBuilder::new(config).is_err());
    }
}
