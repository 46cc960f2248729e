//! Soundness check of `parent_id` links.

use std::collections::HashMap;
use std::fmt;

use crate::elements::{Element, ElementId};
use crate::pipeline::config::HierarchyConfig;

use super::builder::HierarchyRank;

/// What is wrong with a `parent_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// No element carries the referenced id
    DanglingParent,
    /// The parent does not occur before the child
    ParentNotEarlier,
    /// The parent cannot hold the child, or is not strictly shallower
    ParentNotShallower,
}

/// One unsound `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyViolation {
    /// Position of the child
    pub index: usize,
    /// The offending reference
    pub parent_id: ElementId,
    /// Kind of violation
    pub kind: ViolationKind,
}

impl fmt::Display for HierarchyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ViolationKind::DanglingParent => "refers to no element",
            ViolationKind::ParentNotEarlier => "refers to a later element",
            ViolationKind::ParentNotShallower => "refers to an element that does not rank above it",
        };
        write!(f, "element {}: parent {} {}", self.index, self.parent_id, what)
    }
}

/// Check every `parent_id` under the default hierarchy configuration.
///
/// A link is sound when the parent occurs earlier and outranks the child
/// (see [`HierarchyRank::outranks`]). In particular a parent never has a
/// `category_depth` greater than or equal to its child's.
pub fn validate_hierarchy(elements: &[Element]) -> Vec<HierarchyViolation> {
    validate_hierarchy_with(elements, &HierarchyConfig::default())
}

/// Check every `parent_id` under `config`.
pub fn validate_hierarchy_with(elements: &[Element], config: &HierarchyConfig) -> Vec<HierarchyViolation> {
    let mut first_seen: HashMap<&ElementId, usize> = HashMap::new();
    for (index, element) in elements.iter().enumerate() {
        first_seen.entry(&element.id).or_insert(index);
    }

    let mut violations = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let Some(parent_id) = &element.metadata.parent_id else {
            continue;
        };

        let kind = match first_seen.get(parent_id) {
            None => Some(ViolationKind::DanglingParent),
            Some(&parent) if parent >= index => Some(ViolationKind::ParentNotEarlier),
            Some(&parent) => {
                let parent_rank = HierarchyRank::of(&elements[parent], config);
                let child_rank = HierarchyRank::of(element, config);
                (!parent_rank.outranks(&child_rank)).then_some(ViolationKind::ParentNotShallower)
            },
        };

        if let Some(kind) = kind {
            violations.push(HierarchyViolation {
                index,
                parent_id: parent_id.clone(),
                kind,
            });
        }
    }
    violations
}
