//! Document hierarchy.
//!
//! ## Overview
//!
//! Every element may point to the nearest enclosing structural element
//! (by default a Title) through `parent_id`. Parents are found with a depth
//! stack over the final reading order:
//!
//! 1. Pop open sections that do not outrank the current element (a set
//!    `category_depth` must be strictly smaller than the current one)
//! 2. The remaining top, if any, is the parent
//! 3. Structural elements open a new section
//!
//! The hierarchy lives in the flat element vector; `parent_id` is an id, and
//! [`HierarchyBuilder::build`] also returns it as a vector index.
//!
//! ## Example
//!
//! ```
//! use element_oxide::elements::{assign_ids, Element, ElementType, IdMode};
//! use element_oxide::structure::{validate_hierarchy, HierarchyBuilder};
//!
//! let mut elements = vec![
//!     Element::new(ElementType::Title, "Intro"),
//!     Element::new(ElementType::NarrativeText, "Body"),
//! ];
//! assign_ids(&mut elements, IdMode::Hash);
//!
//! let parents = HierarchyBuilder::default().build(&mut elements);
//! assert_eq!(parents, vec![None, Some(0)]);
//! assert!(validate_hierarchy(&elements).is_empty());
//! ```

mod builder;
mod validate;

pub use builder::{HierarchyBuilder, HierarchyRank};
pub use validate::{validate_hierarchy, validate_hierarchy_with, HierarchyViolation, ViolationKind};
