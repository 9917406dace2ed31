//! Hierarchy construction from nested data.
//!
//! A [`Hierarchy`] is an arena of [`HierarchyNode`]s stored in pre-order, with
//! parent and child links held as [`NodeIndex`] values rather than references.
//! Each node borrows its payload from the caller's data; nothing is copied.

mod data;
mod node;
mod tree;

pub use data::NodeData;
pub use node::{HierarchyNode, NodeIndex};
pub use tree::{Hierarchy, PostOrder};
