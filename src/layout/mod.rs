//! Tree layout for org-chart visualization.
//!
//! This module computes target positions for every node of a
//! [`Hierarchy`](crate::hierarchy::Hierarchy) and flattens them into the node,
//! link and bounds lists that the renderer and selection logic consume.
//! Coordinate-space transforms (centering on the bounds, axis flips) are left
//! to the host.

pub mod result;
pub mod tree;

pub use result::{Bounds, LayoutNode, LayoutResult, Link, Point};
pub use tree::{
    DEFAULT_NODE_SIZE, Placement, TreeLayout, TreeLayoutConfig, compute_layout,
};
