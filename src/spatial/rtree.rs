//! Pick index over laid-out org-chart nodes, backed by an rstar R*-tree.
//!
//! Queries take layout-space coordinates (the same space as
//! [`LayoutNode::x`](crate::layout::LayoutNode) and `y`) and return
//! [`NodeIndex`] values into [`LayoutResult::nodes`].

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::hierarchy::NodeIndex;
use crate::layout::LayoutResult;

/// A point in the spatial index with associated node index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// Position of the node in [`LayoutResult::nodes`].
    pub index: NodeIndex,
    pub x: f64,
    pub y: f64,
}

impl NodePoint {
    /// Point for the node at `index`, positioned at (x, y).
    pub fn new(index: NodeIndex, x: f64, y: f64) -> Self {
        Self { index, x, y }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        (self.x - point[0]).abs() < f64::EPSILON && (self.y - point[1]).abs() < f64::EPSILON
    }
}

/// Pick index over the nodes of a layout.
///
/// Uses an R*-tree. The index holds copies of the coordinates, so it must be
/// rebuilt if the host re-runs the layout.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// An index with no nodes; every query misses.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load the index from every node of `layout`.
    pub fn from_layout<D>(layout: &LayoutResult<D>) -> Self {
        let points = layout
            .nodes
            .iter()
            .map(|node| NodePoint::new(node.index, node.x, node.y))
            .collect();

        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Node closest to (x, y), or `None` when the index is empty.
    pub fn nearest(&self, x: f64, y: f64) -> Option<NodeIndex> {
        self.tree
            .nearest_neighbor(&[x, y])
            .map(|point| point.index)
    }

    /// Like [`nearest`](Self::nearest), but only within `max_distance`.
    pub fn nearest_within(&self, x: f64, y: f64, max_distance: f64) -> Option<NodeIndex> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.index)
    }

    /// Nodes inside the axis-aligned box, in no particular order.
    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<NodeIndex> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.index)
            .collect()
    }

    /// Nodes within `radius` of (x, y), in no particular order.
    pub fn in_radius(&self, x: f64, y: f64, radius: f64) -> Vec<NodeIndex> {
        self.tree
            .locate_within_distance([x, y], radius * radius)
            .map(|point| point.index)
            .collect()
    }

    /// Replace the contents with the nodes of `layout`.
    pub fn rebuild<D>(&mut self, layout: &LayoutResult<D>) {
        *self = Self::from_layout(layout);
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether no node is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
