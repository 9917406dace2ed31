//! Layered tree layout for org charts.
//!
//! A simplified Reingold-Tilford variant that assigns every node of a
//! [`Hierarchy`] an (x, y) coordinate in three linear passes:
//!
//! 1. **Placement (pre-order):** `y = depth * dy`. Each node is placed `dx`
//!    times the separation factor to the right of the node visited just before
//!    it at the same depth; the first node seen at a depth sits at x = 0.
//! 2. **Centering (post-order):** every parent moves to the midpoint of its
//!    first and last child. Only those two children are consulted and nothing
//!    is re-balanced afterwards, so a parent above a skewed child row can sit
//!    off the children's mean, and cousins are not pushed apart after a
//!    parent moves. This is not a contour-based tidy tree.
//! 3. **Normalization:** x is shifted so that `(min_x + max_x) / 2 == 0`.
//!    y is never shifted.
//!
//! The hierarchy is never mutated; coordinates come back as a [`Placement`].

use std::fmt;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::result::{LayoutResult, Point};
use crate::error::LayoutError;
use crate::hierarchy::{Hierarchy, HierarchyNode, NodeData, NodeIndex};

/// Default `[dx, dy]`: horizontal spacing unit and vertical spacing per level.
pub const DEFAULT_NODE_SIZE: [f64; 2] = [260.0, 160.0];

/// Configuration for the tree layout.
///
/// Deserializes from a host options object such as
/// `{ "nodeSize": [320, 220], "siblingSeparation": 1.1 }`; missing fields keep
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeLayoutConfig {
    /// `[dx, dy]`.
    pub node_size: [f64; 2],
    /// Separation factor between two nodes with the same parent.
    pub sibling_separation: f64,
    /// Separation factor between two nodes with different parents.
    pub subtree_separation: f64,
}

impl Default for TreeLayoutConfig {
    fn default() -> Self {
        Self {
            node_size: DEFAULT_NODE_SIZE,
            sibling_separation: 1.0,
            subtree_separation: 2.0,
        }
    }
}

type SeparationFn<'s, T> =
    Box<dyn Fn(&HierarchyNode<'_, T>, &HierarchyNode<'_, T>) -> f64 + 's>;

/// The tree layout engine.
///
/// `T` is the payload type of the hierarchies it lays out; it only matters
/// for custom separation functions, which may inspect the payloads.
pub struct TreeLayout<'s, T> {
    config: TreeLayoutConfig,
    separation: Option<SeparationFn<'s, T>>,
}

impl<'s, T> TreeLayout<'s, T> {
    /// Create a new tree layout with the given configuration.
    pub fn new(config: TreeLayoutConfig) -> Self {
        Self {
            config,
            separation: None,
        }
    }

    /// Create a tree layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TreeLayoutConfig::default())
    }

    /// Replace the separation policy.
    ///
    /// `separation(a, b)` is the factor applied to `dx` when `a` is placed
    /// after `b` on the same depth level. The result is not validated; zero or
    /// negative factors give overlapping or reversed rows.
    pub fn with_separation<F>(mut self, separation: F) -> Self
    where
        F: Fn(&HierarchyNode<'_, T>, &HierarchyNode<'_, T>) -> f64 + 's,
    {
        self.separation = Some(Box::new(separation));
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &TreeLayoutConfig {
        &self.config
    }

    /// The `[dx, dy]` spacing.
    pub fn node_size(&self) -> [f64; 2] {
        self.config.node_size
    }

    /// Separation factor for placing `a` after `b`.
    pub fn separation(&self, a: &HierarchyNode<'_, T>, b: &HierarchyNode<'_, T>) -> f64 {
        match &self.separation {
            Some(separation) => separation(a, b),
            None if a.parent() == b.parent() => self.config.sibling_separation,
            None => self.config.subtree_separation,
        }
    }

    /// Compute coordinates for every node of `hierarchy`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidInput`] if the hierarchy is empty or its
    /// first slot is not a depth-0 root.
    pub fn layout(&self, hierarchy: &Hierarchy<'_, T>) -> Result<Placement, LayoutError> {
        let root = hierarchy
            .root()
            .ok_or_else(|| LayoutError::invalid_input("tree layout expects a non-empty hierarchy"))?;
        if !root.is_root() || root.depth() != 0 {
            return Err(LayoutError::invalid_input(
                "tree layout expects a hierarchy rooted at depth 0",
            ));
        }

        let [dx, dy] = self.config.node_size;
        let mut positions = vec![Point::ORIGIN; hierarchy.len()];

        // Pass 1: same-depth predecessor placement
        let mut last_at_depth: Vec<Option<NodeIndex>> = vec![None; root.height() as usize + 1];
        for node in hierarchy.pre_order() {
            let depth = node.depth() as usize;
            if depth >= last_at_depth.len() {
                last_at_depth.resize(depth + 1, None);
            }

            let x = match last_at_depth[depth] {
                Some(previous) => {
                    let factor = self.separation(node, &hierarchy[previous]);
                    positions[previous.index()].x + factor * dx
                }
                None => 0.0,
            };
            positions[node.slot().index()] = Point::new(x, node.depth() as f64 * dy);
            last_at_depth[depth] = Some(node.slot());
        }

        // Pass 2: center parents over first and last child
        for node in hierarchy.post_order() {
            if let (Some(first), Some(last)) = (node.children().first(), node.children().last()) {
                let midpoint = (positions[first.index()].x + positions[last.index()].x) / 2.0;
                positions[node.slot().index()].x = midpoint;
            }
        }

        // Pass 3: center the whole layout on x = 0
        let (min_x, max_x) = positions
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.x), hi.max(p.x))
            });
        let offset = (min_x + max_x) / 2.0;
        trace!(min_x, max_x, offset; "Normalizing layout");
        for position in &mut positions {
            position.x -= offset;
        }

        debug!(
            nodes = positions.len(),
            levels = last_at_depth.len(),
            width = max_x - min_x;
            "Tree layout complete"
        );

        Ok(Placement { positions })
    }
}

impl<T> Default for TreeLayout<'_, T> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<T> fmt::Debug for TreeLayout<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeLayout")
            .field("config", &self.config)
            .field("custom_separation", &self.separation.is_some())
            .finish()
    }
}

/// Coordinates produced by [`TreeLayout::layout`], one per hierarchy slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    positions: Vec<Point>,
}

impl Placement {
    /// Position of the node in `slot`.
    pub fn get(&self, slot: NodeIndex) -> Option<Point> {
        self.positions.get(slot.index()).copied()
    }

    /// All positions in slot (pre-order) order.
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Number of positioned nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no node was positioned.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Flatten into nodes, links and bounds for `hierarchy`.
    ///
    /// # Errors
    ///
    /// See [`LayoutResult::extract`].
    pub fn into_result<'a, T: NodeData>(
        self,
        hierarchy: &Hierarchy<'a, T>,
        node_size: [f64; 2],
    ) -> Result<LayoutResult<&'a T>, LayoutError> {
        LayoutResult::extract(hierarchy, &self, node_size)
    }
}

/// Build a hierarchy from `root_data`, lay it out and extract the flat result.
///
/// # Errors
///
/// Propagates [`LayoutError::InvalidInput`] from hierarchy construction.
pub fn compute_layout<'a, T: NodeData>(
    root_data: &'a T,
    layout: &TreeLayout<'_, T>,
) -> Result<LayoutResult<&'a T>, LayoutError> {
    let hierarchy = Hierarchy::build(root_data)?;
    layout
        .layout(&hierarchy)?
        .into_result(&hierarchy, layout.node_size())
}
