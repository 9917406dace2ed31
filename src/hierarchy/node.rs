//! Node type and related structures.
//!
//! Each node in a hierarchy has:
//! - A stable arena slot ([`NodeIndex`]), which is also its pre-order position
//! - A borrowed payload
//! - Parent and child slots
//! - Depth (distance from the root) and height (longest path to a leaf)

/// Arena slot of a node inside a [`Hierarchy`](super::Hierarchy).
///
/// Slots are assigned in pre-order, so the root is always `NodeIndex(0)` and
/// every node's slot is smaller than the slots of its descendants. The same
/// number is the node's position in [`LayoutResult::nodes`](crate::layout::LayoutResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const ROOT: Self = Self(0);

    /// Pre-order position as exposed to JavaScript.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One entity of the hierarchy.
///
/// Nodes are created by [`Hierarchy::build`](super::Hierarchy::build) and are
/// immutable afterwards. Layout coordinates live in a separate
/// [`Placement`](crate::layout::Placement).
#[derive(Debug)]
pub struct HierarchyNode<'a, T> {
    pub(super) data: &'a T,
    pub(super) slot: NodeIndex,
    pub(super) parent: Option<NodeIndex>,
    pub(super) children: Vec<NodeIndex>,
    pub(super) depth: u32,
    pub(super) height: u32,
    pub(super) index: u32,
}

impl<'a, T> HierarchyNode<'a, T> {
    /// The payload this node was built from.
    #[inline]
    pub fn data(&self) -> &'a T {
        self.data
    }

    /// This node's arena slot.
    #[inline]
    pub fn slot(&self) -> NodeIndex {
        self.slot
    }

    /// The parent's slot, or `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Child slots in input order.
    #[inline]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Distance from the root (root = 0).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Length of the longest downward path to a leaf (leaf = 0).
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Position among its siblings in input order.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Whether this node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
