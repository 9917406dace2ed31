//! Hierarchy - arena of nodes built from nested data.
//!
//! The arena is filled in pre-order: parents before children, children in
//! input order, each subtree complete before the next sibling's. Depth is
//! assigned top-down while filling; height is finalized bottom-up afterwards
//! by walking the arena in reverse, which visits every node after all of its
//! descendants.

use std::ops::Index;

use log::debug;

use super::data::NodeData;
use super::node::{HierarchyNode, NodeIndex};
use crate::error::LayoutError;

/// A tree of borrowed payloads.
///
/// Parent links are plain slots into the same arena, so there is no
/// ownership cycle between parents and children.
#[derive(Debug)]
pub struct Hierarchy<'a, T> {
    nodes: Vec<HierarchyNode<'a, T>>,
}

impl<'a, T: NodeData> Hierarchy<'a, T> {
    /// Build a hierarchy using the payload's default children accessor.
    pub fn build(root: &'a T) -> Result<Self, LayoutError> {
        Self::build_with(root, <T as NodeData>::children)
    }

    /// Build a hierarchy with an explicit children accessor.
    ///
    /// The input must be a finite tree. Every value reachable through
    /// `children_of` becomes exactly one node.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidInput`] if `root` is not a valid root
    /// value (for JSON: anything other than an object or array).
    pub fn build_with<F>(root: &'a T, mut children_of: F) -> Result<Self, LayoutError>
    where
        F: FnMut(&'a T) -> Option<&'a [T]>,
    {
        if !root.is_valid_root() {
            return Err(LayoutError::invalid_input(
                "hierarchy requires an object-like root value",
            ));
        }

        let mut nodes: Vec<HierarchyNode<'a, T>> = Vec::new();
        // (payload, parent slot, sibling index)
        let mut stack: Vec<(&'a T, Option<NodeIndex>, u32)> = vec![(root, None, 0)];

        while let Some((data, parent, index)) = stack.pop() {
            let slot = NodeIndex(nodes.len() as u32);
            let depth = match parent {
                Some(p) => {
                    let parent_node = &mut nodes[p.index()];
                    parent_node.children.push(slot);
                    parent_node.depth + 1
                }
                None => 0,
            };

            nodes.push(HierarchyNode {
                data,
                slot,
                parent,
                children: Vec::new(),
                depth,
                height: 0,
                index,
            });

            if let Some(children) = children_of(data) {
                // Reversed so the first child is popped first
                for (number, child) in children.iter().enumerate().rev() {
                    stack.push((child, Some(slot), number as u32));
                }
            }
        }

        for i in (0..nodes.len()).rev() {
            let height = nodes[i]
                .children
                .iter()
                .map(|child| nodes[child.index()].height + 1)
                .max()
                .unwrap_or(0);
            nodes[i].height = height;
        }

        debug!(
            nodes = nodes.len(),
            height = nodes[0].height;
            "Built hierarchy"
        );

        Ok(Self { nodes })
    }
}

impl<'a, T> Hierarchy<'a, T> {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the hierarchy has no nodes. Only an empty
    /// (`Default`) hierarchy is empty; built ones always have a root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node.
    pub fn root(&self) -> Option<&HierarchyNode<'a, T>> {
        self.nodes.first()
    }

    /// Look up a node by slot.
    pub fn get(&self, slot: NodeIndex) -> Option<&HierarchyNode<'a, T>> {
        self.nodes.get(slot.index())
    }

    /// The parent of `slot`, if any.
    pub fn parent(&self, slot: NodeIndex) -> Option<&HierarchyNode<'a, T>> {
        self.get(slot)?.parent.and_then(|p| self.get(p))
    }

    /// The children of `slot` in input order.
    pub fn children(&self, slot: NodeIndex) -> impl Iterator<Item = &HierarchyNode<'a, T>> {
        self.get(slot)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&child| &self[child])
    }

    /// `slot` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, slot: NodeIndex) -> impl Iterator<Item = &HierarchyNode<'a, T>> {
        std::iter::successors(self.get(slot), |node| {
            node.parent.and_then(|p| self.get(p))
        })
    }

    /// All nodes in arena order, which is pre-order.
    pub fn nodes(&self) -> &[HierarchyNode<'a, T>] {
        &self.nodes
    }

    /// Pre-order traversal: each node before its children.
    pub fn pre_order(&self) -> impl Iterator<Item = &HierarchyNode<'a, T>> {
        self.nodes.iter()
    }

    /// Post-order traversal: each node after all of its children.
    pub fn post_order(&self) -> PostOrder<'_, 'a, T> {
        PostOrder {
            hierarchy: self,
            stack: if self.nodes.is_empty() {
                Vec::new()
            } else {
                vec![(NodeIndex::ROOT, 0)]
            },
        }
    }

    /// All nodes in pre-order, collected.
    pub fn descendants(&self) -> Vec<&HierarchyNode<'a, T>> {
        self.pre_order().collect()
    }

    /// Every (parent, child) pair, in pre-order of the parent.
    pub fn links(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.pre_order().flat_map(|node| {
            node.children
                .iter()
                .map(move |&child| (node.slot, child))
        })
    }
}

impl<T> Default for Hierarchy<'_, T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<'a, T> Index<NodeIndex> for Hierarchy<'a, T> {
    type Output = HierarchyNode<'a, T>;

    fn index(&self, slot: NodeIndex) -> &Self::Output {
        &self.nodes[slot.index()]
    }
}

/// Post-order iterator over a [`Hierarchy`].
#[derive(Debug)]
pub struct PostOrder<'h, 'a, T> {
    hierarchy: &'h Hierarchy<'a, T>,
    /// (slot, next child cursor)
    stack: Vec<(NodeIndex, usize)>,
}

impl<'h, 'a, T> Iterator for PostOrder<'h, 'a, T> {
    type Item = &'h HierarchyNode<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let hierarchy = self.hierarchy;
        loop {
            let (slot, cursor) = self.stack.last_mut()?;
            let node = &hierarchy.nodes[slot.index()];
            match node.children.get(*cursor) {
                Some(&child) => {
                    *cursor += 1;
                    self.stack.push((child, 0));
                }
                None => {
                    self.stack.pop();
                    return Some(node);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use serde_json::{Map, Value, json};

    use super::*;
    use crate::layout::{TreeLayout, compute_layout};

    fn names<'h, 'a: 'h, T: NodeData + 'a>(
        nodes: impl Iterator<Item = &'h HierarchyNode<'a, T>>,
    ) -> Vec<String> {
        nodes
            .map(|n| n.data().name().map(Cow::into_owned).unwrap_or_default())
            .collect()
    }

    fn sample() -> Value {
        json!({
            "name": "A",
            "children": [
                {"name": "B", "children": [{"name": "D"}, {"name": "E"}]},
                {"name": "C", "children": [{"name": "F", "children": [{"name": "G"}]}]}
            ]
        })
    }

    #[test]
    fn test_single_node() {
        let data = json!({"name": "A"});
        let h = Hierarchy::build(&data).unwrap();

        assert_eq!(h.len(), 1);
        let root = h.root().unwrap();
        assert_eq!(root.depth(), 0);
        assert_eq!(root.height(), 0);
        assert!(root.is_root());
        assert!(root.is_leaf());
        assert_eq!(h.links().count(), 0);
    }

    #[test]
    fn test_pre_order_and_depth() {
        let data = sample();
        let h = Hierarchy::build(&data).unwrap();

        assert_eq!(names(h.pre_order()), ["A", "B", "D", "E", "C", "F", "G"]);
        let depths: Vec<u32> = h.pre_order().map(HierarchyNode::depth).collect();
        assert_eq!(depths, [0, 1, 2, 2, 1, 2, 3]);
    }

    #[test]
    fn test_heights() {
        let data = sample();
        let h = Hierarchy::build(&data).unwrap();

        let heights: Vec<u32> = h.pre_order().map(HierarchyNode::height).collect();
        // A B D E C F G
        assert_eq!(heights, [3, 1, 0, 0, 2, 1, 0]);
    }

    #[test]
    fn test_sibling_index_and_parent() {
        let data = sample();
        let h = Hierarchy::build(&data).unwrap();

        let e = &h[NodeIndex(3)];
        assert_eq!(e.index(), 1);
        assert_eq!(e.parent(), Some(NodeIndex(1)));
        assert_eq!(h.parent(e.slot()).unwrap().slot(), NodeIndex(1));
        assert!(h.parent(NodeIndex::ROOT).is_none());

        let c = &h[NodeIndex(4)];
        assert_eq!(c.index(), 1);
        assert_eq!(c.children(), [NodeIndex(5)]);
    }

    #[test]
    fn test_post_order() {
        let data = sample();
        let h = Hierarchy::build(&data).unwrap();

        assert_eq!(names(h.post_order()), ["D", "E", "B", "G", "F", "C", "A"]);
    }

    #[test]
    fn test_post_order_empty() {
        let h: Hierarchy<'_, Value> = Hierarchy::default();
        assert_eq!(h.post_order().count(), 0);
        assert!(h.is_empty());
        assert!(h.root().is_none());
    }

    #[test]
    fn test_links_in_pre_order() {
        let data = sample();
        let h = Hierarchy::build(&data).unwrap();

        let links: Vec<(u32, u32)> = h.links().map(|(p, c)| (p.raw(), c.raw())).collect();
        assert_eq!(links, [(0, 1), (0, 4), (1, 2), (1, 3), (4, 5), (5, 6)]);
    }

    #[test]
    fn test_ancestors_and_children() {
        let data = sample();
        let h = Hierarchy::build(&data).unwrap();

        assert_eq!(names(h.ancestors(NodeIndex(6))), ["G", "F", "C", "A"]);
        assert_eq!(names(h.children(NodeIndex::ROOT)), ["B", "C"]);
        assert_eq!(h.children(NodeIndex(99)).count(), 0);
        assert_eq!(h.descendants().len(), 7);
    }

    #[test]
    fn test_empty_children_array_is_leaf() {
        let data = json!({"name": "A", "children": []});
        let h = Hierarchy::build(&data).unwrap();

        assert_eq!(h.len(), 1);
        assert_eq!(h.root().unwrap().height(), 0);
    }

    #[test]
    fn test_invalid_root() {
        assert!(matches!(
            Hierarchy::build(&Value::Null),
            Err(LayoutError::InvalidInput(_))
        ));
        assert!(matches!(
            Hierarchy::build(&json!("just a string")),
            Err(LayoutError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_custom_accessor() {
        let data = json!({
            "name": "A",
            "reports": [{"name": "B"}, {"name": "C", "reports": [{"name": "D"}]}],
            "children": [{"name": "ignored"}]
        });
        let h = Hierarchy::build_with(&data, |v| {
            v.get("reports").and_then(Value::as_array).map(Vec::as_slice)
        })
        .unwrap();

        assert_eq!(names(h.pre_order()), ["A", "B", "C", "D"]);
        assert_eq!(h.root().unwrap().height(), 2);
    }

    /// 20 000-level chain assembled without `json!`, which would re-serialize
    /// the nested value on every step.
    fn deep_chain(levels: usize) -> Value {
        let mut data = Value::Object(Map::from_iter([("name".to_owned(), Value::from("leaf"))]));
        for i in 0..levels {
            let mut node = Map::new();
            node.insert("name".to_owned(), Value::from(format!("n{i}")));
            node.insert("children".to_owned(), Value::Array(vec![data]));
            data = Value::Object(node);
        }
        data
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let data = deep_chain(20_000);

        let h = Hierarchy::build(&data).unwrap();
        assert_eq!(h.len(), 20_001);
        assert_eq!(h.root().unwrap().height(), 20_000);
        assert_eq!(h.post_order().count(), 20_001);
        drop(h);

        let result = compute_layout(&data, &TreeLayout::with_defaults()).unwrap();
        assert_eq!(result.len(), 20_001);
        assert_eq!(result.links.len(), 20_000);
        assert_eq!(result.nodes[20_000].depth, 20_000);
        assert_eq!(result.nodes[20_000].parent_id.as_deref(), Some("n0"));
        assert_eq!(result.bounds.width(), 0.0);
        drop(result);

        // serde_json drops nested values recursively
        std::mem::forget(data);
    }

    /// Typed payload implementing the trait directly.
    struct Role {
        title: &'static str,
        reports: Vec<Role>,
    }

    impl NodeData for Role {
        fn children(&self) -> Option<&[Self]> {
            Some(&self.reports)
        }

        fn id(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn name(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.title))
        }
    }

    #[test]
    fn test_typed_payload() {
        let org = Role {
            title: "CEO",
            reports: vec![
                Role { title: "CTO", reports: Vec::new() },
                Role { title: "CFO", reports: Vec::new() },
            ],
        };
        let h = Hierarchy::build(&org).unwrap();

        assert_eq!(names(h.pre_order()), ["CEO", "CTO", "CFO"]);
        assert_eq!(h.root().unwrap().height(), 1);
    }
}
