//! Flat layout output consumed by renderers and selection logic.
//!
//! [`LayoutResult::extract`] turns a hierarchy and its [`Placement`] into a
//! pre-order list of positioned nodes, one link per parent/child pair and a
//! tight bounding box. Node ids come from the payload (`id`, then `name`,
//! then `node-<preorder index>`) and are made unique with `-1`, `-2`, ...
//! suffixes in traversal order.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::tree::Placement;
use crate::error::LayoutError;
use crate::hierarchy::{Hierarchy, NodeData, NodeIndex};

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// (0, 0).
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box over node coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Tight bounds over `points`, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |bounds, p| {
            Some(match bounds {
                None => Self {
                    min_x: p.x,
                    max_x: p.x,
                    min_y: p.y,
                    max_y: p.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    max_x: b.max_x.max(p.x),
                    min_y: b.min_y.min(p.y),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }

    /// Center of the box. Hosts subtract this to center the chart.
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// A positioned node descriptor.
///
/// `D` is the payload handle: `&T` straight out of [`LayoutResult::extract`],
/// or an owned `T` after [`LayoutResult::into_owned`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode<D> {
    pub id: String,
    /// Payload name, or empty.
    pub name: String,
    pub depth: u32,
    pub height: u32,
    pub parent_id: Option<String>,
    pub x: f64,
    pub y: f64,
    /// Position in [`LayoutResult::nodes`] (equal to the hierarchy slot).
    #[serde(skip)]
    pub index: NodeIndex,
    pub data: D,
}

impl<D> LayoutNode<D> {
    /// The node's coordinate.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// An edge from a parent to one of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source_id: String,
    pub target_id: String,
    pub source: Point,
    pub target: Point,
}

/// Snapshot of a finished layout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult<D> {
    /// Positioned nodes in pre-order.
    pub nodes: Vec<LayoutNode<D>>,
    /// One link per non-root node, in pre-order of the parent.
    pub links: Vec<Link>,
    pub bounds: Bounds,
    /// The `[dx, dy]` the layout ran with.
    pub node_size: [f64; 2],
    #[serde(skip)]
    index_by_id: HashMap<String, usize>,
}

impl<'a, T: NodeData> LayoutResult<&'a T> {
    /// Flatten a laid-out hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidInput`] if the hierarchy is empty or the
    /// placement was computed for a different hierarchy.
    pub fn extract(
        hierarchy: &Hierarchy<'a, T>,
        placement: &Placement,
        node_size: [f64; 2],
    ) -> Result<Self, LayoutError> {
        if hierarchy.is_empty() {
            return Err(LayoutError::invalid_input("cannot extract an empty hierarchy"));
        }
        if placement.len() != hierarchy.len() {
            return Err(LayoutError::invalid_input(format!(
                "placement has {} positions for {} nodes",
                placement.len(),
                hierarchy.len()
            )));
        }

        let positions = placement.positions();
        let mut ids = IdFactory::default();
        let mut nodes: Vec<LayoutNode<&'a T>> = Vec::with_capacity(hierarchy.len());

        for (preorder_index, node) in hierarchy.pre_order().enumerate() {
            let data = node.data();
            let id = ids.assign(
                data.id().or_else(|| data.name()),
                format!("node-{preorder_index}"),
            );
            let position = positions[node.slot().index()];

            nodes.push(LayoutNode {
                id,
                name: data.name().map(Cow::into_owned).unwrap_or_default(),
                depth: node.depth(),
                height: node.height(),
                parent_id: node
                    .parent()
                    .and_then(|p| nodes.get(p.index()))
                    .map(|parent| parent.id.clone()),
                x: position.x,
                y: position.y,
                index: node.slot(),
                data,
            });
        }

        let links: Vec<Link> = hierarchy
            .links()
            .map(|(source, target)| Link {
                source_id: nodes[source.index()].id.clone(),
                target_id: nodes[target.index()].id.clone(),
                source: positions[source.index()],
                target: positions[target.index()],
            })
            .collect();

        let bounds = Bounds::from_points(nodes.iter().map(LayoutNode::position))
            .ok_or_else(|| LayoutError::invalid_input("layout produced no nodes"))?;

        debug!(
            nodes = nodes.len(),
            links = links.len(),
            min_x = bounds.min_x,
            max_x = bounds.max_x,
            max_y = bounds.max_y;
            "Extracted layout"
        );

        Ok(Self::from_parts(nodes, links, bounds, node_size))
    }

    /// Detach the result from the input data by cloning every payload.
    pub fn into_owned(self) -> LayoutResult<T>
    where
        T: Clone,
    {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| LayoutNode {
                id: node.id,
                name: node.name,
                depth: node.depth,
                height: node.height,
                parent_id: node.parent_id,
                x: node.x,
                y: node.y,
                index: node.index,
                data: node.data.clone(),
            })
            .collect();

        LayoutResult {
            nodes,
            links: self.links,
            bounds: self.bounds,
            node_size: self.node_size,
            index_by_id: self.index_by_id,
        }
    }
}

impl<D> LayoutResult<D> {
    fn from_parts(
        nodes: Vec<LayoutNode<D>>,
        links: Vec<Link>,
        bounds: Bounds,
        node_size: [f64; 2],
    ) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();

        Self {
            nodes,
            links,
            bounds,
            node_size,
            index_by_id,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by its position in `nodes`.
    pub fn get(&self, index: NodeIndex) -> Option<&LayoutNode<D>> {
        self.nodes.get(index.index())
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&LayoutNode<D>> {
        self.index_by_id.get(id).map(|&i| &self.nodes[i])
    }

    /// The first depth-0 node.
    pub fn root(&self) -> Option<&LayoutNode<D>> {
        self.nodes.iter().find(|node| node.depth == 0)
    }

    /// The parent of node `id`.
    pub fn parent_of(&self, id: &str) -> Option<&LayoutNode<D>> {
        self.node(id)?
            .parent_id
            .as_deref()
            .and_then(|parent| self.node(parent))
    }

    /// The children of node `id`, in input order.
    pub fn children_of(&self, id: &str) -> Vec<&LayoutNode<D>> {
        self.nodes
            .iter()
            .filter(|node| node.parent_id.as_deref() == Some(id))
            .collect()
    }

    /// The other children of node `id`'s parent, in input order.
    /// The root has no siblings.
    pub fn siblings_of(&self, id: &str) -> Vec<&LayoutNode<D>> {
        match self.parent_of(id) {
            Some(parent) => self
                .children_of(&parent.id)
                .into_iter()
                .filter(|node| node.id != id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Interleaved `[x0, y0, x1, y1, ...]` in node order, for GPU upload.
    pub fn positions(&self) -> Vec<f32> {
        let mut positions = Vec::with_capacity(self.nodes.len() * 2);
        for node in &self.nodes {
            positions.push(node.x as f32);
            positions.push(node.y as f32);
        }
        positions
    }
}

/// Hands out unique ids, suffixing repeats with `-1`, `-2`, ...
#[derive(Debug, Default)]
struct IdFactory {
    used: HashSet<String>,
}

impl IdFactory {
    fn assign(&mut self, candidate: Option<Cow<'_, str>>, fallback: String) -> String {
        let base = candidate.map(Cow::into_owned).unwrap_or(fallback);
        let mut id = base.clone();
        let mut suffix = 1;

        while self.used.contains(&id) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }

        self.used.insert(id.clone());
        id
    }
}
