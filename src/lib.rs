//! Org Chart Layout - WASM Module
//!
//! This module turns nested org-chart data into positioned nodes and links
//! for a 3D org-chart viewer. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; the same types are usable
//! natively as an `rlib`.
//!
//! # Architecture
//!
//! - `hierarchy`: Arena tree built from nested data (depth, height, sibling order)
//! - `layout`: Layered tree layout and the flat node/link/bounds result
//! - `spatial`: R-tree pick index over laid-out nodes
//! - `logging`: `log` records forwarded to the browser console
//!
//! Rendering, camera control and input handling stay in the host.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Float32Array, Function, Reflect};
use log::warn;
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod logging;
pub mod spatial;

pub use error::LayoutError;
pub use hierarchy::{Hierarchy, HierarchyNode, NodeData, NodeIndex};
pub use layout::{LayoutResult, TreeLayout, TreeLayoutConfig, compute_layout};

use spatial::SpatialIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
}

/// Lay out nested org-chart data in one call.
///
/// `options` may carry `nodeSize`, `siblingSeparation`, `subtreeSeparation`
/// and a `separation(a, b)` callback. Returns
/// `{ nodes, links, bounds, nodeSize }` as plain objects.
#[wasm_bindgen(js_name = computeLayout)]
pub fn compute_layout_js(data: JsValue, options: JsValue) -> Result<JsValue, JsError> {
    let data: Value = serde_wasm_bindgen::from_value(data)?;
    let (layout, failure) = tree_layout_from_options(&options)?;
    let result = compute_layout(&data, &layout);
    failure.check()?;
    Ok(to_js(&result?)?)
}

/// A laid-out org chart held on the WASM side.
///
/// Keeps the layout and a pick index so the host can resolve pointer
/// positions and navigate parent/child/sibling relations by id.
#[wasm_bindgen]
pub struct OrgChartLayout {
    result: LayoutResult<Value>,
    spatial: SpatialIndex,
}

#[wasm_bindgen]
impl OrgChartLayout {
    /// Build and lay out `data` with the given options.
    #[wasm_bindgen(constructor)]
    pub fn new(data: JsValue, options: JsValue) -> Result<OrgChartLayout, JsError> {
        let data: Value = serde_wasm_bindgen::from_value(data)?;
        let (layout, failure) = tree_layout_from_options(&options)?;
        let result = compute_layout(&data, &layout);
        failure.check()?;
        Ok(Self::from_result(result?.into_owned()))
    }

    /// Number of nodes.
    #[wasm_bindgen(getter, js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.result.len() as u32
    }

    /// Positioned nodes in pre-order.
    pub fn nodes(&self) -> Result<JsValue, JsError> {
        Ok(to_js(&self.result.nodes)?)
    }

    /// Parent→child links.
    pub fn links(&self) -> Result<JsValue, JsError> {
        Ok(to_js(&self.result.links)?)
    }

    /// `{ minX, maxX, minY, maxY }`.
    pub fn bounds(&self) -> Result<JsValue, JsError> {
        Ok(to_js(&self.result.bounds)?)
    }

    /// Interleaved `[x0, y0, x1, y1, ...]` in node order.
    pub fn positions(&self) -> Float32Array {
        Float32Array::from(&self.result.positions()[..])
    }

    /// Id of the depth-0 node.
    #[wasm_bindgen(js_name = rootId)]
    pub fn root_id(&self) -> Option<String> {
        self.result.root().map(|node| node.id.clone())
    }

    /// Id of the parent of `id`.
    #[wasm_bindgen(js_name = parentOf)]
    pub fn parent_of(&self, id: &str) -> Option<String> {
        self.result.parent_of(id).map(|node| node.id.clone())
    }

    /// Ids of the children of `id`.
    #[wasm_bindgen(js_name = childrenOf)]
    pub fn children_of(&self, id: &str) -> Vec<String> {
        self.result
            .children_of(id)
            .into_iter()
            .map(|node| node.id.clone())
            .collect()
    }

    /// Ids of the siblings of `id`.
    #[wasm_bindgen(js_name = siblingsOf)]
    pub fn siblings_of(&self, id: &str) -> Vec<String> {
        self.result
            .siblings_of(id)
            .into_iter()
            .map(|node| node.id.clone())
            .collect()
    }

    /// Id of the node nearest to (x, y) in layout space.
    #[wasm_bindgen(js_name = findNearestNode)]
    pub fn find_nearest_node(&self, x: f64, y: f64) -> Option<String> {
        self.id_at(self.spatial.nearest(x, y))
    }

    /// Id of the nearest node within `max_distance` of (x, y).
    #[wasm_bindgen(js_name = findNearestNodeWithin)]
    pub fn find_nearest_node_within(&self, x: f64, y: f64, max_distance: f64) -> Option<String> {
        self.id_at(self.spatial.nearest_within(x, y, max_distance))
    }
}

impl OrgChartLayout {
    fn from_result(result: LayoutResult<Value>) -> Self {
        let spatial = SpatialIndex::from_layout(&result);
        Self { result, spatial }
    }

    fn id_at(&self, index: Option<NodeIndex>) -> Option<String> {
        index
            .and_then(|index| self.result.get(index))
            .map(|node| node.id.clone())
    }
}

/// Separation callback argument handed to JavaScript.
#[derive(Serialize)]
struct SeparationArg<'a> {
    index: u32,
    depth: u32,
    height: u32,
    parent: Option<u32>,
    data: &'a Value,
}

impl<'a> SeparationArg<'a> {
    fn new(node: &HierarchyNode<'a, Value>) -> Self {
        Self {
            index: node.slot().raw(),
            depth: node.depth(),
            height: node.height(),
            parent: node.parent().map(NodeIndex::raw),
            data: node.data(),
        }
    }
}

/// First error raised while calling a JS `separation` callback.
///
/// The callback runs deep inside the layout passes, which cannot fail, so the
/// error is parked here and surfaced once the layout returns.
#[derive(Clone, Default)]
struct CallbackFailure(Rc<RefCell<Option<JsValue>>>);

impl CallbackFailure {
    fn record(&self, error: JsValue) {
        let mut slot = self.0.borrow_mut();
        if slot.is_none() {
            warn!("separation callback failed, layout result will be discarded");
            *slot = Some(error);
        }
    }

    fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    fn check(&self) -> Result<(), JsError> {
        match self.0.borrow_mut().take() {
            Some(error) => Err(callback_error(&error)),
            None => Ok(()),
        }
    }
}

fn callback_error(error: &JsValue) -> JsError {
    let message = error
        .dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{error:?}"));
    JsError::new(&format!("separation callback failed: {message}"))
}

fn tree_layout_from_options(
    options: &JsValue,
) -> Result<(TreeLayout<'static, Value>, CallbackFailure), JsError> {
    let failure = CallbackFailure::default();
    if !options.is_object() {
        return Ok((TreeLayout::with_defaults(), failure));
    }

    let config: TreeLayoutConfig = serde_wasm_bindgen::from_value(options.clone())?;
    let layout = TreeLayout::new(config);

    let callback = Reflect::get(options, &JsValue::from_str("separation"))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok());

    let Some(callback) = callback else {
        return Ok((layout, failure));
    };

    let recorder = failure.clone();
    let layout = layout.with_separation(move |a, b| {
        // Only the first failure is reported
        if recorder.is_set() {
            return 1.0;
        }
        let outcome = to_js(&SeparationArg::new(a))
            .and_then(|first| Ok((first, to_js(&SeparationArg::new(b))?)))
            .map_err(JsValue::from)
            .and_then(|(first, second)| callback.call2(&JsValue::NULL, &first, &second));

        match outcome {
            Ok(value) => value.as_f64().unwrap_or(1.0),
            Err(error) => {
                recorder.record(error);
                1.0
            }
        }
    });

    Ok((layout, failure))
}

/// Serialize to plain JS objects (maps as objects, `None` as `null`).
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::json_compatible())
}
