//! Browser tests for the JavaScript surface.
//!
//! Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Function, Object, Reflect};
use orgchart_layout::{OrgChartLayout, compute_layout_js};
use serde::Serialize;
use serde_json::json;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Plain objects rather than `Map`s, as a JS caller would pass them.
fn to_js(value: &serde_json::Value) -> JsValue {
    value.serialize(&Serializer::json_compatible()).unwrap()
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap()
}

fn layout(data: JsValue, options: JsValue) -> JsValue {
    compute_layout_js(data, options).map_err(JsValue::from).unwrap()
}

fn sample() -> JsValue {
    to_js(&json!({
        "id": "ceo",
        "name": "Alex",
        "children": [
            {"id": "cto", "name": "Jordan", "children": [{"name": "Priya"}]},
            {"id": "cpo", "name": "Taylor"}
        ]
    }))
}

#[wasm_bindgen_test]
fn compute_layout_returns_plain_objects() {
    let result = layout(sample(), JsValue::UNDEFINED);

    let nodes = Array::from(&get(&result, "nodes"));
    let links = Array::from(&get(&result, "links"));
    assert_eq!(nodes.length(), 4);
    assert_eq!(links.length(), 3);

    let root = nodes.get(0);
    assert_eq!(get(&root, "id").as_string().as_deref(), Some("ceo"));
    assert!(get(&root, "parentId").is_null());

    let leaf = nodes.get(2);
    assert_eq!(get(&leaf, "id").as_string().as_deref(), Some("Priya"));
    assert_eq!(get(&leaf, "depth").as_f64(), Some(2.0));
    assert_eq!(get(&leaf, "y").as_f64(), Some(320.0));

    let bounds = get(&result, "bounds");
    let center = (get(&bounds, "minX").as_f64().unwrap() + get(&bounds, "maxX").as_f64().unwrap()) / 2.0;
    assert!(center.abs() < 1e-9);
}

#[wasm_bindgen_test]
fn compute_layout_reads_options() {
    let options = to_js(&json!({"nodeSize": [100.0, 50.0], "siblingSeparation": 2.0}));
    let data = to_js(&json!({"name": "A", "children": [{"name": "B"}, {"name": "C"}]}));
    let result = layout(data, options);

    let nodes = Array::from(&get(&result, "nodes"));
    assert_eq!(get(&nodes.get(1), "x").as_f64(), Some(-100.0));
    assert_eq!(get(&nodes.get(2), "x").as_f64(), Some(100.0));
    assert_eq!(get(&nodes.get(2), "y").as_f64(), Some(50.0));
}

#[wasm_bindgen_test]
fn compute_layout_calls_separation_callback() {
    let options = Object::new();
    let separation = Function::new_with_args("a, b", "return a.data.name === 'C' ? 3 : 'wide';");
    Reflect::set(&options, &JsValue::from_str("nodeSize"), &to_js(&json!([10.0, 10.0]))).unwrap();
    Reflect::set(&options, &JsValue::from_str("separation"), &separation).unwrap();

    let data = to_js(&json!({"name": "A", "children": [{"name": "B"}, {"name": "C"}, {"name": "D"}]}));
    let result = layout(data, options.into());

    // B at 0, C at 30, D at 40 (non-numeric return counts as 1), then centered
    let nodes = Array::from(&get(&result, "nodes"));
    assert_eq!(get(&nodes.get(1), "x").as_f64(), Some(-20.0));
    assert_eq!(get(&nodes.get(2), "x").as_f64(), Some(10.0));
    assert_eq!(get(&nodes.get(3), "x").as_f64(), Some(20.0));
}

fn throwing_options() -> JsValue {
    let options = Object::new();
    let separation = Function::new_with_args("a, b", "throw new Error('no spacing for ' + a.data.name);");
    Reflect::set(&options, &JsValue::from_str("separation"), &separation).unwrap();
    options.into()
}

#[wasm_bindgen_test]
fn compute_layout_fails_when_separation_throws() {
    let data = to_js(&json!({"name": "A", "children": [{"name": "B"}, {"name": "C"}]}));
    let error = JsValue::from(compute_layout_js(data, throwing_options()).unwrap_err());

    let message = get(&error, "message").as_string().unwrap();
    assert!(message.contains("no spacing for C"), "{message}");
}

#[wasm_bindgen_test]
fn org_chart_layout_fails_when_separation_throws() {
    let data = to_js(&json!({"name": "A", "children": [{"name": "B"}, {"name": "C"}]}));
    assert!(OrgChartLayout::new(data, throwing_options()).is_err());

    // A single node never consults the callback
    assert!(OrgChartLayout::new(to_js(&json!({"name": "solo"})), throwing_options()).is_ok());
}

#[wasm_bindgen_test]
fn compute_layout_rejects_scalar_root() {
    assert!(compute_layout_js(JsValue::from_f64(3.0), JsValue::UNDEFINED).is_err());
}

#[wasm_bindgen_test]
fn org_chart_layout_navigation_and_picking() {
    let chart = OrgChartLayout::new(sample(), JsValue::UNDEFINED)
        .map_err(JsValue::from)
        .unwrap();

    assert_eq!(chart.node_count(), 4);
    assert_eq!(chart.root_id().as_deref(), Some("ceo"));
    assert_eq!(chart.parent_of("Priya").as_deref(), Some("cto"));
    assert_eq!(chart.children_of("ceo"), ["cto", "cpo"]);
    assert_eq!(chart.siblings_of("cpo"), ["cto"]);
    assert_eq!(chart.positions().length(), 8);

    let nodes = Array::from(&chart.nodes().map_err(JsValue::from).unwrap());
    let cpo = nodes.get(3);
    let (x, y) = (get(&cpo, "x").as_f64().unwrap(), get(&cpo, "y").as_f64().unwrap());
    assert_eq!(chart.find_nearest_node(x + 5.0, y - 5.0).as_deref(), Some("cpo"));
    assert_eq!(chart.find_nearest_node_within(x, y + 1_000.0, 10.0), None);
}
