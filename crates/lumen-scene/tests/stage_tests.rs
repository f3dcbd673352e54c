//! Stage behavior: incremental updates, events, hit testing, and deferred
//! content.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use lumen_common::FetchOptions;
use lumen_export::{ExportOptions, export_svg};
use lumen_model::{Design, Layer, LayerProperties, Transform};
use lumen_render::{NodeBuilder, NodeRef};
use lumen_scene::{
    EventKind, SceneError, SceneEvent, SceneGraph, Stage, StageOptions, UpdatePath,
};
use serde_json::json;

const WAIT: Duration = Duration::from_secs(10);

fn offline() -> FetchOptions {
    FetchOptions {
        allow_remote: false,
        ..FetchOptions::default()
    }
}

fn stage_with(layers: serde_json::Value) -> Stage {
    let design = json!({ "width": 400, "height": 300, "layers": layers });
    let design = Design::from_json(&design.to_string()).expect("valid design json");
    let mut stage = Stage::new(StageOptions {
        fetch: offline(),
        ..StageOptions::default()
    });
    stage.mount(design);
    stage
}

fn record_events(stage: &mut Stage) -> Rc<RefCell<Vec<SceneEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let _ = stage.subscribe(None, move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn names(events: &Rc<RefCell<Vec<SceneEvent>>>) -> Vec<String> {
    events
        .borrow()
        .iter()
        .map(|e| {
            let kind = e.kind();
            let name: &str = kind.as_ref();
            format!("{name} {}", e.layer_id())
        })
        .collect()
}

fn layer(stage: &Stage, id: &str) -> Layer {
    stage
        .design()
        .layers
        .iter()
        .find_map(|l| l.find(id))
        .cloned()
        .unwrap_or_else(|| panic!("layer {id} missing"))
}

fn content(stage: &Stage, id: &str) -> NodeRef {
    stage.record(id).unwrap_or_else(|| panic!("layer {id} not rendered")).content
}

fn attr(graph: &SceneGraph, node: NodeRef, name: &str) -> Option<String> {
    graph.attr(node, name).map(ToString::to_string)
}

fn layer_order(stage: &Stage) -> Vec<String> {
    let graph = stage.graph();
    graph
        .children(graph.root())
        .iter()
        .filter_map(|&n| attr(graph, n, "data-layer-id"))
        .collect()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn write_png(path: &Path) -> String {
    std::fs::write(path, png_bytes(2, 2)).unwrap();
    path.to_string_lossy().into_owned()
}

// ========== mount ==========

#[test]
fn test_mount_builds_scene() {
    let stage = stage_with(json!([
        { "id": "a", "type": "shape", "zIndex": 1 },
        { "id": "b", "type": "text", "properties": { "text": "Hi" } },
        { "id": "ghost", "type": "shape", "visible": false }
    ]));
    assert_eq!(layer_order(&stage), ["b", "a"]);
    assert!(stage.record("ghost").is_none());

    let graph = stage.graph();
    let root_children = graph.children(graph.root());
    assert_eq!(root_children[0], stage.defs());
    assert_eq!(attr(graph, root_children[1], "data-role").as_deref(), Some("background"));
    assert_eq!(attr(graph, root_children[1], "width").as_deref(), Some("400"));

    let snapshot = serde_json::to_value(stage.snapshot().unwrap()).unwrap();
    assert_eq!(snapshot["tag"], "g");
    assert_eq!(snapshot["children"][0]["tag"], "defs");
}

#[test]
fn test_gradient_definitions_live_in_scene_defs() {
    let fill = json!({ "type": "linear", "stops": [
        { "color": "#ff0000", "stop": 0 }, { "color": "#0000ff", "stop": 1 }
    ]});
    let stage = stage_with(json!([
        { "id": "a", "type": "shape", "properties": { "fill": fill.clone() } },
        { "id": "b", "type": "shape", "properties": { "fill": fill } }
    ]));
    let graph = stage.graph();
    let defs = graph.children(stage.defs());
    assert_eq!(defs.len(), 1);
    let id = attr(graph, defs[0], "id").unwrap();
    assert_eq!(attr(graph, content(&stage, "a"), "fill"), Some(format!("url(#{id})")));
}

// ========== update ==========

#[test]
fn test_paint_change_patches_in_place() {
    let mut stage = stage_with(json!([{ "id": "s", "type": "shape", "properties": { "fill": "#ff0000" } }]));
    let events = record_events(&mut stage);
    let before = stage.record("s").cloned().unwrap();

    let mut changed = layer(&stage, "s");
    changed.properties = LayerProperties::from_value(
        &changed.layer_type,
        json!({ "fill": "#00ff00", "stroke": "#000000", "strokeWidth": 3 }),
    );
    changed.transform.opacity = Some(0.5);
    assert_eq!(stage.update(changed), Ok(UpdatePath::Patched));

    let after = stage.record("s").unwrap();
    assert_eq!(after.wrapper, before.wrapper);
    assert_eq!(after.content, before.content);
    let graph = stage.graph();
    assert_eq!(attr(graph, after.content, "fill").as_deref(), Some("#00ff00"));
    assert_eq!(attr(graph, after.content, "stroke-width").as_deref(), Some("3"));
    assert_eq!(attr(graph, after.wrapper, "opacity").as_deref(), Some("0.5"));
    assert_eq!(
        *events.borrow(),
        [SceneEvent::Update {
            layer_id: "s".into(),
            rebuilt: false
        }]
    );
}

#[test]
fn test_repeated_gradient_edits_keep_scene_bounded() {
    let gradient = |red: u8| {
        json!({ "fill": { "type": "linear", "stops": [
            { "color": format!("#{red:02x}0000"), "stop": 0 },
            { "color": "#0000ff", "stop": 1 }
        ]}})
    };
    let mut stage = stage_with(json!([{ "id": "s", "type": "shape", "properties": gradient(0) }]));
    let mut arena = None;
    for red in 1..=50 {
        let mut changed = layer(&stage, "s");
        changed.properties = LayerProperties::from_value(&changed.layer_type, gradient(red));
        assert_eq!(stage.update(changed), Ok(UpdatePath::Patched));
        let size = stage.graph().arena_len();
        assert_eq!(*arena.get_or_insert(size), size);
    }

    let graph = stage.graph();
    let defs = graph.children(stage.defs());
    assert_eq!(defs.len(), 1);
    assert_eq!(graph.kind(defs[0]).map(|k| k.tag()), Some("linearGradient"));
    let id = attr(graph, defs[0], "id").unwrap();
    assert_eq!(attr(graph, content(&stage, "s"), "fill"), Some(format!("url(#{id})")));
    let stop = graph.children(defs[0])[0];
    assert_eq!(attr(graph, stop, "stop-color").as_deref(), Some("#320000"));
}

#[test]
fn test_geometry_change_rebuilds_at_same_position() {
    let mut stage = stage_with(json!([
        { "id": "a", "type": "shape" },
        { "id": "b", "type": "shape" },
        { "id": "c", "type": "shape" }
    ]));
    let old = stage.record("b").cloned().unwrap();
    let mut changed = layer(&stage, "b");
    changed.properties =
        LayerProperties::from_value(&changed.layer_type, json!({ "shapeType": "circle" }));
    assert_eq!(stage.update(changed), Ok(UpdatePath::Rebuilt));

    let new = stage.record("b").unwrap();
    assert_ne!(new.wrapper, old.wrapper);
    assert!(!stage.graph().is_attached(old.wrapper));
    assert_eq!(stage.graph().kind(new.content).map(|k| k.tag()), Some("circle"));
    assert_eq!(layer_order(&stage), ["a", "b", "c"]);
}

#[test]
fn test_reordering_remounts() {
    let mut stage = stage_with(json!([
        { "id": "a", "type": "shape" },
        { "id": "b", "type": "shape" }
    ]));
    let mut changed = layer(&stage, "a");
    changed.z_index = 10;
    assert_eq!(stage.update(changed), Ok(UpdatePath::Remounted));
    assert_eq!(layer_order(&stage), ["b", "a"]);
}

#[test]
fn test_visibility_round_trip() {
    let mut stage = stage_with(json!([
        { "id": "a", "type": "shape" },
        { "id": "b", "type": "shape" }
    ]));
    let mut hidden = layer(&stage, "a");
    hidden.visible = false;
    assert_eq!(stage.update(hidden.clone()), Ok(UpdatePath::Rebuilt));
    assert!(stage.record("a").is_none());
    assert_eq!(layer_order(&stage), ["b"]);

    hidden.visible = true;
    assert_eq!(stage.update(hidden), Ok(UpdatePath::Remounted));
    assert_eq!(layer_order(&stage), ["a", "b"]);
}

#[test]
fn test_update_unknown_layer_fails() {
    let mut stage = stage_with(json!([]));
    let stray = Layer::new("nope", lumen_model::LayerType::Shape, Transform::default());
    assert_eq!(stage.update(stray), Err(SceneError::NotFound("nope".into())));
}

#[test]
fn test_group_child_rebuild_keeps_parent() {
    let mut stage = stage_with(json!([{
        "id": "g", "type": "group",
        "transform": { "width": 200, "height": 200 },
        "children": [
            { "id": "c1", "type": "shape" },
            { "id": "c2", "type": "shape" }
        ]
    }]));
    let mut changed = layer(&stage, "c2");
    changed.properties =
        LayerProperties::from_value(&changed.layer_type, json!({ "shapeType": "ellipse" }));
    assert_eq!(stage.update(changed), Ok(UpdatePath::Rebuilt));

    let record = stage.record("c2").unwrap();
    assert_eq!(record.parent.as_deref(), Some("g"));
    let group_content = content(&stage, "g");
    let children = stage.graph().children(group_content);
    assert_eq!(children.len(), 2);
    assert_eq!(children[1], record.wrapper);
}

// ========== remove ==========

#[test]
fn test_remove_group_drops_children_and_selection() {
    let mut stage = stage_with(json!([
        { "id": "g", "type": "group", "children": [{ "id": "inner", "type": "shape" }] },
        { "id": "other", "type": "shape" }
    ]));
    stage.select("inner").unwrap();
    let events = record_events(&mut stage);
    let wrapper = stage.record("g").unwrap().wrapper;

    stage.remove_layer("g").unwrap();
    assert!(stage.record("g").is_none());
    assert!(stage.record("inner").is_none());
    assert!(!stage.graph().is_attached(wrapper));
    assert_eq!(stage.selected(), None);
    assert_eq!(names(&events), ["layer:deselect inner", "layer:remove g"]);
    assert_eq!(layer_order(&stage), ["other"]);
    assert_eq!(stage.remove_layer("g"), Err(SceneError::NotFound("g".into())));
}

// ========== selection & movement ==========

#[test]
fn test_selection_events() {
    let mut stage = stage_with(json!([
        { "id": "a", "type": "shape" },
        { "id": "b", "type": "shape" },
        { "id": "h", "type": "shape", "visible": false }
    ]));
    let events = record_events(&mut stage);
    stage.select("a").unwrap();
    stage.select("a").unwrap();
    stage.select("b").unwrap();
    assert_eq!(stage.deselect().as_deref(), Some("b"));
    assert_eq!(stage.deselect(), None);
    assert_eq!(
        names(&events),
        ["layer:select a", "layer:deselect a", "layer:select b", "layer:deselect b"]
    );
    assert_eq!(stage.select("zzz"), Err(SceneError::NotFound("zzz".into())));
    assert_eq!(stage.select("h"), Err(SceneError::NotRendered("h".into())));
}

#[test]
fn test_filtered_subscription() {
    let mut stage = stage_with(json!([{ "id": "a", "type": "shape" }]));
    let moves = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&moves);
    let id = stage.subscribe(Some(EventKind::PositionChange), move |_| {
        *counter.borrow_mut() += 1;
    });
    stage.select("a").unwrap();
    stage.move_layer("a", 1.0, 1.0).unwrap();
    assert!(stage.unsubscribe(id));
    stage.move_layer("a", 2.0, 2.0).unwrap();
    assert_eq!(*moves.borrow(), 1);
}

#[test]
fn test_move_updates_wrapper_only() {
    let mut stage = stage_with(json!([{
        "id": "a", "type": "shape",
        "transform": { "x": 0, "y": 0, "width": 50, "height": 50, "rotation": 90 }
    }]));
    let events = record_events(&mut stage);
    let before = stage.record("a").cloned().unwrap();
    stage.move_layer("a", 30.0, 40.0).unwrap();

    let after = stage.record("a").unwrap();
    assert_eq!(after, &before);
    assert_eq!(
        attr(stage.graph(), after.wrapper, "transform").as_deref(),
        Some("translate(30 40) rotate(90 25 25)")
    );
    assert_eq!(layer(&stage, "a").transform.x, Some(30.0));
    assert_eq!(
        *events.borrow(),
        [SceneEvent::PositionChange {
            layer_id: "a".into(),
            x: 30.0,
            y: 40.0
        }]
    );
}

#[test]
fn test_locked_layer_can_be_selected_but_not_moved() {
    let mut stage = stage_with(json!([{ "id": "l", "type": "shape", "locked": true }]));
    stage.select("l").unwrap();
    assert_eq!(stage.move_layer("l", 5.0, 5.0), Err(SceneError::Locked("l".into())));
    assert_eq!(
        stage.transform_layer("l", Transform::from_rect(0.0, 0.0, 10.0, 10.0)),
        Err(SceneError::Locked("l".into()))
    );
    assert_eq!(layer(&stage, "l").transform.x, None);
}

#[test]
fn test_transform_layer_resizes() {
    let mut stage = stage_with(json!([{ "id": "a", "type": "shape" }]));
    let events = record_events(&mut stage);
    let path = stage
        .transform_layer("a", Transform::from_rect(10.0, 10.0, 200.0, 80.0))
        .unwrap();
    assert_eq!(path, UpdatePath::Rebuilt);
    let graph = stage.graph();
    assert_eq!(attr(graph, content(&stage, "a"), "width").as_deref(), Some("200"));
    assert_eq!(names(&events), ["layer:update a", "layer:transformchange a"]);
}

// ========== hit testing ==========

#[test]
fn test_hit_test_prefers_topmost_and_deepest() {
    let stage = stage_with(json!([
        { "id": "back", "type": "shape", "transform": { "x": 0, "y": 0, "width": 100, "height": 100 } },
        { "id": "front", "type": "shape", "transform": { "x": 50, "y": 50, "width": 100, "height": 100 } },
        {
            "id": "g", "type": "group", "zIndex": -1,
            "transform": { "x": 200, "y": 0, "width": 100, "height": 100 },
            "children": [
                { "id": "child", "type": "shape", "transform": { "x": 10, "y": 10, "width": 20, "height": 20 } }
            ]
        },
        { "id": "hidden", "type": "shape", "visible": false, "transform": { "width": 400, "height": 300 } }
    ]));
    assert_eq!(stage.hit_test(75.0, 75.0).as_deref(), Some("front"));
    assert_eq!(stage.hit_test(25.0, 25.0).as_deref(), Some("back"));
    assert_eq!(stage.hit_test(215.0, 15.0).as_deref(), Some("child"));
    assert_eq!(stage.hit_test(280.0, 80.0).as_deref(), Some("g"));
    assert_eq!(stage.hit_test(390.0, 290.0), None);
}

// ========== deferred content ==========

#[test]
fn test_image_loads_in_background() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_png(&dir.path().join("pic.png"));
    let mut stage = stage_with(json!([{ "id": "img", "type": "image", "properties": { "src": src } }]));
    let events = record_events(&mut stage);

    let placeholder = content(&stage, "img");
    assert_eq!(
        attr(stage.graph(), placeholder, "data-placeholder").as_deref(),
        Some("loading")
    );
    assert_eq!(stage.record("img").unwrap().pending, [src.clone()]);

    assert!(stage.wait_for_loads(WAIT));
    let loaded = content(&stage, "img");
    assert!(attr(stage.graph(), loaded, "data-placeholder").is_none());
    let hrefs = stage.graph().find_with_attr(loaded, "href");
    assert_eq!(hrefs.len(), 1);
    assert!(
        attr(stage.graph(), hrefs[0], "href")
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert_eq!(
        *events.borrow(),
        [SceneEvent::ContentLoad {
            layer_id: "img".into(),
            src
        }]
    );
}

#[test]
fn test_missing_image_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("absent.png").to_string_lossy().into_owned();
    let mut stage = stage_with(json!([{ "id": "img", "type": "image", "properties": { "src": src } }]));
    let events = record_events(&mut stage);
    assert!(stage.wait_for_loads(WAIT));
    assert_eq!(
        attr(stage.graph(), content(&stage, "img"), "data-placeholder").as_deref(),
        Some("error")
    );
    assert_eq!(names(&events), ["layer:contenterror img"]);
}

#[test]
fn test_completion_for_removed_layer_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_png(&dir.path().join("pic.png"));
    let mut stage = stage_with(json!([{ "id": "img", "type": "image", "properties": { "src": src } }]));
    stage.remove_layer("img").unwrap();
    let events = record_events(&mut stage);
    assert!(stage.wait_for_loads(WAIT));
    assert!(events.borrow().is_empty());
    assert_eq!(stage.pending_loads(), 0);
}

#[test]
fn test_shared_source_fetches_once_and_fills_both() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_png(&dir.path().join("pic.png"));
    let mut stage = stage_with(json!([
        { "id": "a", "type": "image", "properties": { "src": src } },
        { "id": "b", "type": "image", "properties": { "src": src } }
    ]));
    assert_eq!(stage.pending_loads(), 1);
    assert!(stage.wait_for_loads(WAIT));
    for id in ["a", "b"] {
        assert!(attr(stage.graph(), content(&stage, id), "data-placeholder").is_none());
    }
}

#[test]
fn test_reload_source_refetches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pic.png");
    let src = path.to_string_lossy().into_owned();
    let mut stage = stage_with(json!([{ "id": "img", "type": "image", "properties": { "src": src } }]));
    assert!(stage.wait_for_loads(WAIT));
    assert_eq!(
        attr(stage.graph(), content(&stage, "img"), "data-placeholder").as_deref(),
        Some("error")
    );

    let _ = write_png(&path);
    assert_eq!(stage.reload_source(&src), 1);
    assert_eq!(
        attr(stage.graph(), content(&stage, "img"), "data-placeholder").as_deref(),
        Some("loading")
    );
    assert!(stage.wait_for_loads(WAIT));
    assert!(attr(stage.graph(), content(&stage, "img"), "data-placeholder").is_none());
}

// ========== vector sources ==========

#[test]
fn test_vector_elements_projection() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect id="r" class="box" fill="#ff0000"/><circle stroke="#000" stroke-width="2"/></svg>"##;
    let src = lumen_common::net::to_data_url("image/svg+xml", svg.as_bytes());
    let stage = stage_with(json!([
        { "id": "v", "type": "vector-source", "properties": { "src": src } },
        { "id": "s", "type": "shape" }
    ]));
    let elements = stage.vector_elements("v").unwrap();
    let json = serde_json::to_value(&elements).unwrap();
    assert_eq!(
        json,
        json!([
            { "type": "rect", "id": "r", "className": "box", "originalFill": "#ff0000" },
            { "type": "circle", "originalStroke": "#000", "originalStrokeWidth": "2" }
        ])
    );
    assert!(matches!(
        stage.vector_elements("s"),
        Err(SceneError::NotVector { .. })
    ));
    assert_eq!(
        stage.vector_elements("missing"),
        Err(SceneError::NotFound("missing".into()))
    );
}

#[test]
fn test_vector_elements_wait_for_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.svg");
    std::fs::write(&path, r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0"/></svg>"#)
        .unwrap();
    let mut stage = stage_with(json!([
        { "id": "v", "type": "svg", "properties": { "src": path.to_string_lossy() } }
    ]));
    assert_eq!(
        attr(stage.graph(), content(&stage, "v"), "data-placeholder").as_deref(),
        Some("loading")
    );
    assert!(stage.wait_for_loads(WAIT));
    assert_eq!(stage.vector_elements("v").unwrap().len(), 1);
    let group = content(&stage, "v");
    assert!(attr(stage.graph(), group, "data-placeholder").is_none());
}

// ========== parity with the static target ==========

fn scene_attrs(graph: &SceneGraph, node: NodeRef) -> BTreeMap<String, String> {
    graph
        .node(node)
        .map(|n| {
            n.attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn markup_attrs(node: roxmltree::Node<'_, '_>) -> BTreeMap<String, String> {
    node.attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect()
}

#[test]
fn test_scene_matches_export() {
    let layers = json!([
        {
            "id": "title", "type": "text",
            "transform": { "x": 10, "y": 10, "width": 120, "height": 60, "rotation": 15 },
            "properties": { "text": "Hello\nWorld", "fontSize": 18, "color": "#333333", "filters": { "blur": 1 } }
        },
        {
            "id": "star", "type": "shape", "zIndex": 2,
            "transform": { "x": 150, "y": 20, "width": 80, "height": 80, "opacity": 0.8 },
            "properties": {
                "shapeType": "star", "points": 6,
                "fill": { "type": "radial", "stops": [{ "color": "#ffcc00", "stop": 0 }, { "color": "#ff6600", "stop": 1 }] },
                "stroke": "#000000", "strokeWidth": 2, "strokeStyle": "dotted",
                "shadow": { "enabled": true, "blur": 6, "offsetX": 2, "offsetY": 2 }
            }
        },
        {
            "id": "frame", "type": "group",
            "transform": { "x": 20, "y": 120, "width": 200, "height": 120 },
            "properties": { "clipPath": { "enabled": true, "type": "circle" }, "background": "#eeeeee" },
            "children": [
                { "id": "bar", "type": "shape", "properties": { "shapeType": "rectangle", "cornerRadius": 8 } },
                { "id": "wave", "type": "audio", "transform": { "width": 120, "height": 40 } }
            ]
        }
    ]);
    let design =
        Design::from_json(&json!({ "width": 320, "height": 260, "layers": layers }).to_string())
            .unwrap();

    let export = export_svg(
        &design,
        &ExportOptions {
            fetch: offline(),
            ..ExportOptions::default()
        },
    );
    let doc = roxmltree::Document::parse(&export.markup).unwrap();

    let mut stage = Stage::new(StageOptions {
        fetch: offline(),
        ..StageOptions::default()
    });
    stage.mount(design);
    let graph = stage.graph();

    assert_eq!(export.layers.len(), stage.records().count());
    for exported in &export.layers {
        let live = stage.record(&exported.layer_id).unwrap();
        assert_eq!(live.structure_key, exported.structure_key);
        assert_eq!(live.parent, exported.parent);

        let wrapper = doc
            .descendants()
            .find(|n| n.attribute("data-layer-id") == Some(exported.layer_id.as_str()))
            .unwrap();
        assert_eq!(markup_attrs(wrapper), scene_attrs(graph, live.wrapper));
        let content = wrapper.children().find(roxmltree::Node::is_element).unwrap();
        assert_eq!(
            markup_attrs(content),
            scene_attrs(graph, live.content),
            "{}",
            exported.layer_id
        );
    }

    let exported_defs: Vec<String> = doc
        .descendants()
        .find(|n| n.has_tag_name("defs"))
        .unwrap()
        .children()
        .filter_map(|n| n.attribute("id").map(str::to_string))
        .collect();
    let live_defs: Vec<String> = graph
        .children(stage.defs())
        .iter()
        .filter_map(|&n| attr(graph, n, "id"))
        .collect();
    assert_eq!(exported_defs, live_defs);
}
