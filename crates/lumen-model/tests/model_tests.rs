//! Tests for design decoding: ordering, unknown types, malformed fields.

use lumen_model::{
    ClipInput, Design, FillInput, Layer, LayerProperties, LayerType, Transform,
    paint_order,
};
use serde_json::json;

fn design(value: serde_json::Value) -> Design {
    serde_json::from_value(value).expect("design should decode")
}

// ========== layer types ==========

#[test]
fn test_layer_type_names() {
    assert_eq!(LayerType::parse("text"), LayerType::Text);
    assert_eq!(LayerType::parse("Vector-Source"), LayerType::VectorSource);
    assert_eq!(LayerType::parse("svg"), LayerType::VectorSource);
    assert_eq!(LayerType::parse("group"), LayerType::Group);
    assert_eq!(
        LayerType::parse("sticker"),
        LayerType::Unknown("sticker".to_string())
    );
    assert_eq!(LayerType::VectorSource.name(), "vector-source");
    assert_eq!(LayerType::Unknown("sticker".into()).name(), "sticker");
}

#[test]
fn test_unknown_layer_type_keeps_payload() {
    let d = design(json!({
        "layers": [{ "id": "a", "type": "sticker", "properties": { "emoji": "x" } }]
    }));
    assert_eq!(d.layers.len(), 1);
    assert_eq!(d.layers[0].layer_type, LayerType::Unknown("sticker".into()));
    assert_eq!(
        d.layers[0].properties,
        LayerProperties::Unknown(json!({ "emoji": "x" }))
    );
}

// ========== ordering ==========

#[test]
fn test_round_trip_preserves_layer_order() {
    let d = design(json!({
        "width": 800,
        "height": 600,
        "layers": [
            { "id": "c", "type": "shape" },
            { "id": "a", "type": "text", "properties": { "text": "hello" } },
            { "id": "b", "type": "group", "children": [
                { "id": "b2", "type": "shape" },
                { "id": "b1", "type": "shape" }
            ]}
        ]
    }));
    let text = d.to_json().expect("encode");
    let again = Design::from_json(&text).expect("decode");

    let ids: Vec<&str> = again.layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["c", "a", "b"]);
    let child_ids: Vec<&str> = again.layers[2]
        .children
        .iter()
        .map(|l| l.id.as_str())
        .collect();
    assert_eq!(child_ids, ["b2", "b1"]);
    assert_eq!(again, d);
}

#[test]
fn test_paint_order_is_stable() {
    let d = design(json!({
        "layers": [
            { "id": "top", "type": "shape", "zIndex": 5 },
            { "id": "first", "type": "shape" },
            { "id": "second", "type": "shape" },
            { "id": "back", "type": "shape", "zIndex": -1 }
        ]
    }));
    let ids: Vec<&str> = paint_order(&d.layers).iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["back", "first", "second", "top"]);
}

// ========== lenient fields ==========

#[test]
fn test_malformed_fields_become_absent() {
    let d = design(json!({
        "width": "1024",
        "height": { "bad": true },
        "layers": [{
            "id": "s",
            "type": "shape",
            "visible": "false",
            "transform": { "x": "10", "y": [1], "width": 50 },
            "properties": { "sides": "many", "fill": 42, "strokeWidth": "3" }
        }]
    }));
    assert_eq!(d.width, Some(1024.0));
    assert_eq!(d.height, None);

    let layer = &d.layers[0];
    assert!(!layer.visible);
    assert_eq!(layer.transform.x, Some(10.0));
    assert_eq!(layer.transform.y, None);
    assert_eq!(layer.transform.width, Some(50.0));
    let LayerProperties::Shape(props) = &layer.properties else {
        panic!("expected shape properties");
    };
    assert_eq!(props.sides, None);
    assert_eq!(props.fill, None);
    assert_eq!(props.stroke_width, Some(3.0));
}

#[test]
fn test_non_object_layers_are_dropped() {
    let d = design(json!({
        "layers": [7, "nope", { "id": "ok", "type": "text" }]
    }));
    assert_eq!(d.layers.len(), 1);
    assert_eq!(d.layers[0].id, "ok");
}

#[test]
fn test_non_object_properties_use_defaults() {
    let d = design(json!({
        "layers": [{ "id": "t", "type": "text", "properties": "oops" }]
    }));
    assert_eq!(
        d.layers[0].properties,
        LayerProperties::Text(Default::default())
    );
}

#[test]
fn test_defaults_for_missing_flags() {
    let d = design(json!({ "layers": [{ "id": "x", "type": "image" }] }));
    let layer = &d.layers[0];
    assert!(layer.visible);
    assert!(!layer.locked);
    assert_eq!(layer.z_index, 0);
    assert_eq!(layer.transform, Transform::default());
    assert!(layer.plugin_state.is_none());
}

// ========== aliases and unions ==========

#[test]
fn test_property_aliases() {
    let d = design(json!({
        "layers": [
            { "id": "s", "type": "shape", "properties": { "innerRatio": 0.3 } },
            { "id": "v", "type": "svg", "properties": {
                "colorOverrides": { "global": { "fill": "#ff0000" } }
            }}
        ]
    }));
    let LayerProperties::Shape(shape) = &d.layers[0].properties else {
        panic!("expected shape");
    };
    assert_eq!(shape.inner_radius, Some(0.3));
    let LayerProperties::VectorSource(vector) = &d.layers[1].properties else {
        panic!("expected vector source");
    };
    let overrides = vector.style_overrides.as_ref().expect("overrides");
    assert_eq!(overrides["global"].fill.as_deref(), Some("#ff0000"));
}

#[test]
fn test_fill_shorthand_and_config() {
    let d = design(json!({
        "background": "#fafafa",
        "layers": [{ "id": "s", "type": "shape", "properties": {
            "fill": { "type": "linear", "angle": 90, "stops": [
                { "color": "#000", "stop": 0 },
                { "color": "#fff", "offset": 1 }
            ]}
        }}]
    }));
    assert_eq!(d.background, Some(FillInput::color("#fafafa")));
    let LayerProperties::Shape(shape) = &d.layers[0].properties else {
        panic!("expected shape");
    };
    let Some(FillInput::Config(config)) = &shape.fill else {
        panic!("expected fill config");
    };
    assert_eq!(config.fill_type.as_deref(), Some("linear"));
    let stops = config.stops.as_ref().expect("stops");
    assert_eq!(stops[1].stop, Some(1.0));
}

#[test]
fn test_clip_shorthand_and_points() {
    let d = design(json!({
        "layers": [
            { "id": "g1", "type": "group", "properties": { "clipPath": true } },
            { "id": "g2", "type": "group", "properties": { "clipPath": {
                "type": "polygon", "points": [[0, 0], { "x": 10, "y": 5 }]
            }}}
        ]
    }));
    let LayerProperties::Group(first) = &d.layers[0].properties else {
        panic!("expected group");
    };
    assert_eq!(first.clip_path, Some(ClipInput::Flag(true)));
    let LayerProperties::Group(second) = &d.layers[1].properties else {
        panic!("expected group");
    };
    let Some(ClipInput::Config(config)) = &second.clip_path else {
        panic!("expected clip config");
    };
    assert_eq!(config.enabled, None);
    let points: Vec<(f64, f64)> = config
        .points
        .as_ref()
        .expect("points")
        .iter()
        .map(|p| p.xy())
        .collect();
    assert_eq!(points, [(0.0, 0.0), (10.0, 5.0)]);
}

#[test]
fn test_effects_are_shared_fields() {
    let d = design(json!({
        "layers": [{ "id": "t", "type": "text", "properties": {
            "text": "x",
            "shadow": { "enabled": true, "blur": 4 },
            "filters": { "blur": 2, "hue": 90 }
        }}]
    }));
    let effects = d.layers[0].properties.effects().expect("effects");
    assert_eq!(effects.shadow.as_ref().and_then(|s| s.blur), Some(4.0));
    let filters = effects.filters.as_ref().expect("filters");
    assert_eq!(filters.hue_rotate, Some(90.0));
}

#[test]
fn test_find_layer_descends_into_groups() {
    let d = design(json!({
        "layers": [{ "id": "g", "type": "group", "children": [
            { "id": "inner", "type": "text" }
        ]}]
    }));
    assert_eq!(d.find_layer("inner").map(|l| &l.layer_type), Some(&LayerType::Text));
    assert!(d.find_layer("missing").is_none());
}

#[test]
fn test_plugin_state_passes_through() {
    let mut layer = Layer::new("p", LayerType::Image, Transform::from_rect(0.0, 0.0, 10.0, 10.0));
    layer.plugin_state = Some(json!({ "bg-remove": { "done": true } }));
    let encoded = serde_json::to_value(&layer).expect("encode");
    assert_eq!(encoded["pluginState"]["bg-remove"]["done"], json!(true));
    let decoded: Layer = serde_json::from_value(encoded).expect("decode");
    assert_eq!(decoded, layer);
}
