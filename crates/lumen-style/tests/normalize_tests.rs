//! Tests for the property normalizer.

use lumen_model::{Design, LayerProperties};
use lumen_style::{
    Clip, Color, Fill, FontWeight, Mask, MaskShape, ObjectFit, ResolvedProperties, ShapeType,
    StrokeStyle, TextAlign, normalize_layer, rules,
};
use quickcheck_macros::quickcheck;
use serde_json::{Value, json};

fn resolve(layer: Value) -> lumen_style::ResolvedLayer {
    let design: Design =
        serde_json::from_value(json!({ "layers": [layer] })).expect("design decodes");
    normalize_layer(&design.layers[0])
}

fn group(props: Value) -> lumen_style::GroupStyle {
    let resolved = resolve(json!({
        "id": "g", "type": "group",
        "transform": { "width": 200, "height": 100 },
        "properties": props
    }));
    match resolved.properties {
        ResolvedProperties::Group(g) => g,
        other => panic!("expected group, got {other:?}"),
    }
}

// ========== clamping ==========

#[test]
fn test_filter_clamping() {
    let layer = resolve(json!({
        "id": "t", "type": "text",
        "properties": { "filters": { "brightness": 10, "blur": -5, "hue": 900 } }
    }));
    assert_eq!(layer.effects.filters.brightness, 3.0);
    assert_eq!(layer.effects.filters.blur, 0.0);
    assert_eq!(layer.effects.filters.hue_rotate, 360.0);
}

#[test]
fn test_invalid_color_is_black() {
    let layer = resolve(json!({
        "id": "t", "type": "text", "properties": { "color": "not-a-color" }
    }));
    let ResolvedProperties::Text(text) = layer.properties else {
        panic!("expected text");
    };
    assert_eq!(text.fill, Fill::solid(Color::BLACK));
    assert_eq!(Color::BLACK.to_hex(), "#000000");
}

#[test]
fn test_transform_defaults() {
    let layer = resolve(json!({ "id": "s", "type": "shape" }));
    let t = layer.transform;
    assert_eq!((t.x, t.y, t.width, t.height), (0.0, 0.0, 100.0, 100.0));
    assert_eq!((t.rotation, t.scale_x, t.scale_y, t.opacity), (0.0, 1.0, 1.0, 1.0));
}

#[test]
fn test_shape_defaults_and_ranges() {
    let layer = resolve(json!({
        "id": "s", "type": "shape",
        "properties": { "shapeType": "star", "points": 40, "innerRadius": 0.01,
                        "strokeStyle": "wavy", "strokeWidth": 500 }
    }));
    let ResolvedProperties::Shape(shape) = layer.properties else {
        panic!("expected shape");
    };
    assert_eq!(shape.shape_type, ShapeType::Star);
    assert_eq!(shape.points, 20);
    assert_eq!(shape.inner_radius, 0.1);
    assert_eq!(shape.stroke.style, StrokeStyle::Solid);
    assert_eq!(shape.stroke.width, 100.0);
    assert_eq!(shape.sides, 6);
}

#[test]
fn test_text_enums() {
    let layer = resolve(json!({
        "id": "t", "type": "text",
        "properties": { "textAlign": "CENTER", "fontWeight": 700, "fontSize": 0 }
    }));
    let ResolvedProperties::Text(text) = layer.properties else {
        panic!("expected text");
    };
    assert_eq!(text.text_align, TextAlign::Center);
    assert_eq!(text.font_weight, FontWeight::Numeric(700));
    assert_eq!(text.font_size, 1.0);
    assert!(!text.word_wrap);
}

#[test]
fn test_image_defaults() {
    let layer = resolve(json!({ "id": "i", "type": "image", "properties": { "src": "  " } }));
    let ResolvedProperties::Image(image) = layer.properties else {
        panic!("expected image");
    };
    assert_eq!(image.src, None);
    assert_eq!(image.object_fit, ObjectFit::Cover);
    assert_eq!(image.border, None);
}

#[test]
fn test_unknown_type_resolves_to_unknown() {
    let layer = resolve(json!({ "id": "x", "type": "hologram" }));
    assert_eq!(layer.properties, ResolvedProperties::Unknown);
}

// ========== effects ==========

#[test]
fn test_shadow_requires_enabled() {
    let off = resolve(json!({
        "id": "s", "type": "shape", "properties": { "shadow": { "blur": 3 } }
    }));
    assert!(off.effects.shadow.is_none());

    let on = resolve(json!({
        "id": "s", "type": "shape",
        "properties": { "shadow": { "enabled": true, "color": "rgba(255,0,0,0.5)" } }
    }));
    let shadow = on.effects.shadow.expect("shadow enabled");
    assert_eq!(shadow.color, Color::rgb(255, 0, 0));
    assert_eq!((shadow.blur, shadow.offset_x, shadow.offset_y), (10.0, 4.0, 4.0));
    assert!((shadow.opacity - 0.25).abs() < 1e-12);
}

#[test]
fn test_glow_defaults() {
    let layer = resolve(json!({
        "id": "s", "type": "shape", "properties": { "glow": { "enabled": "true" } }
    }));
    let glow = layer.effects.glow.expect("glow enabled");
    assert_eq!(glow.blur, 10.0);
    assert_eq!(glow.opacity, 0.8);
}

// ========== clip and mask shorthand ==========

#[test]
fn test_clip_true_is_bounds_rectangle() {
    let g = group(json!({ "clipPath": true }));
    assert_eq!(
        g.clip,
        Some(Clip::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 100.0,
            corner_radius: 0.0
        })
    );
}

#[test]
fn test_clip_object_without_enabled_is_disabled() {
    assert_eq!(group(json!({ "clipPath": { "type": "circle" } })).clip, None);
    assert_eq!(group(json!({ "clipPath": false })).clip, None);
    assert_eq!(group(json!({})).clip, None);
}

#[test]
fn test_clip_circle_defaults() {
    let g = group(json!({ "clipPath": { "enabled": true, "type": "circle" } }));
    assert_eq!(
        g.clip,
        Some(Clip::Circle {
            cx: 100.0,
            cy: 50.0,
            r: 50.0
        })
    );
}

#[test]
fn test_clip_polygon_default_triangle() {
    let g = group(json!({ "clipPath": { "enabled": true, "type": "polygon", "points": [[1, 1]] } }));
    assert_eq!(
        g.clip,
        Some(Clip::Polygon {
            points: vec![(100.0, 0.0), (200.0, 100.0), (0.0, 100.0)]
        })
    );
}

#[test]
fn test_invalid_clip_path_disables_clip() {
    let bad = group(json!({
        "clipPath": { "enabled": true, "type": "path", "path": "M0 0 L10 10\"/><script>" }
    }));
    assert_eq!(bad.clip, None);
    let good = group(json!({
        "clipPath": { "enabled": true, "type": "path", "path": "M0 0 L10 10 Z" }
    }));
    assert_eq!(
        good.clip,
        Some(Clip::Path {
            data: "M0 0 L10 10 Z".into()
        })
    );
}

#[test]
fn test_mask_shorthand() {
    let Some(Mask::Gradient { stops, .. }) = group(json!({ "mask": true })).mask else {
        panic!("expected gradient mask");
    };
    assert_eq!(stops.len(), 2);
    assert_eq!((stops[0].opacity, stops[1].opacity), (1.0, 0.0));

    let shape = group(json!({ "mask": { "enabled": true, "type": "shape", "shape": "ellipse" } }));
    assert_eq!(
        shape.mask,
        Some(Mask::Shape {
            shape: MaskShape::Ellipse
        })
    );
    assert_eq!(group(json!({ "mask": { "type": "shape" } })).mask, None);
    assert_eq!(
        group(json!({ "mask": { "enabled": true, "type": "image" } })).mask,
        None
    );
}

// ========== vector overrides ==========

#[test]
fn test_override_precedence_per_property() {
    let layer = resolve(json!({
        "id": "v", "type": "vector-source",
        "properties": { "styleOverrides": {
            "global": { "fill": "#111111", "stroke": "#222222", "strokeWidth": 1 },
            "path": { "fill": "#ff0000" },
            "#logo": { "fill": "#00ff00", "stroke": "#0000ff" },
            ".accent": { "strokeWidth": 7 }
        }}
    }));
    let ResolvedProperties::VectorSource(vector) = layer.properties else {
        panic!("expected vector source");
    };
    let style = vector.overrides.resolve("path", Some("logo"), &["accent"]);
    assert_eq!(style.fill, Some(Color::rgb(255, 0, 0)));
    assert_eq!(style.stroke, Some(Color::rgb(0, 0, 255)));
    assert_eq!(style.stroke_width, Some(7.0));

    let other = vector.overrides.resolve("circle", None, &[]);
    assert_eq!(other.fill, Some(Color::rgb(0x11, 0x11, 0x11)));
    assert_eq!(other.stroke_width, Some(1.0));
}

#[test]
fn test_properties_decoded_for_type() {
    let design: Design = serde_json::from_value(json!({
        "layers": [{ "id": "a", "type": "audio", "properties": { "title": "Intro" } }]
    }))
    .expect("decodes");
    assert!(matches!(design.layers[0].properties, LayerProperties::Audio(_)));
}

// ========== properties ==========

#[quickcheck]
fn prop_rules_always_land_in_range(raw: Option<f64>) -> bool {
    [
        rules::SIZE,
        rules::OPACITY,
        rules::FONT_SIZE,
        rules::LEVEL,
        rules::BLUR,
        rules::HUE_ROTATE,
        rules::SHADOW_OFFSET,
        rules::INNER_RADIUS,
    ]
    .iter()
    .all(|rule| {
        let v = rule.apply(raw);
        v.is_finite() && v >= rule.min && v <= rule.max
    })
}

#[quickcheck]
fn prop_in_range_values_are_untouched(raw: f64) -> bool {
    let rule = rules::LEVEL;
    if !raw.is_finite() || raw < rule.min || raw > rule.max {
        return true;
    }
    rule.apply(Some(raw)) == raw
}

#[quickcheck]
fn prop_color_parse_never_panics(input: String) -> bool {
    let _ = Color::parse(&input);
    lumen_style::resolve_color(Some(&input), Color::WHITE).alpha <= 1.0
}
