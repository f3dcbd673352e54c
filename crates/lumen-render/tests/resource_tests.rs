//! Resource interning: one definition per distinct paint in a pass.

use std::collections::HashSet;

use lumen_render::resources::{LinearGradientDef, MaskDef};
use lumen_render::{ResourceCollection, ResourceDefinition, resolve_fill, url_references};
use lumen_style::{
    Color, Fill, GradientStop, LinearGradient, PatternFill, PatternKind, RadialGradient,
};
use quickcheck_macros::quickcheck;

fn stops(a: (u8, u8, u8), b: (u8, u8, u8)) -> Vec<GradientStop> {
    vec![
        GradientStop {
            offset: 0.0,
            color: Color::rgb(a.0, a.1, a.2),
            opacity: 1.0,
        },
        GradientStop {
            offset: 1.0,
            color: Color::rgb(b.0, b.1, b.2),
            opacity: 1.0,
        },
    ]
}

#[quickcheck]
fn prop_linear_resolution_is_idempotent(angle: i16, a: (u8, u8, u8), b: (u8, u8, u8)) -> bool {
    let fill = Fill::Linear(LinearGradient {
        angle: f64::from(angle % 360),
        stops: stops(a, b),
    });
    let mut resources = ResourceCollection::new();
    let first = resolve_fill(&fill, &mut resources);
    let second = resolve_fill(&fill, &mut resources);
    first == second && resources.len() == 1
}

#[quickcheck]
fn prop_radial_resolution_is_idempotent(cx: u8, cy: u8, a: (u8, u8, u8), b: (u8, u8, u8)) -> bool {
    let fill = Fill::Radial(RadialGradient {
        center_x: f64::from(cx) / 255.0,
        center_y: f64::from(cy) / 255.0,
        radius: 0.5,
        stops: stops(a, b),
    });
    let mut resources = ResourceCollection::new();
    let first = resolve_fill(&fill, &mut resources);
    let second = resolve_fill(&fill.clone(), &mut resources);
    first == second && resources.len() == 1
}

#[test]
fn test_distinct_fills_get_distinct_ids() {
    let mut resources = ResourceCollection::new();
    let red_blue = Fill::Linear(LinearGradient {
        angle: 0.0,
        stops: stops((255, 0, 0), (0, 0, 255)),
    });
    let blue_red = Fill::Linear(LinearGradient {
        angle: 0.0,
        stops: stops((0, 0, 255), (255, 0, 0)),
    });
    let a = resolve_fill(&red_blue, &mut resources);
    let b = resolve_fill(&blue_red, &mut resources);
    assert_ne!(a.value, b.value);
    assert_eq!(resources.count_kind("lg"), 2);
}

#[test]
fn test_pattern_and_solid() {
    let mut resources = ResourceCollection::new();
    let pattern = Fill::Pattern(PatternFill {
        kind: PatternKind::Dots,
        size: 4.0,
        spacing: 6.0,
        foreground: Color::BLACK,
        background: None,
    });
    let paint = resolve_fill(&pattern, &mut resources);
    assert!(paint.value.starts_with("url(#pat-"));
    let solid = resolve_fill(&Fill::solid(Color::rgb(1, 2, 3)), &mut resources);
    assert_eq!(solid.value, "#010203");
    assert_eq!(solid.opacity, None);
    assert_eq!(resources.len(), 1);
}

#[test]
fn test_nearly_equal_angles_share_a_definition() {
    let mut resources = ResourceCollection::new();
    for angle in [45.0, 45.0 + 1e-12] {
        let fill = Fill::Linear(LinearGradient {
            angle,
            stops: stops((0, 0, 0), (255, 255, 255)),
        });
        let _ = resolve_fill(&fill, &mut resources);
    }
    assert_eq!(resources.len(), 1);
}

#[test]
fn test_url_references() {
    let ids: Vec<&str> = url_references("url(#lg-1) url('#mask-2') none url(#)").collect();
    assert_eq!(ids, ["lg-1", "mask-2"]);
    assert_eq!(url_references("#ff0000").count(), 0);
}

#[test]
fn test_retain_used_keeps_dependencies() {
    let mut resources = ResourceCollection::new();
    let gradient = resources.intern(ResourceDefinition::LinearGradient(LinearGradientDef {
        x1: 0.0,
        y1: 0.0,
        x2: 100.0,
        y2: 0.0,
        stops: Vec::new(),
    }));
    let mask = resources.intern(ResourceDefinition::Mask(MaskDef::Gradient {
        gradient: gradient.clone(),
        width: 10.0,
        height: 10.0,
    }));
    let stale = Fill::Linear(LinearGradient {
        angle: 90.0,
        stops: stops((1, 2, 3), (4, 5, 6)),
    });
    let stale_paint = resolve_fill(&stale, &mut resources);
    assert_eq!(resources.len(), 3);

    let used: HashSet<&str> = [mask.as_str()].into_iter().collect();
    assert_eq!(resources.retain_used(&used), 1);
    assert!(resources.get(&gradient).is_some());
    assert!(resources.get(&mask).is_some());

    // A released definition can be interned again under the same id.
    assert_eq!(resolve_fill(&stale, &mut resources), stale_paint);
    assert_eq!(resources.len(), 3);
}
