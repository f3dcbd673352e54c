//! Point-in-layer tests.

use lumen_render::Point;
use lumen_style::ResolvedTransform;

/// Map a point from parent coordinates into the layer's local box, undoing
/// `translate(x y) rotate(r cx cy) scale(sx sy)`. `None` for a degenerate
/// scale.
#[must_use]
pub fn to_local(t: &ResolvedTransform, point: Point) -> Option<Point> {
    if t.scale_x == 0.0 || t.scale_y == 0.0 {
        return None;
    }
    let (cx, cy) = (t.width / 2.0, t.height / 2.0);
    let (dx, dy) = (point.x - t.x - cx, point.y - t.y - cy);
    let (sin, cos) = (-t.rotation).to_radians().sin_cos();
    let rx = dx.mul_add(cos, -dy * sin) + cx;
    let ry = dx.mul_add(sin, dy * cos) + cy;
    Some(Point::new(rx / t.scale_x, ry / t.scale_y))
}

/// Whether a local point lies inside the layer box, edges included.
#[must_use]
pub fn inside(t: &ResolvedTransform, local: Point) -> bool {
    (0.0..=t.width).contains(&local.x) && (0.0..=t.height).contains(&local.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_model::Transform;

    fn resolved(transform: Transform) -> ResolvedTransform {
        ResolvedTransform::from_raw(&transform)
    }

    #[test]
    fn test_translation() {
        let t = resolved(Transform::from_rect(10.0, 20.0, 100.0, 50.0));
        let local = to_local(&t, Point::new(15.0, 25.0)).unwrap();
        assert!((local.x - 5.0).abs() < 1e-9 && (local.y - 5.0).abs() < 1e-9);
        assert!(inside(&t, local));
        assert!(!inside(&t, to_local(&t, Point::new(5.0, 25.0)).unwrap()));
    }

    #[test]
    fn test_rotation_about_center() {
        let mut raw = Transform::from_rect(0.0, 0.0, 100.0, 20.0);
        raw.rotation = Some(90.0);
        let t = resolved(raw);
        // A 100x20 bar turned upright around (50, 10).
        assert!(inside(&t, to_local(&t, Point::new(50.0, 50.0)).unwrap()));
        assert!(!inside(&t, to_local(&t, Point::new(90.0, 10.0)).unwrap()));
    }

    #[test]
    fn test_scale() {
        let mut raw = Transform::from_rect(0.0, 0.0, 10.0, 10.0);
        raw.scale_x = Some(2.0);
        let t = resolved(raw);
        assert!(inside(&t, to_local(&t, Point::new(19.0, 5.0)).unwrap()));
        assert!(!inside(&t, to_local(&t, Point::new(21.0, 5.0)).unwrap()));
    }
}
