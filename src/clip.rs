//! Homogeneous clip-space clipping, done before the perspective divide.
//!
//! Points and lines are rejected/accepted with Cohen–Sutherland outcodes.
//! Triangles are clipped plane-by-plane with Sutherland–Hodgman, fan
//! triangulated afterward. Six planes bound the `-w <= x,y,z <= w` frustum.

use nalgebra::Vector4;
use smallvec::SmallVec;

/// One of the six clip-space half-space planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

pub const PLANES: [Plane; 6] = [
    Plane::Left,
    Plane::Right,
    Plane::Bottom,
    Plane::Top,
    Plane::Near,
    Plane::Far,
];

/// Signed distance of `v` from `plane`; positive is inside.
#[inline]
fn distance(plane: Plane, v: Vector4<f32>) -> f32 {
    match plane {
        Plane::Left => v.w + v.x,
        Plane::Right => v.w - v.x,
        Plane::Bottom => v.w + v.y,
        Plane::Top => v.w - v.y,
        Plane::Near => v.w + v.z,
        Plane::Far => v.w - v.z,
    }
}

/// Cohen–Sutherland outcode: one bit per plane the vertex is outside of.
#[inline]
pub fn outcode(v: Vector4<f32>) -> u8 {
    let mut code = 0u8;
    for (i, &plane) in PLANES.iter().enumerate() {
        if distance(plane, v) < 0.0 {
            code |= 1 << i;
        }
    }
    code
}

/// `true` if the point lies within all six planes.
#[inline]
pub fn point_in_frustum(v: Vector4<f32>) -> bool {
    outcode(v) == 0
}

/// Clips a line segment against the frustum, returning the clipped endpoints
/// (in clip space) and how far along the original segment each one lies, in
/// `[0, 1]`, for interpolating the rest of the vertex's attributes.
///
/// Returns `None` if the segment lies entirely outside one plane.
pub fn clip_line(a: Vector4<f32>, b: Vector4<f32>) -> Option<[(Vector4<f32>, f32); 2]> {
    let mut a = a;
    let mut b = b;
    let mut ta = 0.0f32;
    let mut tb = 1.0f32;

    for &plane in PLANES.iter() {
        let da = distance(plane, a);
        let db = distance(plane, b);

        if da < 0.0 && db < 0.0 {
            return None;
        }
        if da < 0.0 {
            let t = da / (da - db);
            a = a + (b - a) * t;
            ta = ta + (tb - ta) * t;
        } else if db < 0.0 {
            let t = da / (da - db);
            b = a + (b - a) * t;
            tb = ta + (tb - ta) * t;
        }
    }

    Some([(a, ta), (b, tb)])
}

/// A clip-space vertex paired with the barycentric weights (against the
/// original, pre-clip triangle) that produced it. Identity weights
/// `(1,0,0)`/`(0,1,0)`/`(0,0,1)` mark the original three corners; anything
/// else is a point Sutherland–Hodgman introduced on a clip plane.
#[derive(Debug, Clone, Copy)]
pub struct ClippedVertex {
    pub position: Vector4<f32>,
    pub bary: (f32, f32, f32),
}

type Polygon = SmallVec<[ClippedVertex; 9]>;

fn lerp_vertex(inside: &ClippedVertex, outside: &ClippedVertex, t: f32) -> ClippedVertex {
    ClippedVertex {
        position: inside.position + (outside.position - inside.position) * t,
        bary: (
            inside.bary.0 + (outside.bary.0 - inside.bary.0) * t,
            inside.bary.1 + (outside.bary.1 - inside.bary.1) * t,
            inside.bary.2 + (outside.bary.2 - inside.bary.2) * t,
        ),
    }
}

fn clip_against_plane(poly: &Polygon, plane: Plane) -> Polygon {
    let mut out = Polygon::new();
    if poly.is_empty() {
        return out;
    }

    for i in 0..poly.len() {
        let current = poly[i];
        let prev = poly[(i + poly.len() - 1) % poly.len()];

        let current_d = distance(plane, current.position);
        let prev_d = distance(plane, prev.position);

        let current_inside = current_d >= 0.0;
        let prev_inside = prev_d >= 0.0;

        if current_inside != prev_inside {
            let t = prev_d / (prev_d - current_d);
            out.push(lerp_vertex(&prev, &current, t));
        }
        if current_inside {
            out.push(current);
        }
    }

    out
}

/// Clips a triangle against the frustum, returning a (possibly larger)
/// convex polygon fan-triangulated back into triangles, each a triple of
/// `ClippedVertex`. Empty if the triangle lies entirely outside a plane.
pub fn clip_triangle(a: Vector4<f32>, b: Vector4<f32>, c: Vector4<f32>) -> SmallVec<[[ClippedVertex; 3]; 7]> {
    let mut poly: Polygon = SmallVec::new();
    poly.push(ClippedVertex { position: a, bary: (1.0, 0.0, 0.0) });
    poly.push(ClippedVertex { position: b, bary: (0.0, 1.0, 0.0) });
    poly.push(ClippedVertex { position: c, bary: (0.0, 0.0, 1.0) });

    for &plane in PLANES.iter() {
        poly = clip_against_plane(&poly, plane);
        if poly.is_empty() {
            break;
        }
    }

    let mut triangles = SmallVec::new();
    if poly.len() >= 3 {
        for i in 1..poly.len() - 1 {
            triangles.push([poly[0], poly[i], poly[i + 1]]);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_inside_has_zero_outcode() {
        let v = Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(outcode(v), 0);
        assert!(point_in_frustum(v));
    }

    #[test]
    fn point_outside_left_plane_has_bit_set() {
        let v = Vector4::new(-2.0, 0.0, 0.0, 1.0);
        assert_ne!(outcode(v) & 1, 0);
        assert!(!point_in_frustum(v));
    }

    #[test]
    fn line_entirely_outside_rejected() {
        let a = Vector4::new(-2.0, 0.0, 0.0, 1.0);
        let b = Vector4::new(-3.0, 0.0, 0.0, 1.0);
        assert!(clip_line(a, b).is_none());
    }

    #[test]
    fn line_straddling_plane_clips_one_endpoint() {
        let a = Vector4::new(0.0, 0.0, 0.0, 1.0);
        let b = Vector4::new(2.0, 0.0, 0.0, 1.0);
        let [(_, ta), (clipped, tb)] = clip_line(a, b).unwrap();
        assert_eq!(ta, 0.0);
        assert!(tb > 0.0 && tb < 1.0);
        assert!((clipped.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn triangle_fully_inside_survives_unchanged() {
        let a = Vector4::new(0.0, 0.5, 0.0, 1.0);
        let b = Vector4::new(-0.5, -0.5, 0.0, 1.0);
        let c = Vector4::new(0.5, -0.5, 0.0, 1.0);
        let tris = clip_triangle(a, b, c);
        assert_eq!(tris.len(), 1);
    }

    #[test]
    fn triangle_fully_outside_produces_nothing() {
        let a = Vector4::new(-3.0, 0.0, 0.0, 1.0);
        let b = Vector4::new(-4.0, 1.0, 0.0, 1.0);
        let c = Vector4::new(-4.0, -1.0, 0.0, 1.0);
        let tris = clip_triangle(a, b, c);
        assert!(tris.is_empty());
    }

    #[test]
    fn triangle_straddling_one_plane_produces_a_quad() {
        let a = Vector4::new(0.0, 0.5, 0.0, 1.0);
        let b = Vector4::new(2.0, -0.5, 0.0, 1.0);
        let c = Vector4::new(-2.0, -0.5, 0.0, 1.0);
        let tris = clip_triangle(a, b, c);
        assert!(tris.len() >= 2);
    }
}
