//! Triangle rasterizer.
//!
//! Walks the screen-space bounding box of the triangle and classifies each
//! pixel with the standard edge-function barycentric test, rather than the
//! source's scanline edge-walk — the bbox/edge-function shape mirrors how
//! the corpus already does bbox-scan triangle fills, and it produces the
//! same barycentric partition (§8 invariant 5) without needing a separate
//! sub-pixel correction loop. Vertex positions and the sample point tested
//! against each edge stay in 24.8 fixed point (§5) all the way through the
//! edge-function test; only the resulting barycentric ratio is converted to
//! float for interpolation.

use nalgebra::Vector4;

use crate::context::Context;
use crate::fixed::{safe_fdiv, Fixed16, Fixed8, HALF_SUBPIXEL_8};
use crate::primitive::InFlightTriangle;
use crate::raster::{self, FragmentInput};

/// Signed area (doubled, scaled by `2^16` from the two 24.8 operands) of the
/// 2D triangle `(a, b, c)`, screen-space convention (y grows downward).
/// Widened to `i64` since two 24.8 values multiply out to 48 significant
/// bits before any shift.
#[inline]
fn edge(a: (Fixed8, Fixed8), b: (Fixed8, Fixed8), c: (Fixed8, Fixed8)) -> i64 {
    let (ax, ay) = (a.0.raw() as i64, a.1.raw() as i64);
    let (bx, by) = (b.0.raw() as i64, b.1.raw() as i64);
    let (cx, cy) = (c.0.raw() as i64, c.1.raw() as i64);
    (cx - ax) * (by - ay) - (cy - ay) * (bx - ax)
}

pub fn rasterize(ctx: &Context, triangle: &InFlightTriangle) {
    let p = [
        (triangle.vertices[0].x, triangle.vertices[0].y),
        (triangle.vertices[1].x, triangle.vertices[1].y),
        (triangle.vertices[2].x, triangle.vertices[2].y),
    ];

    let area = edge(p[0], p[1], p[2]);
    if area == 0 {
        return;
    }

    let min_x = p.iter().map(|v| v.0.floor_to_int()).min().unwrap().max(0);
    let max_x = p.iter().map(|v| v.0.ceil_to_int()).max().unwrap();
    let min_y = p.iter().map(|v| v.1.floor_to_int()).min().unwrap().max(0);
    let max_y = p.iter().map(|v| v.1.ceil_to_int()).max().unwrap();

    let target_dims = ctx.active_target().dimensions;
    let max_x = max_x.min(target_dims.width as i32 - 1);
    let max_y = max_y.min(target_dims.height as i32 - 1);

    if matches!(ctx.polygon_mode, crate::context::PolygonMode::Line) {
        for i in 0..3 {
            let a = triangle.vertices[i];
            let b = triangle.vertices[(i + 1) % 3];
            raster::line::rasterize(ctx, &crate::primitive::InFlightLine {
                vertices: [
                    crate::primitive::LineVertex { x: a.x, y: a.y, z: a.z, w: a.w, color: a.color, tcoord: a.tcoord, t: 0.0 },
                    crate::primitive::LineVertex { x: b.x, y: b.y, z: b.z, w: b.w, color: b.color, tcoord: b.tcoord, t: 1.0 },
                ],
            });
        }
        return;
    }
    if matches!(ctx.polygon_mode, crate::context::PolygonMode::Point) {
        for v in &triangle.vertices {
            raster::point::rasterize(ctx, &crate::primitive::InFlightPoint { x: v.x, y: v.y, z: v.z, color: v.color, tcoord: v.tcoord });
        }
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            // sample at the pixel center, nudged half a subpixel off the
            // integer grid corner the bbox walk counts from.
            let pixel = (Fixed8::from_int(x) + Fixed8(HALF_SUBPIXEL_8), Fixed8::from_int(y) + Fixed8(HALF_SUBPIXEL_8));

            let w0 = edge(p[1], p[2], pixel);
            let w1 = edge(p[2], p[0], pixel);
            let w2 = edge(p[0], p[1], pixel);

            let inside = (w0 >= 0 && w1 >= 0 && w2 >= 0) || (w0 <= 0 && w1 <= 0 && w2 <= 0);
            if !inside {
                continue;
            }

            let bary_linear = ((w0 as f64 / area as f64) as f32, (w1 as f64 / area as f64) as f32, (w2 as f64 / area as f64) as f32);

            let bary = if ctx.perspective_correction {
                let iw = [safe_fdiv(1.0, triangle.vertices[0].w), safe_fdiv(1.0, triangle.vertices[1].w), safe_fdiv(1.0, triangle.vertices[2].w)];
                let denom = bary_linear.0 * iw[0] + bary_linear.1 * iw[1] + bary_linear.2 * iw[2];
                let w_corrected = safe_fdiv(1.0, denom);
                (
                    bary_linear.0 * iw[0] * w_corrected,
                    bary_linear.1 * iw[1] * w_corrected,
                    bary_linear.2 * iw[2] * w_corrected,
                )
            } else {
                bary_linear
            };

            let depth = triangle.vertices[0].z * bary.0 + triangle.vertices[1].z * bary.1 + triangle.vertices[2].z * bary.2;

            let color = blend_attr(triangle, bary, |v| v.color);
            let tcoord = blend_attr(triangle, bary, |v| Vector4::new(v.tcoord.x, v.tcoord.y, 0.0, 0.0));

            let target = ctx.active_texture_unit();
            let texel = if let Some(unit) = target {
                crate::primitive::texel_coords(tcoord.x, tcoord.y, unit.width, unit.height)
            } else {
                (0, 0)
            };

            raster::finalize(
                ctx,
                FragmentInput { x, y, primary_color: color, texel, bary_linear, bary_perspective: bary, depth },
            );
        }
    }
}

fn blend_attr(triangle: &InFlightTriangle, bary: (f32, f32, f32), select: impl Fn(&crate::primitive::TriangleVertex) -> Vector4<f32>) -> Vector4<f32> {
    let a16 = Fixed16::from_f32(bary.0);
    let b16 = Fixed16::from_f32(bary.1);
    let c16 = Fixed16::from_f32(bary.2);
    let va = select(&triangle.vertices[0]);
    let vb = select(&triangle.vertices[1]);
    let vc = select(&triangle.vertices[2]);

    Vector4::new(
        weighted_sum(va.x, vb.x, vc.x, a16, b16, c16),
        weighted_sum(va.y, vb.y, vc.y, a16, b16, c16),
        weighted_sum(va.z, vb.z, vc.z, a16, b16, c16),
        weighted_sum(va.w, vb.w, vc.w, a16, b16, c16),
    )
}

/// `(a*ba + b*bb + c*bc)` carried out in 16.16 fixed point, matching the
/// spec's `(attr_i * b_i) >> 16` per-term accumulation.
#[inline]
fn weighted_sum(a: f32, b: f32, c: f32, ba: Fixed16, bb: Fixed16, bc: Fixed16) -> f32 {
    let a16 = Fixed16::from_f32(a);
    let b16 = Fixed16::from_f32(b);
    let c16 = Fixed16::from_f32(c);
    let sum = a16.mul_weighted(ba) + b16.mul_weighted(bb) + c16.mul_weighted(bc);
    Fixed16(sum).to_f32()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::TriangleVertex;

    fn vertex(x: f32, y: f32, color: Vector4<f32>) -> TriangleVertex {
        TriangleVertex { x: Fixed8::from_f32(x), y: Fixed8::from_f32(y), z: 0.5, w: 1.0, color, tcoord: Default::default() }
    }

    #[test]
    fn centroid_of_unit_triangle_is_inside() {
        let tri = InFlightTriangle {
            vertices: [
                vertex(10.0, 10.0, Vector4::new(1.0, 0.0, 0.0, 1.0)),
                vertex(40.0, 10.0, Vector4::new(1.0, 0.0, 0.0, 1.0)),
                vertex(25.0, 40.0, Vector4::new(1.0, 0.0, 0.0, 1.0)),
            ],
        };
        let mut buf = vec![0u8; 64 * 64 * 4];
        let mut ctx = Context::new();
        ctx.bind_renderbuffer(crate::context::TargetSet::FRONT, buf.as_mut_ptr(), 0, 64, 64).unwrap();
        ctx.depth_test = false;
        rasterize(&ctx, &tri);

        let index = 25 * 64 + 25;
        let bits = unsafe { crate::color::codec::read_packed(crate::color::PixelFormat::R8G8B8A8, buf.as_ptr(), index) };
        let decoded = crate::color::codec::decode_to_normalized(crate::color::PixelFormat::R8G8B8A8, bits);
        assert!(decoded.x > 0.9);
        drop(buf);
    }
}
