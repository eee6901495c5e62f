//! In-flight primitive records and the Primitive Preprocessor.
//!
//! Preprocessing happens twice per primitive: once before clipping (to
//! establish winding for culling) and once per clipped sub-primitive (to
//! finish perspective division, Z rescale, viewport mapping, and texel
//! coordinate derivation). Step order follows the external interface.

use nalgebra::{Vector2, Vector4};

use crate::context::Context;
use crate::depth;
use crate::fixed::{Fixed16, Fixed8};
use crate::geometry::FaceWinding;

/// One in-flight triangle vertex, post viewport-map. `x`/`y` are raster-space
/// 24.8 fixed point (§5); `z`/`w` stay float since only screen position is
/// raster-discretized, not depth or the perspective-correction weight. Color
/// and texture coordinates here are already the final per-vertex values for
/// this (possibly clip-generated) triangle — the rasterizer never needs to
/// re-derive them against a parent.
#[derive(Debug, Clone, Copy)]
pub struct TriangleVertex {
    pub x: Fixed8,
    pub y: Fixed8,
    pub z: f32,
    pub w: f32,
    pub color: Vector4<f32>,
    pub tcoord: Vector2<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct InFlightTriangle {
    pub vertices: [TriangleVertex; 3],
}

#[derive(Debug, Clone, Copy)]
pub struct LineVertex {
    pub x: Fixed8,
    pub y: Fixed8,
    pub z: f32,
    pub w: f32,
    pub color: Vector4<f32>,
    pub tcoord: Vector2<f32>,
    pub t: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct InFlightLine {
    pub vertices: [LineVertex; 2],
}

#[derive(Debug, Clone, Copy)]
pub struct InFlightPoint {
    pub x: Fixed8,
    pub y: Fixed8,
    pub z: f32,
    pub color: Vector4<f32>,
    pub tcoord: Vector2<f32>,
}

/// Signed area of the 2D projection of a triangle's clip-space xy; its sign
/// gives the winding once projected to screen space (y grows downward, so
/// the sign flips relative to a math-convention cross product).
pub fn triangle_winding(a: Vector4<f32>, b: Vector4<f32>, c: Vector4<f32>) -> (f32, FaceWinding) {
    let area = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
    let winding = if area < 0.0 { FaceWinding::Clockwise } else { FaceWinding::CounterClockwise };
    (area, winding)
}

/// Cull test: `true` means drop the triangle.
pub fn should_cull(ctx: &Context, winding: FaceWinding) -> bool {
    ctx.cull && ctx.cull_winding == winding
}

/// Perspective divide, skipped for `w == 0` (degenerate) or `w == 1` (the
/// source's intentional fast path — already-divided or orthographic input).
#[inline]
pub fn perspective_divide(position: Vector4<f32>) -> Vector4<f32> {
    if position.w == 0.0 || position.w == 1.0 {
        return position;
    }
    Vector4::new(position.x / position.w, position.y / position.w, position.z / position.w, position.w)
}

/// NDC z in `[-1, 1]` to `[0, 1]`. The source computes this as `z *= 0.5 +
/// 0.5`, i.e. `z *= 1` — almost certainly a typo for `z = z*0.5 + 0.5`. This
/// uses the corrected formula.
#[inline]
pub fn rescale_z(z: f32) -> f32 {
    z * 0.5 + 0.5
}

/// Maps NDC x,y into raster-space 24.8 fixed point given a viewport of
/// `width x height` (§5: raster X/Y are carried as 24.8, not float, from
/// here through the rasterizer).
#[inline]
pub fn viewport_map(x: f32, y: f32, width: u32, height: u32) -> (Fixed8, Fixed8) {
    let (w, h) = (width as f32, height as f32);
    (Fixed8::from_f32(w / 2.0 + x * w / 2.0), Fixed8::from_f32(h / 2.0 - y * h / 2.0))
}

/// Derives 16.16 texel coordinates from normalized `(u, v)` and texture
/// dimensions. Texture origin is bottom-left; raster origin is top-left,
/// hence the `1 - v` flip.
#[inline]
pub fn texel_coords(u: f32, v: f32, tex_width: u32, tex_height: u32) -> (i32, i32) {
    let tx = u * (tex_width.saturating_sub(1)) as f32;
    let ty = (1.0 - v) * (tex_height.saturating_sub(1)) as f32;
    (Fixed16::from_f32(tx).raw(), Fixed16::from_f32(ty).raw())
}

/// Converts normalized depth `z ∈ [0,1]` to the bound depth format's
/// raster-space integer range.
#[inline]
pub fn depth_raster(format: depth::DepthFormat, z: f32) -> i64 {
    depth::to_raster(format, z)
}

/// Converts per-vertex normalized RGBA into 16.16 fixed-point channels.
#[inline]
pub fn color_16_16(color: Vector4<f32>) -> (i32, i32, i32, i32) {
    (
        Fixed16::from_f32(color.x).raw(),
        Fixed16::from_f32(color.y).raw(),
        Fixed16::from_f32(color.z).raw(),
        Fixed16::from_f32(color.w).raw(),
    )
}
