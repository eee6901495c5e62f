//! Rasterizers (triangle/line/point) and the Fragment Finalizer they all
//! funnel into.

pub mod line;
pub mod point;
pub mod triangle;

use nalgebra::Vector4;

use crate::context::Context;
use crate::depth;
use crate::shader;

/// One fragment about to be tested, shaded, and (maybe) written.
#[derive(Debug, Clone, Copy)]
pub struct FragmentInput {
    pub x: i32,
    pub y: i32,
    /// Interpolated vertex color.
    pub primary_color: Vector4<f32>,
    /// 16.16 texel coordinates, valid only when the active unit is textured.
    pub texel: (i32, i32),
    pub bary_linear: (f32, f32, f32),
    pub bary_perspective: (f32, f32, f32),
    /// Interpolated depth, normalized to `[0, 1]`.
    pub depth: f32,
}

/// Runs one fragment through: depth test, texture sample, fragment shader,
/// blend, write. No-ops any step whose prerequisite (bound buffer, complete
/// texture unit, bound shader) is missing.
pub fn finalize(ctx: &Context, fragment: FragmentInput) {
    let target = ctx.active_target();
    if fragment.x < 0 || fragment.y < 0 {
        return;
    }
    let coord = crate::geometry::Coordinate::new(fragment.x as u32, fragment.y as u32);
    if !target.dimensions.in_bounds(coord) {
        return;
    }
    let index = coord.into_index(target.dimensions);

    let depth_format = target.depth_format;
    let raster_depth = depth_format.map(|format| depth::to_raster(format, fragment.depth));

    if ctx.depth_test {
        if let (Some(depth_ptr), Some(format), Some(raster_depth)) = (target.depth, depth_format, raster_depth) {
            if !depth::is_valid_raster_depth(format, raster_depth) {
                return;
            }
            let dest = unsafe { depth::read(format, depth_ptr, index) };
            if raster_depth > dest {
                return;
            }
        }
    }

    let texture_color = if ctx.texture {
        match ctx.active_texture_unit() {
            Some(unit) if unit.is_complete() => unsafe { unit.sample(fragment.texel.0 >> 16, fragment.texel.1 >> 16) },
            _ => crate::color::rgba_empty(),
        }
    } else {
        crate::color::rgba_empty()
    };

    let current_color = if ctx.texture { texture_color } else { fragment.primary_color };

    let inputs = shader::FragmentInputs {
        primitive_color: fragment.primary_color,
        texture_color,
        fragment_color: current_color,
        bary_linear: nalgebra::Vector3::new(fragment.bary_linear.0, fragment.bary_linear.1, fragment.bary_linear.2),
        bary_perspective: nalgebra::Vector3::new(
            fragment.bary_perspective.0,
            fragment.bary_perspective.1,
            fragment.bary_perspective.2,
        ),
        fragment_position: (fragment.x, fragment.y),
        fragment_depth: fragment.depth,
    };
    let blob = shader::build_fragment_blob(ctx.fragment_attributes, &inputs);
    let (final_color, discard) = shader::run_fragment_shader(ctx.fragment_shader.as_deref(), &blob, current_color);
    if discard {
        return;
    }

    if let Some(color_ptr) = target.color {
        let rgba16 = crate::primitive::color_16_16(final_color);
        unsafe {
            crate::color::codec::plot(target.color_format.unwrap(), color_ptr, index, rgba16, ctx.blend);
        }
    }

    if ctx.depth_write {
        if let (Some(depth_ptr), Some(format), Some(raster_depth)) = (target.depth, depth_format, raster_depth) {
            if depth::is_valid_raster_depth(format, raster_depth) {
                unsafe { depth::write(format, depth_ptr, index, raster_depth) };
            }
        }
    }
}
