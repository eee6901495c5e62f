//! The rendering context: all state a draw call implicitly reads, plus the
//! draw/clear/swap/bind entry points.
//!
//! A "current context" binding is process-wide (here, thread-local, which
//! subsumes "process-wide" for the single-threaded model this core assumes
//! — see the concurrency notes) so callers may either thread a `&Context`
//! explicitly or use the `current_context`/`make_current` convenience pair.

use std::cell::RefCell;

use nalgebra::{Vector2, Vector4};
use smallvec::SmallVec;

use crate::clip;
use crate::color::{self, PixelFormat, Rgba};
use crate::depth::DepthFormat;
use crate::error::{RenderError, RenderResult};
use crate::geometry::{Dimensions, FaceWinding};
use crate::primitive::{self, InFlightLine, InFlightPoint, InFlightTriangle, LineVertex, TriangleVertex};
use crate::raster;
use crate::shader::{FragmentAttributeSet, FragmentShader, VertexAttributeSet, VertexShader};
use crate::texture::TextureUnit;
use crate::vertex::{PrimitiveType, VertexArrayDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

bitflags::bitflags! {
    /// Which buffer(s) an operation touches, for `clear`/`unbind_renderbuffer`.
    #[derive(Clone, Copy)]
    pub struct BufferBit: u8 {
        const COLOR = 0b01;
        const DEPTH = 0b10;
    }
}

bitflags::bitflags! {
    /// Which target set a renderbuffer bind/unbind addresses.
    pub struct TargetSet: u8 {
        const FRONT = 0b01;
        const BACK = 0b10;
    }
}

/// One front-or-back render target: an optional color buffer and an
/// optional depth buffer, sharing dimensions once either is bound.
#[derive(Debug, Clone, Copy)]
pub struct RenderTargetSet {
    pub color: Option<*mut u8>,
    pub color_format: Option<PixelFormat>,
    pub depth: Option<*mut u8>,
    pub depth_format: Option<DepthFormat>,
    pub dimensions: Dimensions,
}

impl RenderTargetSet {
    fn empty() -> RenderTargetSet {
        RenderTargetSet { color: None, color_format: None, depth: None, depth_format: None, dimensions: Dimensions::new(0, 0) }
    }

    fn bind_color(&mut self, ptr: *mut u8, format: PixelFormat, width: u32, height: u32) -> RenderResult<()> {
        self.check_dimensions(width, height)?;
        self.color = Some(ptr);
        self.color_format = Some(format);
        self.dimensions = Dimensions::new(width, height);
        Ok(())
    }

    fn bind_depth(&mut self, ptr: *mut u8, format: DepthFormat, width: u32, height: u32) -> RenderResult<()> {
        self.check_dimensions(width, height)?;
        self.depth = Some(ptr);
        self.depth_format = Some(format);
        self.dimensions = Dimensions::new(width, height);
        Ok(())
    }

    fn check_dimensions(&self, width: u32, height: u32) -> RenderResult<()> {
        let has_existing = self.color.is_some() || self.depth.is_some();
        if has_existing && (self.dimensions.width != width || self.dimensions.height != height) {
            return Err(RenderError::DimensionMismatch {
                new: (width, height),
                existing: (self.dimensions.width, self.dimensions.height),
            });
        }
        Ok(())
    }

    fn unbind(&mut self, which: BufferBit) {
        if which.contains(BufferBit::COLOR) {
            self.color = None;
            self.color_format = None;
        }
        if which.contains(BufferBit::DEPTH) {
            self.depth = None;
            self.depth_format = None;
        }
        if self.color.is_none() && self.depth.is_none() {
            self.dimensions = Dimensions::new(0, 0);
        }
    }

    fn clear(&self, clear_color: Rgba, clear_depth: f32) {
        if let (Some(ptr), Some(format)) = (self.color, self.color_format) {
            let bits = color::codec::encode(format, clear_color);
            for index in 0..self.dimensions.area() {
                unsafe { color::codec::write_packed(format, ptr, index, bits) };
            }
        }
        if let (Some(ptr), Some(format)) = (self.depth, self.depth_format) {
            let raster = crate::depth::to_raster(format, clear_depth);
            for index in 0..self.dimensions.area() {
                unsafe { crate::depth::write(format, ptr, index, raster) };
            }
        }
    }
}

/// Rendering state, matching the external context-state table's defaults.
pub struct Context {
    pub front: RenderTargetSet,
    pub back: RenderTargetSet,
    pub double_buffer: bool,
    pub depth_write: bool,
    pub depth_test: bool,
    pub perspective_correction: bool,
    pub texture: bool,
    pub blend: bool,
    pub cull: bool,
    pub clip: bool,
    pub perspective_division: bool,
    pub scale_z: bool,
    pub cull_winding: FaceWinding,
    pub polygon_mode: PolygonMode,
    pub point_radius: f32,
    pub clear_color: Rgba,
    pub clear_depth: f32,
    pub active_texture_unit_index: u8,
    pub texture_units: Box<[Option<TextureUnit>; 256]>,
    pub vertex_attributes: VertexAttributeSet,
    pub fragment_attributes: FragmentAttributeSet,
    pub vertex_shader: Option<Box<VertexShader>>,
    pub fragment_shader: Option<Box<FragmentShader>>,
    pub vertex_array: VertexArrayDescriptor,
}

impl Default for Context {
    fn default() -> Context {
        Context {
            front: RenderTargetSet::empty(),
            back: RenderTargetSet::empty(),
            double_buffer: false,
            depth_write: true,
            depth_test: true,
            perspective_correction: true,
            texture: true,
            blend: false,
            cull: false,
            clip: true,
            perspective_division: true,
            scale_z: true,
            cull_winding: FaceWinding::Clockwise,
            polygon_mode: PolygonMode::Fill,
            point_radius: 1.0,
            clear_color: color::rgba_empty(),
            clear_depth: 1.0,
            active_texture_unit_index: 0,
            texture_units: Box::new([None; 256]),
            vertex_attributes: VertexAttributeSet::default(),
            fragment_attributes: FragmentAttributeSet::default(),
            vertex_shader: None,
            fragment_shader: None,
            vertex_array: VertexArrayDescriptor::default(),
        }
    }
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    #[inline]
    pub fn active_target(&self) -> &RenderTargetSet {
        if self.double_buffer { &self.back } else { &self.front }
    }

    #[inline]
    fn active_target_mut(&mut self) -> &mut RenderTargetSet {
        if self.double_buffer { &mut self.back } else { &mut self.front }
    }

    #[inline]
    pub fn active_texture_unit(&self) -> Option<&TextureUnit> {
        self.texture_units[self.active_texture_unit_index as usize].as_ref()
    }

    /// Binds a renderbuffer by format: color formats become the color slot,
    /// depth formats the depth slot, of whichever set `which` selects. A
    /// dimension conflict with an already-bound buffer in that set is
    /// ignored (the bind is dropped, matching the no-throw policy, but
    /// surfaced here since this is a construction-time entry point).
    pub fn bind_renderbuffer(&mut self, which: TargetSet, ptr: *mut u8, format_tag: u32, width: u32, height: u32) -> RenderResult<()> {
        if let Some(format) = PixelFormat::from_tag(format_tag) {
            if which.contains(TargetSet::FRONT) {
                self.front.bind_color(ptr, format, width, height)?;
            }
            if which.contains(TargetSet::BACK) {
                self.back.bind_color(ptr, format, width, height)?;
            }
            return Ok(());
        }
        if let Some(format) = DepthFormat::from_tag(format_tag) {
            if which.contains(TargetSet::FRONT) {
                self.front.bind_depth(ptr, format, width, height)?;
            }
            if which.contains(TargetSet::BACK) {
                self.back.bind_depth(ptr, format, width, height)?;
            }
            return Ok(());
        }
        Err(RenderError::UnrecognizedPixelFormat(format_tag))
    }

    pub fn unbind_renderbuffer(&mut self, which: TargetSet, buffers: BufferBit) {
        if which.contains(TargetSet::FRONT) {
            self.front.unbind(buffers);
        }
        if which.contains(TargetSet::BACK) {
            self.back.unbind(buffers);
        }
    }

    pub fn set_texture(&mut self, unit: u32, ptr: *const u8, format_tag: u32, width: u32, height: u32, compressed: bool) -> RenderResult<()> {
        if unit > 255 {
            return Err(RenderError::InvalidTextureUnit(unit));
        }
        let format = PixelFormat::from_tag(format_tag).ok_or(RenderError::UnrecognizedPixelFormat(format_tag))?;
        self.texture_units[unit as usize] = Some(TextureUnit { data: ptr, width, height, format, compressed });
        Ok(())
    }

    pub fn active_texture(&mut self, unit: u32) -> RenderResult<()> {
        if unit > 255 {
            return Err(RenderError::InvalidTextureUnit(unit));
        }
        self.active_texture_unit_index = unit as u8;
        Ok(())
    }

    /// Clears the buffer(s) selected by `which` in the active target set
    /// (back if double-buffered, else front).
    pub fn clear(&mut self, which: BufferBit) {
        let clear_color = self.clear_color;
        let clear_depth = self.clear_depth;
        let target = self.active_target_mut();
        let mut masked = target.clone();
        if !which.contains(BufferBit::COLOR) {
            masked.color = None;
        }
        if !which.contains(BufferBit::DEPTH) {
            masked.depth = None;
        }
        masked.clear(clear_color, clear_depth);
    }

    /// Swaps the front and back target sets wholesale; a no-op unless
    /// double-buffering is enabled.
    pub fn swap(&mut self) {
        if self.double_buffer {
            std::mem::swap(&mut self.front, &mut self.back);
        }
    }

    pub fn draw_array(&self, primitive_type: PrimitiveType, count: usize, buffer: &[f32]) {
        self.draw_indexed(primitive_type, &(0..count).collect::<Vec<_>>(), buffer);
    }

    pub fn draw_elements(&self, primitive_type: PrimitiveType, buffer: &[f32], indices: &[usize]) {
        self.draw_indexed(primitive_type, indices, buffer);
    }

    fn draw_indexed(&self, primitive_type: PrimitiveType, indices: &[usize], buffer: &[f32]) {
        if self.front.color.is_none() && self.front.depth.is_none() && self.back.color.is_none() && self.back.depth.is_none() {
            return;
        }

        let per_primitive = primitive_type.vertices_per_primitive();
        for chunk in indices.chunks(per_primitive) {
            if chunk.len() < per_primitive {
                break;
            }
            let vertices: SmallVec<[_; 3]> =
                chunk.iter().map(|&index| self.vertex_array.read(buffer, index, primitive_type.kind())).collect();

            let shaded: SmallVec<[_; 3]> = vertices
                .iter()
                .map(|v| {
                    let inputs = crate::shader::VertexInputs { kind: v.kind, position: v.position, color: v.color, normal: v.normal, tcoord: v.tcoord };
                    let blob = crate::shader::build_vertex_blob(self.vertex_attributes, &inputs);
                    let position = crate::shader::run_vertex_shader(self.vertex_shader.as_deref(), &blob, v.position);
                    (position, v.color, v.tcoord)
                })
                .collect();

            match primitive_type {
                PrimitiveType::Triangles => self.draw_triangle(shaded[0], shaded[1], shaded[2]),
                PrimitiveType::Lines => self.draw_line(shaded[0], shaded[1]),
                PrimitiveType::Points => self.draw_point(shaded[0]),
            }
        }
    }

    fn draw_triangle(&self, a: (Vector4<f32>, Rgba, Vector2<f32>), b: (Vector4<f32>, Rgba, Vector2<f32>), c: (Vector4<f32>, Rgba, Vector2<f32>)) {
        let sub_triangles: SmallVec<[_; 7]> = if self.clip {
            clip::clip_triangle(a.0, b.0, c.0)
        } else {
            let mut v = SmallVec::new();
            v.push([
                clip::ClippedVertex { position: a.0, bary: (1.0, 0.0, 0.0) },
                clip::ClippedVertex { position: b.0, bary: (0.0, 1.0, 0.0) },
                clip::ClippedVertex { position: c.0, bary: (0.0, 0.0, 1.0) },
            ]);
            v
        };

        for tri in sub_triangles {
            let interp = |bary: (f32, f32, f32)| -> (Rgba, Vector2<f32>) {
                let color = a.1 * bary.0 + b.1 * bary.1 + c.1 * bary.2;
                let tcoord = a.2 * bary.0 + b.2 * bary.1 + c.2 * bary.2;
                (color, tcoord)
            };

            let (area, winding) = primitive::triangle_winding(tri[0].position, tri[1].position, tri[2].position);
            if area == 0.0 || primitive::should_cull(self, winding) {
                continue;
            }

            let target = self.active_target();
            let vertices: [TriangleVertex; 3] = std::array::from_fn(|i| {
                let v = tri[i];
                let (color, tcoord) = interp(v.bary);
                let mut position = v.position;
                if self.perspective_division {
                    position = primitive::perspective_divide(position);
                }
                if self.scale_z {
                    position.z = primitive::rescale_z(position.z);
                }
                let (x, y) = primitive::viewport_map(position.x, position.y, target.dimensions.width, target.dimensions.height);
                TriangleVertex { x, y, z: position.z, w: v.position.w, color, tcoord }
            });

            raster::triangle::rasterize(self, &InFlightTriangle { vertices });
        }
    }

    fn draw_line(&self, a: (Vector4<f32>, Rgba, Vector2<f32>), b: (Vector4<f32>, Rgba, Vector2<f32>)) {
        let clipped = if self.clip { clip::clip_line(a.0, b.0) } else { Some([(a.0, 0.0), (b.0, 1.0)]) };
        let Some([(pa, ta), (pb, tb)]) = clipped else { return };

        let target = self.active_target();
        let build = |position: Vector4<f32>, t: f32| -> LineVertex {
            let mut position = position;
            if self.perspective_division {
                position = primitive::perspective_divide(position);
            }
            if self.scale_z {
                position.z = primitive::rescale_z(position.z);
            }
            let (x, y) = primitive::viewport_map(position.x, position.y, target.dimensions.width, target.dimensions.height);
            let color = a.1 + (b.1 - a.1) * t;
            let tcoord = a.2 + (b.2 - a.2) * t;
            LineVertex { x, y, z: position.z, w: position.w, color, tcoord, t }
        };

        raster::line::rasterize(self, &InFlightLine { vertices: [build(pa, ta), build(pb, tb)] });
    }

    fn draw_point(&self, a: (Vector4<f32>, Rgba, Vector2<f32>)) {
        if self.clip && !clip::point_in_frustum(a.0) {
            return;
        }
        let mut position = a.0;
        if self.perspective_division {
            position = primitive::perspective_divide(position);
        }
        if self.scale_z {
            position.z = primitive::rescale_z(position.z);
        }
        let target = self.active_target();
        let (x, y) = primitive::viewport_map(position.x, position.y, target.dimensions.width, target.dimensions.height);
        raster::point::rasterize(self, &InFlightPoint { x, y, z: position.z, color: a.1, tcoord: a.2 });
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Context>> = RefCell::new(None);
}

/// Installs `ctx` as the current context, returning whatever was previously
/// current (if anything).
pub fn make_current(ctx: Context) -> Option<Context> {
    CURRENT.with(|cell| cell.borrow_mut().replace(ctx))
}

/// Clears the current-context binding, returning it.
pub fn take_current() -> Option<Context> {
    CURRENT.with(|cell| cell.borrow_mut().take())
}

/// Runs `f` with a reference to the current context, if any is bound.
pub fn with_current<R>(f: impl FnOnce(&Context) -> R) -> Option<R> {
    CURRENT.with(|cell| cell.borrow().as_ref().map(f))
}

/// Runs `f` with a mutable reference to the current context, if any is bound.
pub fn with_current_mut<R>(f: impl FnOnce(&mut Context) -> R) -> Option<R> {
    CURRENT.with(|cell| cell.borrow_mut().as_mut().map(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_external_interface_table() {
        let ctx = Context::new();
        assert!(!ctx.double_buffer);
        assert!(ctx.depth_write);
        assert!(ctx.depth_test);
        assert!(ctx.perspective_correction);
        assert!(ctx.texture);
        assert!(!ctx.blend);
        assert!(!ctx.cull);
        assert!(ctx.clip);
        assert!(ctx.perspective_division);
        assert!(ctx.scale_z);
        assert_eq!(ctx.cull_winding, FaceWinding::Clockwise);
        assert_eq!(ctx.point_radius, 1.0);
    }

    #[test]
    fn mismatched_bind_dimensions_are_rejected() {
        let mut ctx = Context::new();
        let mut buf_a = [0u8; 64 * 64 * 4];
        let mut buf_b = [0u8; 32 * 32 * 4];
        ctx.bind_renderbuffer(TargetSet::FRONT, buf_a.as_mut_ptr(), 0, 64, 64).unwrap();
        let err = ctx.bind_renderbuffer(TargetSet::FRONT, buf_b.as_mut_ptr(), 1, 32, 32);
        assert!(err.is_err());
    }

    #[test]
    fn no_buffers_bound_draw_is_a_no_op() {
        let ctx = Context::new();
        // no panics, nothing written anywhere; exercised indirectly by draw_array
        ctx.draw_array(PrimitiveType::Triangles, 0, &[]);
    }

    #[test]
    fn swap_is_involution_when_double_buffered() {
        let mut ctx = Context::new();
        ctx.double_buffer = true;
        let mut front_buf = [0u8; 16];
        let mut back_buf = [0u8; 16];
        ctx.bind_renderbuffer(TargetSet::FRONT, front_buf.as_mut_ptr(), 0, 2, 2).unwrap();
        ctx.bind_renderbuffer(TargetSet::BACK, back_buf.as_mut_ptr(), 0, 2, 2).unwrap();
        let front_ptr = ctx.front.color;
        let back_ptr = ctx.back.color;
        ctx.swap();
        ctx.swap();
        assert_eq!(ctx.front.color, front_ptr);
        assert_eq!(ctx.back.color, back_ptr);
    }
}
