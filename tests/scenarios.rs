//! Integration tests against the public `Context` API, covering the
//! concrete scenarios from the external interface's testable-properties
//! table.

use microraster::color::{codec, PixelFormat};
use microraster::context::{BufferBit, Context, TargetSet};
use microraster::depth::DepthFormat;
use microraster::vertex::{AttributeLayout, PrimitiveType, VertexArrayDescriptor};

fn xyz_rgba_descriptor() -> VertexArrayDescriptor {
    VertexArrayDescriptor {
        position: AttributeLayout { enabled: true, components: 3, offset: 0, stride: 7 },
        color: AttributeLayout { enabled: true, components: 4, offset: 3, stride: 7 },
        ..Default::default()
    }
}

fn read_pixel(buf: &[u8], format: PixelFormat, width: usize, x: usize, y: usize) -> nalgebra::Vector4<f32> {
    let index = y * width + x;
    let bits = unsafe { codec::read_packed(format, buf.as_ptr(), index) };
    codec::decode_to_normalized(format, bits)
}

#[test]
fn single_red_triangle_no_shaders_no_depth_no_texture() {
    let mut color_buf = vec![0u8; 64 * 64 * 4];
    let mut ctx = Context::new();
    ctx.bind_renderbuffer(TargetSet::FRONT, color_buf.as_mut_ptr(), 0, 64, 64).unwrap();
    ctx.depth_test = false;
    ctx.texture = false;
    ctx.clear_color = nalgebra::Vector4::new(0.0, 0.0, 0.0, 0.0);
    ctx.clear(BufferBit::COLOR);
    ctx.vertex_array = xyz_rgba_descriptor();

    #[rustfmt::skip]
    let buffer: [f32; 21] = [
        -0.5, -0.5, 0.0, 1.0, 0.0, 0.0, 1.0,
         0.5, -0.5, 0.0, 1.0, 0.0, 0.0, 1.0,
         0.0,  0.5, 0.0, 1.0, 0.0, 0.0, 1.0,
    ];
    ctx.draw_array(PrimitiveType::Triangles, 3, &buffer);

    let centroid = read_pixel(&color_buf, PixelFormat::R8G8B8A8, 64, 32, 32);
    assert!(centroid.x > 0.9 && centroid.y < 0.1 && centroid.z < 0.1);

    let corner = read_pixel(&color_buf, PixelFormat::R8G8B8A8, 64, 0, 0);
    assert_eq!(corner, nalgebra::Vector4::new(0.0, 0.0, 0.0, 0.0));
}

#[test]
fn depth_test_rejects_far_geometry_drawn_after_near() {
    let mut color_buf = vec![0u8; 8 * 8 * 4];
    let mut depth_buf = vec![0u8; 8 * 8 * 2];
    let mut ctx = Context::new();
    ctx.bind_renderbuffer(TargetSet::FRONT, color_buf.as_mut_ptr(), 0, 8, 8).unwrap();
    ctx.bind_renderbuffer(TargetSet::FRONT, depth_buf.as_mut_ptr(), 12, 8, 8).unwrap(); // D16
    ctx.clear_depth = 1.0;
    ctx.clear(BufferBit::DEPTH | BufferBit::COLOR);
    ctx.vertex_array = xyz_rgba_descriptor();
    ctx.perspective_correction = false;

    // back quad, z = 0.9 (far), green
    #[rustfmt::skip]
    let back: [f32; 21] = [
        -1.0, -1.0, 0.9, 0.0, 1.0, 0.0, 1.0,
         1.0, -1.0, 0.9, 0.0, 1.0, 0.0, 1.0,
         0.0,  1.0, 0.9, 0.0, 1.0, 0.0, 1.0,
    ];
    ctx.draw_array(PrimitiveType::Triangles, 3, &back);

    // front quad, z = 0.1 (near), red
    #[rustfmt::skip]
    let front: [f32; 21] = [
        -1.0, -1.0, 0.1, 1.0, 0.0, 0.0, 1.0,
         1.0, -1.0, 0.1, 1.0, 0.0, 0.0, 1.0,
         0.0,  1.0, 0.1, 1.0, 0.0, 0.0, 1.0,
    ];
    ctx.draw_array(PrimitiveType::Triangles, 3, &front);

    let pixel = read_pixel(&color_buf, PixelFormat::R8G8B8A8, 8, 4, 4);
    assert!(pixel.x > 0.9 && pixel.y < 0.1);
}

#[test]
fn frustum_clip_rejects_fully_negative_w_triangle() {
    let mut color_buf = vec![0u8; 8 * 8 * 4];
    let mut ctx = Context::new();
    ctx.bind_renderbuffer(TargetSet::FRONT, color_buf.as_mut_ptr(), 0, 8, 8).unwrap();
    ctx.depth_test = false;
    ctx.vertex_array = xyz_rgba_descriptor();

    #[rustfmt::skip]
    let buffer: [f32; 21] = [
        -1.0, -1.0, 0.0, -1.0, 1.0, 1.0, 1.0,
         1.0, -1.0, 0.0, -1.0, 1.0, 1.0, 1.0,
         0.0,  1.0, 0.0, -1.0, 1.0, 1.0, 1.0,
    ];
    ctx.draw_array(PrimitiveType::Triangles, 3, &buffer);

    for &(x, y) in &[(0, 0), (4, 4), (7, 7)] {
        let pixel = read_pixel(&color_buf, PixelFormat::R8G8B8A8, 8, x, y);
        assert_eq!(pixel, nalgebra::Vector4::new(0.0, 0.0, 0.0, 0.0));
    }
}

#[test]
fn no_buffers_bound_leaves_memory_untouched() {
    let ctx = Context::new();
    ctx.draw_array(PrimitiveType::Triangles, 3, &[0.0; 21]);
    // nothing externally observable; exercised for panics only
}

#[test]
fn double_buffer_swap_is_an_involution() {
    let mut front = vec![1u8; 4 * 4 * 4];
    let mut back = vec![2u8; 4 * 4 * 4];
    let mut ctx = Context::new();
    ctx.double_buffer = true;
    ctx.bind_renderbuffer(TargetSet::FRONT, front.as_mut_ptr(), 0, 4, 4).unwrap();
    ctx.bind_renderbuffer(TargetSet::BACK, back.as_mut_ptr(), 0, 4, 4).unwrap();

    let (front_ptr, back_ptr) = (ctx.front.color, ctx.back.color);
    ctx.swap();
    ctx.swap();
    assert_eq!(ctx.front.color, front_ptr);
    assert_eq!(ctx.back.color, back_ptr);
}

#[test]
fn depth_format_round_trips_through_codec() {
    assert_eq!(microraster::depth::to_raster(DepthFormat::D16, 1.0), 0xFFFF);
}
