//! Renders a single triangle into an in-memory buffer and writes it to a
//! PNG. No window, no event loop — presentation is out of scope for the
//! core, so this just proves the pipeline end to end.

use microraster::color::PixelFormat;
use microraster::context::{BufferBit, Context, TargetSet};
use microraster::vertex::{AttributeLayout, PrimitiveType, VertexArrayDescriptor};
use nalgebra::Vector4;

const WIDTH: u32 = 256;
const HEIGHT: u32 = 256;

fn main() {
    env_logger::init();

    let mut color_buf = vec![0u8; (WIDTH * HEIGHT * 4) as usize];

    let mut ctx = Context::new();
    ctx.bind_renderbuffer(TargetSet::FRONT, color_buf.as_mut_ptr(), 0, WIDTH, HEIGHT)
        .expect("color buffer bind should not conflict with anything else bound");
    ctx.texture = false;
    ctx.depth_test = false;
    ctx.clear_color = Vector4::new(0.05, 0.05, 0.08, 1.0);
    ctx.clear(BufferBit::COLOR);

    ctx.vertex_array = VertexArrayDescriptor {
        position: AttributeLayout { enabled: true, components: 3, offset: 0, stride: 7 },
        color: AttributeLayout { enabled: true, components: 4, offset: 3, stride: 7 },
        ..Default::default()
    };

    #[rustfmt::skip]
    let triangle: [f32; 21] = [
        -0.7, -0.6, 0.0, 1.0, 0.2, 0.2, 1.0,
         0.7, -0.6, 0.0, 0.2, 1.0, 0.2, 1.0,
         0.0,  0.7, 0.0, 0.2, 0.2, 1.0, 1.0,
    ];
    ctx.draw_array(PrimitiveType::Triangles, 3, &triangle);

    let image = image::RgbaImage::from_raw(WIDTH, HEIGHT, bytes_as_rgba(&color_buf, ctx.front.color_format.unwrap()))
        .expect("buffer dimensions match the bound renderbuffer");

    let out_path = "triangle.png";
    image.save(out_path).expect("failed to write demo output");
    log::info!("wrote {out_path}");
}

/// The demo always binds `R8G8B8A8`, which is already byte-for-byte RGBA8,
/// so this just hands the buffer to `image` unchanged — kept as a function
/// so a future demo binding a different format has somewhere to convert.
fn bytes_as_rgba(buf: &[u8], format: PixelFormat) -> Vec<u8> {
    assert_eq!(format, PixelFormat::R8G8B8A8);
    buf.to_vec()
}
