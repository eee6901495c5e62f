//! Line rasterizer: Bresenham stepping with arc-length-fraction attribute
//! interpolation.

use crate::context::Context;
use crate::fixed::safe_fdiv;
use crate::primitive::InFlightLine;
use crate::raster::{self, FragmentInput};

pub fn rasterize(ctx: &Context, line: &InFlightLine) {
    let mut x = line.vertices[0].x.round_to_int();
    let mut y = line.vertices[0].y.round_to_int();
    let target_x = line.vertices[1].x.round_to_int();
    let target_y = line.vertices[1].y.round_to_int();

    let x0 = x as f32;
    let y0 = y as f32;
    let length = (((target_x - x) as f32).powi(2) + ((target_y - y) as f32).powi(2)).sqrt();
    if length == 0.0 {
        return;
    }

    let dx = (target_x - x).abs();
    let dy = -(target_y - y).abs();
    let sx = if x < target_x { 1 } else { -1 };
    let sy = if y < target_y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let walked = (((x as f32 - x0).powi(2) + (y as f32 - y0).powi(2)).sqrt() / length).clamp(0.0, 1.0);
        plot(ctx, line, x, y, walked);

        if x == target_x && y == target_y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn plot(ctx: &Context, line: &InFlightLine, x: i32, y: i32, p: f32) {
    let a = &line.vertices[0];
    let b = &line.vertices[1];

    let bary_linear = (1.0 - p, p, 0.0);

    let bary = if ctx.perspective_correction {
        let iwa = safe_fdiv(1.0, a.w);
        let iwb = safe_fdiv(1.0, b.w);
        let denom = bary_linear.0 * iwa + bary_linear.1 * iwb;
        let w_corrected = safe_fdiv(1.0, denom);
        (bary_linear.0 * iwa * w_corrected, bary_linear.1 * iwb * w_corrected, 0.0)
    } else {
        bary_linear
    };

    let depth = a.z * bary.0 + b.z * bary.1;
    let color = a.color * bary.0 + b.color * bary.1;
    let tcoord = a.tcoord * bary.0 + b.tcoord * bary.1;

    let texel = match ctx.active_texture_unit() {
        Some(unit) => crate::primitive::texel_coords(tcoord.x, tcoord.y, unit.width, unit.height),
        None => (0, 0),
    };

    raster::finalize(ctx, FragmentInput { x, y, primary_color: color, texel, bary_linear, bary_perspective: bary, depth });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fixed8;
    use crate::primitive::LineVertex;
    use nalgebra::Vector4;

    #[test]
    fn zero_length_line_emits_nothing() {
        let ctx = Context::new();
        let v = LineVertex {
            x: Fixed8::from_f32(5.0),
            y: Fixed8::from_f32(5.0),
            z: 0.0,
            w: 1.0,
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            tcoord: Default::default(),
            t: 0.0,
        };
        rasterize(&ctx, &InFlightLine { vertices: [v, v] });
        // no panic, nothing to assert on without a bound buffer
    }

    #[test]
    fn line_terminates_at_endpoint() {
        let mut buf = vec![0u8; 16 * 16 * 4];
        let mut ctx = Context::new();
        ctx.bind_renderbuffer(crate::context::TargetSet::FRONT, buf.as_mut_ptr(), 0, 16, 16).unwrap();
        ctx.depth_test = false;
        let a = LineVertex {
            x: Fixed8::from_f32(0.0),
            y: Fixed8::from_f32(0.0),
            z: 0.0,
            w: 1.0,
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            tcoord: Default::default(),
            t: 0.0,
        };
        let b = LineVertex {
            x: Fixed8::from_f32(8.0),
            y: Fixed8::from_f32(0.0),
            z: 0.0,
            w: 1.0,
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            tcoord: Default::default(),
            t: 1.0,
        };
        rasterize(&ctx, &InFlightLine { vertices: [a, b] });
        let index = 0 * 16 + 8;
        let bits = unsafe { crate::color::codec::read_packed(crate::color::PixelFormat::R8G8B8A8, buf.as_ptr(), index) };
        let decoded = crate::color::codec::decode_to_normalized(crate::color::PixelFormat::R8G8B8A8, bits);
        assert!(decoded.x > 0.9);
    }
}
