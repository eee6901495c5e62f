//! Point rasterizer: midpoint-circle fill of an integer-radius disk.

use crate::context::Context;
use crate::primitive::InFlightPoint;
use crate::raster::{self, FragmentInput};

pub fn rasterize(ctx: &Context, point: &InFlightPoint) {
    let cx = point.x.round_to_int();
    let cy = point.y.round_to_int();
    let radius = ctx.point_radius.max(0.0).round() as i32;

    let texel = match ctx.active_texture_unit() {
        Some(unit) => crate::primitive::texel_coords(point.tcoord.x, point.tcoord.y, unit.width, unit.height),
        None => (0, 0),
    };

    let mut plot_span = |y: i32, x_from: i32, x_to: i32| {
        for x in x_from..=x_to {
            raster::finalize(
                ctx,
                FragmentInput {
                    x,
                    y,
                    primary_color: point.color,
                    texel,
                    bary_linear: (0.0, 0.0, 0.0),
                    bary_perspective: (0.0, 0.0, 0.0),
                    depth: point.z,
                },
            );
        }
    };

    if radius == 0 {
        plot_span(cy, cx, cx);
        return;
    }

    // cardinal extremes
    plot_span(cy, cx - radius, cx - radius);
    plot_span(cy, cx + radius, cx + radius);
    plot_span(cy - radius, cx, cx);
    plot_span(cy + radius, cx, cx);

    // horizontal diameter through the center
    plot_span(cy, cx - radius, cx + radius);

    // octant bands: for each row off-center, the half-width at that row is
    // the largest x with x^2 + y^2 <= radius^2 (integer Euclidean disk).
    let r_squared = radius * radius;
    for y in 1..radius {
        let half_width = integer_sqrt(r_squared - y * y);
        plot_span(cy + y, cx - half_width, cx + half_width);
        plot_span(cy - y, cx - half_width, cx + half_width);
    }
}

/// Largest `n >= 0` with `n*n <= value`.
#[inline]
fn integer_sqrt(value: i32) -> i32 {
    if value <= 0 {
        return 0;
    }
    let mut n = (value as f32).sqrt() as i32;
    while n * n > value {
        n -= 1;
    }
    while (n + 1) * (n + 1) <= value {
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fixed8;
    use nalgebra::Vector4;

    fn count_nonzero(buf: &[u8], width: usize, height: usize) -> usize {
        let mut count = 0;
        for index in 0..width * height {
            let bits = unsafe { crate::color::codec::read_packed(crate::color::PixelFormat::R8G8B8A8, buf.as_ptr(), index) };
            if bits != 0 {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn radius_three_disk_fills_twenty_nine_pixels() {
        let mut buf = vec![0u8; 16 * 16 * 4];
        let mut ctx = Context::new();
        ctx.bind_renderbuffer(crate::context::TargetSet::FRONT, buf.as_mut_ptr(), 0, 16, 16).unwrap();
        ctx.depth_test = false;
        ctx.point_radius = 3.0;
        let point = InFlightPoint {
            x: Fixed8::from_f32(8.0),
            y: Fixed8::from_f32(8.0),
            z: 0.0,
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            tcoord: Default::default(),
        };
        rasterize(&ctx, &point);
        assert_eq!(count_nonzero(&buf, 16, 16), 29);
    }

    #[test]
    fn radius_zero_plots_a_single_pixel() {
        let mut buf = vec![0u8; 16 * 16 * 4];
        let mut ctx = Context::new();
        ctx.bind_renderbuffer(crate::context::TargetSet::FRONT, buf.as_mut_ptr(), 0, 16, 16).unwrap();
        ctx.depth_test = false;
        ctx.point_radius = 0.0;
        let point = InFlightPoint {
            x: Fixed8::from_f32(8.0),
            y: Fixed8::from_f32(8.0),
            z: 0.0,
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            tcoord: Default::default(),
        };
        rasterize(&ctx, &point);
        assert_eq!(count_nonzero(&buf, 16, 16), 1);
    }
}
