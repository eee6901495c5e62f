//! Encode/decode between normalized RGBA and packed pixel formats, plus the
//! framebuffer write (`plot`) that optionally blends with the destination.
//!
//! `encode`/`decode_to_normalized` work on the packed bit pattern directly
//! (as a `u32`, zero-extended for the 1- and 2-byte formats) so callers that
//! already have the bytes in hand — the texture sampler — don't need a raw
//! pointer. `plot`/`read_packed` additionally know each format's byte width
//! and operate on a raw color buffer pointer, since that's what a bound
//! render target actually is (see `framebuffer`).

use super::{PixelFormat, Rgba};
use crate::fixed::Fixed16;
use nalgebra::Vector4;

use PixelFormat::*;

/// Encode a normalized RGBA color (channels in `[0, 1]`) into the packed bit
/// pattern for `format`.
pub fn encode(format: PixelFormat, rgba: Rgba) -> u32 {
    let to16 = |c: f32| Fixed16::from_f32(c.clamp(0.0, 1.0)).raw() as u32;
    let (r, g, b, a) = (to16(rgba.x), to16(rgba.y), to16(rgba.z), to16(rgba.w));
    encode_16_16(format, r, g, b, a)
}

/// As [`encode`], but the input channels are already 16.16 fixed point
/// (the representation fragments carry through the pipeline).
pub fn encode_16_16(format: PixelFormat, r16: u32, g16: u32, b16: u32, a16: u32) -> u32 {
    let scale = |c16: u32, max: u32| (c16 * max) >> 16;
    match format {
        R8G8B8A8 => {
            let (r, g, b, a) = (scale(r16, 255), scale(g16, 255), scale(b16, 255), scale(a16, 255));
            (r << 24) | (g << 16) | (b << 8) | a
        }
        R8G8B8 => {
            let (r, g, b) = (scale(r16, 255), scale(g16, 255), scale(b16, 255));
            (r << 16) | (g << 8) | b
        }
        A8B8G8R8 => {
            let (r, g, b, a) = (scale(r16, 255), scale(g16, 255), scale(b16, 255), scale(a16, 255));
            (a << 24) | (b << 16) | (g << 8) | r
        }
        B8G8R8 => {
            let (r, g, b) = (scale(r16, 255), scale(g16, 255), scale(b16, 255));
            (b << 16) | (g << 8) | r
        }
        R5G5B5A1 => {
            let (r, g, b) = (scale(r16, 31), scale(g16, 31), scale(b16, 31));
            let a = if a16 >= 32768 { 1 } else { 0 };
            (r << 11) | (g << 6) | (b << 1) | a
        }
        R5G5B5 => {
            let (r, g, b) = (scale(r16, 31), scale(g16, 31), scale(b16, 31));
            (r << 10) | (g << 5) | b
        }
        A1B5G5R5 => {
            let (r, g, b) = (scale(r16, 31), scale(g16, 31), scale(b16, 31));
            let a = if a16 >= 32768 { 1 } else { 0 };
            (a << 15) | (b << 10) | (g << 5) | r
        }
        B5G5R5 => {
            let (r, g, b) = (scale(r16, 31), scale(g16, 31), scale(b16, 31));
            (b << 10) | (g << 5) | r
        }
        R3G2B2A1 => {
            let (r, g, b) = (scale(r16, 7), scale(g16, 3), scale(b16, 3));
            let a = if a16 >= 32768 { 1 } else { 0 };
            (r << 5) | (g << 3) | (b << 1) | a
        }
        R3G3B2 => {
            let (r, g, b) = (scale(r16, 7), scale(g16, 7), scale(b16, 3));
            (r << 5) | (g << 2) | b
        }
        A1B2G2R3 => {
            let (r, g, b) = (scale(r16, 7), scale(g16, 3), scale(b16, 3));
            let a = if a16 >= 32768 { 1 } else { 0 };
            (a << 7) | (b << 5) | (g << 3) | r
        }
        B2G3R3 => {
            let (r, g, b) = (scale(r16, 7), scale(g16, 7), scale(b16, 3));
            (b << 5) | (g << 2) | r
        }
    }
}

/// Decode a packed bit pattern into normalized RGBA. Alpha defaults to 1.0
/// for formats with no alpha channel.
pub fn decode_to_normalized(format: PixelFormat, bits: u32) -> Rgba {
    let chan = |v: u32, max: u32| v as f32 / max as f32;
    match format {
        R8G8B8A8 => Vector4::new(
            chan((bits >> 24) & 0xFF, 255),
            chan((bits >> 16) & 0xFF, 255),
            chan((bits >> 8) & 0xFF, 255),
            chan(bits & 0xFF, 255),
        ),
        R8G8B8 => Vector4::new(
            chan((bits >> 16) & 0xFF, 255),
            chan((bits >> 8) & 0xFF, 255),
            chan(bits & 0xFF, 255),
            1.0,
        ),
        A8B8G8R8 => Vector4::new(
            chan(bits & 0xFF, 255),
            chan((bits >> 8) & 0xFF, 255),
            chan((bits >> 16) & 0xFF, 255),
            chan((bits >> 24) & 0xFF, 255),
        ),
        B8G8R8 => Vector4::new(
            chan(bits & 0xFF, 255),
            chan((bits >> 8) & 0xFF, 255),
            chan((bits >> 16) & 0xFF, 255),
            1.0,
        ),
        R5G5B5A1 => Vector4::new(
            chan((bits >> 11) & 0x1F, 31),
            chan((bits >> 6) & 0x1F, 31),
            chan((bits >> 1) & 0x1F, 31),
            if bits & 0x1 != 0 { 1.0 } else { 0.0 },
        ),
        R5G5B5 => Vector4::new(chan((bits >> 10) & 0x1F, 31), chan((bits >> 5) & 0x1F, 31), chan(bits & 0x1F, 31), 1.0),
        A1B5G5R5 => Vector4::new(
            chan(bits & 0x1F, 31),
            chan((bits >> 5) & 0x1F, 31),
            chan((bits >> 10) & 0x1F, 31),
            if (bits >> 15) & 0x1 != 0 { 1.0 } else { 0.0 },
        ),
        B5G5R5 => Vector4::new(chan(bits & 0x1F, 31), chan((bits >> 5) & 0x1F, 31), chan((bits >> 10) & 0x1F, 31), 1.0),
        R3G2B2A1 => Vector4::new(
            chan((bits >> 5) & 0x7, 7),
            chan((bits >> 3) & 0x3, 3),
            chan((bits >> 1) & 0x3, 3),
            if bits & 0x1 != 0 { 1.0 } else { 0.0 },
        ),
        R3G3B2 => Vector4::new(chan((bits >> 5) & 0x7, 7), chan((bits >> 2) & 0x7, 7), chan(bits & 0x3, 3), 1.0),
        A1B2G2R3 => Vector4::new(
            chan(bits & 0x7, 7),
            chan((bits >> 3) & 0x3, 3),
            chan((bits >> 5) & 0x3, 3),
            if (bits >> 7) & 0x1 != 0 { 1.0 } else { 0.0 },
        ),
        B2G3R3 => Vector4::new(chan(bits & 0x7, 7), chan((bits >> 2) & 0x7, 7), chan((bits >> 5) & 0x3, 3), 1.0),
    }
}

/// Read the raw packed bits for one pixel out of a buffer at `index`.
///
/// # Safety
/// `ptr` must point to a buffer of the given `format` with at least
/// `index + 1` pixels.
pub unsafe fn read_packed(format: PixelFormat, ptr: *const u8, index: usize) -> u32 {
    match format.info().packed_bytes {
        4 => *(ptr as *const u32).add(index),
        2 => *(ptr as *const u16).add(index) as u32,
        1 => *ptr.add(index) as u32,
        _ => unreachable!("pixel formats are 1, 2, or 4 bytes"),
    }
}

/// Write raw packed bits for one pixel into a buffer at `index`.
///
/// # Safety
/// `ptr` must point to a buffer of the given `format` with at least
/// `index + 1` pixels.
pub unsafe fn write_packed(format: PixelFormat, ptr: *mut u8, index: usize, bits: u32) {
    match format.info().packed_bytes {
        4 => *(ptr as *mut u32).add(index) = bits,
        2 => *(ptr as *mut u16).add(index) = bits as u16,
        1 => *ptr.add(index) = bits as u8,
        _ => unreachable!("pixel formats are 1, 2, or 4 bytes"),
    }
}

/// Write a pixel, optionally blending with the destination. `rgba16` channels
/// are 16.16 fixed point representing `[0, 1]`.
///
/// Blending is straight source-over with source alpha as opacity:
/// `final = src*a + dst*(1-a)` per channel for 8-bit-alpha formats; 1-bit
/// alpha formats treat alpha as a discard threshold (below half, the write
/// is skipped entirely; at or above, the pixel is stored opaque).
///
/// # Safety
/// `ptr` must point to a valid buffer of `format` with at least `index + 1`
/// pixels.
pub unsafe fn plot(format: PixelFormat, ptr: *mut u8, index: usize, rgba16: (i32, i32, i32, i32), blend: bool) {
    let (r16, g16, b16, a16) = (rgba16.0.max(0) as u32, rgba16.1.max(0) as u32, rgba16.2.max(0) as u32, rgba16.3.max(0) as u32);

    if !blend || format.info().alpha == super::AlphaKind::None {
        write_packed(format, ptr, index, encode_16_16(format, r16, g16, b16, a16));
        return;
    }

    match format.info().alpha {
        super::AlphaKind::OneBit => {
            // threshold: below half alpha, discard; otherwise store fully opaque.
            if a16 < 32768 {
                return;
            }
            write_packed(format, ptr, index, encode_16_16(format, r16, g16, b16, a16));
        }
        super::AlphaKind::Full => {
            if a16 >= 65536 {
                write_packed(format, ptr, index, encode_16_16(format, r16, g16, b16, a16));
                return;
            }
            if a16 == 0 {
                return;
            }
            let dst_bits = read_packed(format, ptr, index);
            let dst = decode_to_normalized(format, dst_bits);
            let alpha = a16 as f32 / 65536.0;
            let inv = 1.0 - alpha;
            let src = decode_to_normalized(format, encode_16_16(format, r16, g16, b16, a16));
            let blended = Vector4::new(
                src.x * alpha + dst.x * inv,
                src.y * alpha + dst.y * inv,
                src.z * alpha + dst.z * inv,
                src.w * alpha + dst.w * inv,
            );
            write_packed(format, ptr, index, encode(format, blended));
        }
        super::AlphaKind::None => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_r8g8b8a8() {
        let bits = encode(R8G8B8A8, Vector4::new(1.0, 0.0, 0.5, 1.0));
        let back = decode_to_normalized(R8G8B8A8, bits);
        assert_eq!(back.x, 1.0);
        assert_eq!(back.y, 0.0);
        assert!((back.z - 0.5).abs() < 1.0 / 255.0);
        assert_eq!(back.w, 1.0);
    }

    #[test]
    fn no_alpha_format_defaults_to_opaque() {
        let bits = encode(R8G8B8, Vector4::new(0.2, 0.2, 0.2, 0.0));
        let back = decode_to_normalized(R8G8B8, bits);
        assert_eq!(back.w, 1.0);
    }

    #[test]
    fn one_bit_alpha_round_trips_as_boolean() {
        let bits = encode(R5G5B5A1, Vector4::new(1.0, 1.0, 1.0, 0.0));
        let back = decode_to_normalized(R5G5B5A1, bits);
        assert_eq!(back.w, 0.0);

        let bits = encode(R5G5B5A1, Vector4::new(1.0, 1.0, 1.0, 1.0));
        let back = decode_to_normalized(R5G5B5A1, bits);
        assert_eq!(back.w, 1.0);
    }

    #[test]
    fn plot_blend_quick_paths() {
        let mut buf = [0u32; 1];
        let ptr = buf.as_mut_ptr() as *mut u8;
        unsafe {
            write_packed(R8G8B8A8, ptr, 0, encode(R8G8B8A8, Vector4::new(0.0, 0.0, 0.0, 1.0)));
            // full alpha overwrites unconditionally
            plot(R8G8B8A8, ptr, 0, (65536, 0, 0, 65536), true);
            assert_eq!(read_packed(R8G8B8A8, ptr, 0), encode(R8G8B8A8, Vector4::new(1.0, 0.0, 0.0, 1.0)));
            // zero alpha leaves destination untouched
            plot(R8G8B8A8, ptr, 0, (0, 65536, 0, 0), true);
            assert_eq!(read_packed(R8G8B8A8, ptr, 0), encode(R8G8B8A8, Vector4::new(1.0, 0.0, 0.0, 1.0)));
        }
    }

    #[test]
    fn plot_half_alpha_blends_evenly() {
        let mut buf = [0u32; 1];
        let ptr = buf.as_mut_ptr() as *mut u8;
        unsafe {
            write_packed(R8G8B8A8, ptr, 0, encode(R8G8B8A8, Vector4::new(0.0, 0.0, 0.0, 1.0)));
            plot(R8G8B8A8, ptr, 0, (65536, 65536, 65536, 32768), true);
            let bits = read_packed(R8G8B8A8, ptr, 0);
            let c = decode_to_normalized(R8G8B8A8, bits);
            assert!((c.x - 0.5).abs() < 1.0 / 255.0 + 0.01);
        }
    }
}
