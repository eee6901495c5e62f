//! Texture unit descriptor and nearest-texel sampling.
//!
//! Nearest-texel only, clamp-to-edge only — no mipmaps, no bilinear, no
//! wrap/mirror. The `compressed` flag switches the storage layout: raw
//! per-channel bytes (3 or 4 per texel, regardless of the format's bit
//! depth) versus the format's packed bit layout.

use crate::color::{codec, AlphaKind, PixelFormat, Rgba};

/// Bytes per texel in the non-compressed storage layout: 4 if the format
/// has any alpha channel, 3 otherwise. This is independent of the format's
/// actual per-channel bit depth — a 5-bit or 3-bit format still burns a
/// full byte per channel uncompressed.
fn texel_bytes_uncompressed(format: PixelFormat) -> usize {
    match format.info().alpha {
        AlphaKind::None => 3,
        AlphaKind::OneBit | AlphaKind::Full => 4,
    }
}

/// Channel order a format's uncompressed texel bytes are stored in.
enum ChannelOrder {
    Rgb,
    Bgr,
    Rgba,
    Abgr,
}

fn channel_order(format: PixelFormat) -> ChannelOrder {
    use PixelFormat::*;
    match format {
        R8G8B8A8 | R5G5B5A1 | R3G2B2A1 => ChannelOrder::Rgba,
        A8B8G8R8 | A1B5G5R5 | A1B2G2R3 => ChannelOrder::Abgr,
        R8G8B8 | R5G5B5 | R3G3B2 => ChannelOrder::Rgb,
        B8G8R8 | B5G5R5 | B2G3R3 => ChannelOrder::Bgr,
    }
}

/// A bound texture unit.
#[derive(Debug, Clone, Copy)]
pub struct TextureUnit {
    pub data: *const u8,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub compressed: bool,
}

impl TextureUnit {
    /// A unit is complete iff it has a non-null pointer and positive
    /// dimensions; only complete units are sampled.
    #[inline]
    pub fn is_complete(&self) -> bool {
        !self.data.is_null() && self.width > 0 && self.height > 0
    }

    /// Fetches and decodes the texel at `(x, y)`, clamped to bounds.
    ///
    /// # Safety
    /// `self.data` must point to a buffer large enough for `width*height`
    /// texels in the unit's storage layout.
    pub unsafe fn sample(&self, x: i32, y: i32) -> Rgba {
        let cx = x.clamp(0, self.width as i32 - 1) as usize;
        let cy = y.clamp(0, self.height as i32 - 1) as usize;
        let index = cy * self.width as usize + cx;

        if self.compressed {
            let bits = codec::read_packed(self.format, self.data, index);
            return codec::decode_to_normalized(self.format, bits);
        }

        let texel_bytes = texel_bytes_uncompressed(self.format);
        let base = self.data.add(index * texel_bytes);
        let read = |i: usize| -> f32 { *base.add(i) as f32 / 255.0 };

        match (channel_order(self.format), texel_bytes) {
            (ChannelOrder::Rgb, 3) => Rgba::new(read(0), read(1), read(2), 1.0),
            (ChannelOrder::Bgr, 3) => Rgba::new(read(2), read(1), read(0), 1.0),
            (ChannelOrder::Rgba, 4) => Rgba::new(read(0), read(1), read(2), read(3)),
            (ChannelOrder::Abgr, 4) => Rgba::new(read(3), read(2), read(1), read(0)),
            _ => unreachable!("channel order and texel width are derived from the same format"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_out_of_range_coordinates() {
        // 2x2 R8G8B8A8 texture, uncompressed, 4 bytes/texel.
        let texels: [u8; 16] = [
            255, 0, 0, 255, // (0,0) red
            0, 255, 0, 255, // (1,0) green
            0, 0, 255, 255, // (0,1) blue
            255, 255, 255, 255, // (1,1) white
        ];
        let unit = TextureUnit {
            data: texels.as_ptr(),
            width: 2,
            height: 2,
            format: PixelFormat::R8G8B8A8,
            compressed: false,
        };
        assert!(unit.is_complete());

        unsafe {
            // out-of-range clamps to the nearest edge texel
            assert_eq!(unit.sample(-5, -5), unit.sample(0, 0));
            assert_eq!(unit.sample(50, 50), unit.sample(1, 1));
            assert_eq!(unit.sample(0, 0), Rgba::new(1.0, 0.0, 0.0, 1.0));
            assert_eq!(unit.sample(1, 0), Rgba::new(0.0, 1.0, 0.0, 1.0));
        }
    }

    #[test]
    fn incomplete_unit_is_not_complete() {
        let unit = TextureUnit { data: std::ptr::null(), width: 0, height: 0, format: PixelFormat::R8G8B8A8, compressed: false };
        assert!(!unit.is_complete());
    }
}
