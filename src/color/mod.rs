//! Packed pixel formats and the normalized color they decode to/from.
//!
//! The source dispatches on a format tag with a large `switch` per pixel.
//! Here each format is a variant of [`PixelFormat`] and the encode/decode
//! functions match on it once per call rather than per channel, with the
//! per-format constants (`channel_max`, byte width, channel order) held in
//! [`FormatInfo`] so a caller can look dispatch data up without re-deriving
//! it from the tag every time.

pub mod codec;

use nalgebra::Vector4;

/// Normalized RGBA color, channels in `[0, 1]`.
pub type Rgba = Vector4<f32>;

#[inline]
pub fn rgba_empty() -> Rgba {
    Vector4::new(0.0, 0.0, 0.0, 0.0)
}

/// The dozen packed pixel formats from the external interface table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8G8B8A8,
    R8G8B8,
    A8B8G8R8,
    B8G8R8,
    R5G5B5A1,
    R5G5B5,
    A1B5G5R5,
    B5G5R5,
    R3G2B2A1,
    R3G3B2,
    A1B2G2R3,
    B2G3R3,
}

/// Whether a format's alpha channel is a full 8-bit value or a 1-bit
/// presence switch, or absent entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaKind {
    None,
    OneBit,
    Full,
}

#[derive(Debug, Clone, Copy)]
pub struct FormatInfo {
    /// Bytes occupied by one packed pixel (not to be confused with the
    /// uncompressed-texture byte width, which is format-independent — see
    /// `texture::TEXEL_BYTES_UNCOMPRESSED`).
    pub packed_bytes: u8,
    pub alpha: AlphaKind,
}

impl PixelFormat {
    pub fn from_tag(tag: u32) -> Option<PixelFormat> {
        use PixelFormat::*;
        Some(match tag {
            0 => R8G8B8A8,
            1 => R8G8B8,
            2 => A8B8G8R8,
            3 => B8G8R8,
            4 => R5G5B5A1,
            5 => R5G5B5,
            6 => A1B5G5R5,
            7 => B5G5R5,
            8 => R3G2B2A1,
            9 => R3G3B2,
            10 => A1B2G2R3,
            11 => B2G3R3,
            _ => return None,
        })
    }

    pub fn info(self) -> FormatInfo {
        use PixelFormat::*;
        match self {
            R8G8B8A8 | A8B8G8R8 => FormatInfo { packed_bytes: 4, alpha: AlphaKind::Full },
            R8G8B8 | B8G8R8 => FormatInfo { packed_bytes: 4, alpha: AlphaKind::None },
            R5G5B5A1 | A1B5G5R5 => FormatInfo { packed_bytes: 2, alpha: AlphaKind::OneBit },
            R5G5B5 | B5G5R5 => FormatInfo { packed_bytes: 2, alpha: AlphaKind::None },
            R3G2B2A1 | A1B2G2R3 => FormatInfo { packed_bytes: 1, alpha: AlphaKind::OneBit },
            R3G3B2 | B2G3R3 => FormatInfo { packed_bytes: 1, alpha: AlphaKind::None },
        }
    }
}
