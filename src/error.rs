//! Construction-time error type.
//!
//! Per-draw pipeline operations never return these — they no-op per the
//! leniency policy (see `context` module docs). These are only surfaced
//! from entry points a caller can reasonably check up front.

#[derive(Debug, Fail)]
pub enum RenderError {
    #[fail(display = "no context is currently bound")]
    NoCurrentContext,
    #[fail(display = "renderbuffer dimensions {:?} do not match already-bound {:?}", new, existing)]
    DimensionMismatch { new: (u32, u32), existing: (u32, u32) },
    #[fail(display = "{} is not a recognized color or depth format", _0)]
    UnrecognizedPixelFormat(u32),
    #[fail(display = "texture unit {} is out of range (0..=255)", _0)]
    InvalidTextureUnit(u32),
}

pub type RenderResult<T> = Result<T, RenderError>;
