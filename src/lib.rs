//! A CPU-only software rasterizer core: homogeneous clipping, perspective
//! division, viewport mapping, and scanline/edge rasterization of triangles,
//! lines, and points into packed-format color and depth buffers.
//!
//! Everything here is single-threaded and synchronous — no call suspends,
//! no background work happens. Per-draw pipeline operations never fail:
//! missing context state, incomplete configuration, and numeric
//! degeneracies are silently absorbed (see [`error`] for the exceptions —
//! the handful of construction-time entry points a caller can check).

#[macro_use]
extern crate failure;

extern crate nalgebra;
extern crate num_traits;
extern crate smallvec;

pub mod clip;
pub mod color;
pub mod context;
pub mod depth;
pub mod error;
pub mod fixed;
pub mod geometry;
pub mod primitive;
pub mod raster;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use context::Context;
pub use error::{RenderError, RenderResult};
