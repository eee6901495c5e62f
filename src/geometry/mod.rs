//! Raster-space dimensions and linear pixel indexing.

pub mod coordinate;
pub mod dimension;
pub mod winding;

pub use self::coordinate::Coordinate;
pub use self::dimension::Dimensions;
pub use self::winding::FaceWinding;
