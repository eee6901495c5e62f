//! Triangle winding, used for backface culling.

/// Which way a screen-space triangle's vertices turn, in viewer-facing order.
///
/// A mesh authored with consistent winding lets `should_cull` drop every
/// triangle facing away from the camera, since a back-facing triangle's
/// vertices always turn the opposite way from a front-facing one once
/// projected to screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceWinding {
    Clockwise,
    CounterClockwise,
}