//! Transformations of surfaces: clipping at iolet planes, capping, export.

pub use self::clip::SurfaceClipper;
pub use self::ear_clipping::triangulate_ear_clipping;

mod clip;
mod ear_clipping;
#[cfg(feature = "wavefront")]
mod wavefront;
