//! Geometric queries on triangles, bounding boxes and surfaces.

pub use self::point::TrianglePointLocation;
pub use self::ray::{Ray, RayCast, RayIntersection};
pub use self::split::SplitResult;

pub mod point;
pub mod ray;
mod split;
