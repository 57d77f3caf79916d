//! Point projection queries.

pub use self::point_triangle::TrianglePointLocation;

mod point_triangle;
