//! Ray-casting related definitions and implementations.

pub use self::ray::{Ray, RayCast, RayIntersection};
pub use self::ray_triangle::local_ray_intersection_with_triangle;

mod ray;
mod ray_aabb;
mod ray_triangle;
