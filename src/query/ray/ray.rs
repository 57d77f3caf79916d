//! Traits and structure needed to cast rays.

use crate::math::{Point, Real, Vector};

/// A ray for ray-casting queries.
///
/// Points along the ray are `origin + dir * t` for `t ≥ 0`. The direction does
/// not need to be normalized: with `dir = p1 - p0` the time of impact is the
/// fraction of the segment `[p0, p1]` travelled before the hit.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Point<Real>,
    /// Direction of the ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a new ray starting from `origin` and with the direction `dir`.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }

    /// The ray going from `start` through `end`.
    ///
    /// A time of impact of `1.0` along this ray is reached at `end`.
    pub fn from_segment(start: Point<Real>, end: Point<Real>) -> Ray {
        Ray::new(start, end - start)
    }

    /// Computes the point at the given parameter on this ray.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }
}

/// Structure containing the result of a successful ray cast.
#[derive(Copy, Clone, Debug)]
pub struct RayIntersection {
    /// The time of impact of the ray with the object.
    pub time_of_impact: Real,
    /// The normal at the intersection point, facing the ray origin.
    pub normal: Vector<Real>,
    /// `true` if the ray entered the back side of the object.
    pub backface: bool,
}

impl RayIntersection {
    #[inline]
    /// Creates a new `RayIntersection`.
    pub fn new(time_of_impact: Real, normal: Vector<Real>, backface: bool) -> RayIntersection {
        RayIntersection {
            time_of_impact,
            normal,
            backface,
        }
    }
}

/// Traits of objects which can be tested for intersection with a ray.
pub trait RayCast {
    /// Computes the time of impact between this shape and a ray.
    fn cast_local_ray(&self, ray: &Ray, max_time_of_impact: Real) -> Option<Real> {
        self.cast_local_ray_and_get_normal(ray, max_time_of_impact)
            .map(|inter| inter.time_of_impact)
    }

    /// Computes the time of impact, and normal between this shape and a ray.
    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
    ) -> Option<RayIntersection>;

    /// Tests whether a ray intersects this shape before `max_time_of_impact`.
    #[inline]
    fn intersects_local_ray(&self, ray: &Ray, max_time_of_impact: Real) -> bool {
        self.cast_local_ray(ray, max_time_of_impact).is_some()
    }
}
