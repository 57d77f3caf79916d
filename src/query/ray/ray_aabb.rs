use std::mem;

use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector, DIM};
use crate::query::{Ray, RayCast, RayIntersection};

impl RayCast for Aabb {
    fn cast_local_ray(&self, ray: &Ray, max_time_of_impact: Real) -> Option<Real> {
        let mut tmin: Real = 0.0;
        let mut tmax: Real = max_time_of_impact;

        for i in 0usize..DIM {
            if ray.dir[i] == 0.0 {
                if ray.origin[i] < self.mins[i] || ray.origin[i] > self.maxs[i] {
                    return None;
                }
            } else {
                let denom = 1.0 / ray.dir[i];
                let mut near = (self.mins[i] - ray.origin[i]) * denom;
                let mut far = (self.maxs[i] - ray.origin[i]) * denom;

                if near > far {
                    mem::swap(&mut near, &mut far)
                }

                tmin = tmin.max(near);
                tmax = tmax.min(far);

                // Also covers a negative `tmax` since `tmin` starts at zero.
                if tmin > tmax {
                    return None;
                }
            }
        }

        Some(tmin)
    }

    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
    ) -> Option<RayIntersection> {
        let toi = self.cast_local_ray(ray, max_time_of_impact)?;
        let hit = ray.point_at(toi);
        let mut normal = Vector::zeros();
        let mut best = Real::MAX;

        for i in 0..DIM {
            let to_min = (hit[i] - self.mins[i]).abs();
            let to_max = (self.maxs[i] - hit[i]).abs();

            if to_min < best {
                best = to_min;
                normal = -Vector::ith(i, 1.0);
            }
            if to_max < best {
                best = to_max;
                normal = Vector::ith(i, 1.0);
            }
        }

        Some(RayIntersection::new(toi, normal, toi == 0.0))
    }
}

#[cfg(test)]
mod tests {
    use crate::bounding_volume::Aabb;
    use crate::math::{Point, Vector};
    use crate::query::{Ray, RayCast};

    #[test]
    fn segment_crossing_box() {
        let aabb = Aabb::new(Point::new(1.0, -1.0, -1.0), Point::new(2.0, 1.0, 1.0));
        let ray = Ray::from_segment(Point::origin(), Point::new(4.0, 0.0, 0.0));
        assert_relative_eq!(aabb.cast_local_ray(&ray, 1.0).unwrap(), 0.25);

        let short = Ray::from_segment(Point::origin(), Point::new(0.5, 0.0, 0.0));
        assert!(aabb.cast_local_ray(&short, 1.0).is_none());

        let parallel = Ray::new(Point::new(0.0, 2.0, 0.0), Vector::x());
        assert!(!aabb.intersects_local_ray(&parallel, 10.0));
    }

    #[test]
    fn ray_starting_inside_hits_immediately() {
        let aabb = Aabb::new(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point::origin(), Vector::z());
        assert_eq!(aabb.cast_local_ray(&ray, 10.0), Some(0.0));
    }
}
