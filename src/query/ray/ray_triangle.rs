use crate::math::{Point, Real, Vector};
use crate::query::{Ray, RayCast, RayIntersection};
use crate::shape::Triangle;

impl RayCast for Triangle {
    #[inline]
    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
    ) -> Option<RayIntersection> {
        let inter = local_ray_intersection_with_triangle(&self.a, &self.b, &self.c, ray)?.0;

        if inter.time_of_impact <= max_time_of_impact {
            Some(inter)
        } else {
            None
        }
    }
}

/// Computes the intersection between a triangle and a ray.
///
/// Both faces of the triangle are hit. If an intersection is found, the time of impact, the
/// normal facing the ray origin and the barycentric coordinates of the intersection point are
/// returned. Hits on the boundary of the triangle are reported.
pub fn local_ray_intersection_with_triangle(
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
    ray: &Ray,
) -> Option<(RayIntersection, [Real; 3])> {
    let ab = *b - *a;
    let ac = *c - *a;

    let n = ab.cross(&ac);
    let d = n.dot(&ray.dir);

    // The ray is parallel to the triangle plane.
    if d == 0.0 {
        return None;
    }

    let ap = ray.origin - *a;
    let t = ap.dot(&n);

    // The ray is moving away from the triangle plane.
    if (t < 0.0 && d < 0.0) || (t > 0.0 && d > 0.0) {
        return None;
    }

    let backface = d > 0.0;
    let sign = if backface { -1.0 } else { 1.0 };
    let d = d.abs();
    let e = -ray.dir.cross(&ap);

    let v = sign * ac.dot(&e);
    if v < 0.0 || v > d {
        return None;
    }

    let w = -sign * ab.dot(&e);
    if w < 0.0 || v + w > d {
        return None;
    }

    let inv_d = 1.0 / d;
    let toi = t.abs() * inv_d;
    let normal: Vector<Real> = n.normalize() * sign;
    let (v, w) = (v * inv_d, w * inv_d);

    Some((
        RayIntersection::new(toi, normal, backface),
        [1.0 - v - w, v, w],
    ))
}
