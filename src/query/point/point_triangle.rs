use crate::math::{Point, Real, Vector};
use crate::shape::Triangle;

/// Description of the feature of a triangle closest to a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrianglePointLocation {
    /// The point projects on a vertex (`0 = a`, `1 = b`, `2 = c`).
    OnVertex(u32),
    /// The point projects on an edge.
    ///
    /// The 0-th edge is the segment AB.
    /// The 1-st edge is the segment BC.
    /// The 2-nd edge is the segment CA.
    OnEdge(u32),
    /// The point projects on the triangle interior.
    OnFace,
}

impl Triangle {
    /// Projects `pt` on this triangle and reports which feature the projection lies on.
    pub fn project_local_point_and_get_location(
        &self,
        pt: &Point<Real>,
    ) -> (Point<Real>, TrianglePointLocation) {
        let a = self.a;
        let b = self.b;
        let c = self.c;

        let ab = b - a;
        let ac = c - a;
        let ap = pt - a;

        let ab_ap = ab.dot(&ap);
        let ac_ap = ac.dot(&ap);

        if ab_ap <= 0.0 && ac_ap <= 0.0 {
            // Voronoï region of `a`.
            return (a, TrianglePointLocation::OnVertex(0));
        }

        let bp = pt - b;
        let ab_bp = ab.dot(&bp);
        let ac_bp = ac.dot(&bp);

        if ab_bp >= 0.0 && ac_bp <= ab_bp {
            // Voronoï region of `b`.
            return (b, TrianglePointLocation::OnVertex(1));
        }

        let cp = pt - c;
        let ab_cp = ab.dot(&cp);
        let ac_cp = ac.dot(&cp);

        if ac_cp >= 0.0 && ab_cp <= ac_cp {
            // Voronoï region of `c`.
            return (c, TrianglePointLocation::OnVertex(2));
        }

        // Cross products instead of the barycentric shortcuts: they stay
        // stable for thin triangles.
        let bc = c - b;
        let n = ab.cross(&ac);

        let vc = n.dot(&ab.cross(&ap));
        if vc < 0.0 && ab_ap >= 0.0 && ab_bp <= 0.0 {
            let v = ab_ap / ab.norm_squared();
            return (a + ab * v, TrianglePointLocation::OnEdge(0));
        }

        let vb = -n.dot(&ac.cross(&cp));
        if vb < 0.0 && ac_ap >= 0.0 && ac_cp <= 0.0 {
            let w = ac_ap / ac.norm_squared();
            return (a + ac * w, TrianglePointLocation::OnEdge(2));
        }

        let va = n.dot(&bc.cross(&bp));
        if va < 0.0 && ac_bp - ab_bp >= 0.0 && ab_cp - ac_cp >= 0.0 {
            let w = bc.dot(&bp) / bc.norm_squared();
            return (b + bc * w, TrianglePointLocation::OnEdge(1));
        }

        let sum = va + vb + vc;
        if sum != 0.0 {
            let v = vb / sum;
            let w = vc / sum;
            return (a + ab * v + ac * w, TrianglePointLocation::OnFace);
        }

        // Degenerate triangle: keep the closest of the three edge projections.
        let edges = [(a, ab, 0), (b, bc, 1), (c, a - c, 2)];
        let mut best = (a, TrianglePointLocation::OnVertex(0));
        let mut best_dist = Real::MAX;

        for (origin, dir, id) in edges {
            let len2 = dir.norm_squared();
            let t = if len2 > 0.0 {
                ((pt - origin).dot(&dir) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let proj = origin + dir * t;
            let dist = na::distance_squared(pt, &proj);

            if dist < best_dist {
                best_dist = dist;
                best = (proj, TrianglePointLocation::OnEdge(id));
            }
        }

        best
    }

    /// The distance between `pt` and this triangle.
    #[inline]
    pub fn distance_to_local_point(&self, pt: &Point<Real>) -> Real {
        let (proj, _) = self.project_local_point_and_get_location(pt);
        let diff: Vector<Real> = pt - proj;
        diff.norm()
    }
}
