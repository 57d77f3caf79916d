use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::partitioning::{Bvh, BvhNode};
use crate::query::{Ray, RayCast, TrianglePointLocation};
use crate::shape::{Surface, SurfacePseudoNormals};

/// The location of a point relative to a closed surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointLocation {
    /// The point is enclosed by the surface, or lies on it.
    Inside,
    /// The point lies outside of the surface.
    Outside,
}

/// A crossing between a segment and a surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentHit {
    /// The crossing point.
    pub point: Point<Real>,
    /// The position of the crossing along the segment: `0` at its start, `1` at its end.
    pub time_of_impact: Real,
    /// The index of the crossed triangle.
    pub cell: u32,
}

/// Acceleration structure for the point and segment queries made on a closed surface.
pub struct SpatialIndex<'a> {
    surface: &'a Surface,
    bvh: Bvh,
    pseudo_normals: SurfacePseudoNormals,
}

impl<'a> SpatialIndex<'a> {
    /// Builds the index of `surface`.
    ///
    /// The point containment test requires `surface` to be closed, manifold, and oriented with
    /// outward normals, as produced by the [`SurfaceClipper`](crate::transformation::SurfaceClipper).
    pub fn new(surface: &'a Surface) -> Self {
        // Flat triangles have flat boxes: give them some thickness for the ray tests.
        let margin = surface.aabb().extents().norm() * 1.0e-9;
        let leaves: Vec<_> = surface
            .triangles()
            .map(|tri| Aabb::from_points(tri.vertices()).loosened(margin))
            .collect();

        Self {
            surface,
            bvh: Bvh::from_leaves(&leaves),
            pseudo_normals: surface.pseudo_normals(),
        }
    }

    /// The indexed surface.
    #[inline]
    pub fn surface(&self) -> &'a Surface {
        self.surface
    }

    /// Is `pt` inside of the surface?
    ///
    /// The point is projected on the closest triangle, and the sign of its offset along the
    /// angle-weighted pseudo-normal of the closest feature tells the side it lies on.
    pub fn inside_or_outside(&self, pt: &Point<Real>) -> PointLocation {
        let closest = self.bvh.find_best(
            Real::MAX,
            |node: &BvhNode| node.aabb().distance_to_local_point(pt),
            |leaf| Some(self.surface.triangle(leaf).distance_to_local_point(pt)),
        );

        let Some((tri_id, _)) = closest else {
            return PointLocation::Outside;
        };

        let idx = self.surface.indices()[tri_id as usize];
        let (proj, location) = self
            .surface
            .triangle(tri_id)
            .project_local_point_and_get_location(pt);
        let pseudo_normal: Vector<Real> = match location {
            TrianglePointLocation::OnVertex(i) => {
                self.pseudo_normals.vertices_pseudo_normal[idx[i as usize] as usize]
            }
            TrianglePointLocation::OnEdge(i) => {
                self.pseudo_normals.edges_pseudo_normal[tri_id as usize][i as usize]
            }
            TrianglePointLocation::OnFace => self.surface.cell_normal(tri_id),
        };

        if (pt - proj).dot(&pseudo_normal) <= 0.0 {
            PointLocation::Inside
        } else {
            PointLocation::Outside
        }
    }

    /// All the crossings of the segment `[start, end]` with the surface.
    ///
    /// Hits are sorted by increasing distance to `start`, then by triangle index.
    pub fn intersect_segment(&self, start: &Point<Real>, end: &Point<Real>) -> Vec<SegmentHit> {
        let ray = Ray::from_segment(*start, *end);
        let mut hits: Vec<_> = self
            .bvh
            .leaves(|node: &BvhNode| node.aabb().intersects_local_ray(&ray, 1.0))
            .filter_map(|leaf| {
                let toi = self.surface.triangle(leaf).cast_local_ray(&ray, 1.0)?;
                Some(SegmentHit {
                    point: ray.point_at(toi),
                    time_of_impact: toi,
                    cell: leaf,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.time_of_impact
                .total_cmp(&b.time_of_impact)
                .then(a.cell.cmp(&b.cell))
        });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Iolet, Surface};
    use crate::transformation::SurfaceClipper;

    fn octahedron() -> Surface {
        let vertices = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(-1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, -1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(0.0, 0.0, -1.0),
        ];
        let indices = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        Surface::new(vertices, indices).unwrap()
    }

    #[test]
    fn octahedron_is_oriented_outward() {
        assert!(octahedron().signed_volume() > 0.0);
    }

    #[test]
    fn inside_test_matches_the_l1_ball() {
        let surface = octahedron();
        let index = SpatialIndex::new(&surface);
        let mut rng = oorandom::Rand64::new(42);

        for _ in 0..500 {
            let pt = Point::new(
                rng.rand_float() * 3.0 - 1.5,
                rng.rand_float() * 3.0 - 1.5,
                rng.rand_float() * 3.0 - 1.5,
            );
            let l1 = pt.x.abs() + pt.y.abs() + pt.z.abs();
            if (l1 - 1.0).abs() < 1.0e-6 {
                continue;
            }

            let expected = if l1 < 1.0 {
                PointLocation::Inside
            } else {
                PointLocation::Outside
            };
            assert_eq!(index.inside_or_outside(&pt), expected, "{}", pt);
        }

        // Closest to a vertex and to an edge.
        assert_eq!(
            index.inside_or_outside(&Point::new(0.0, 0.0, 1.5)),
            PointLocation::Outside
        );
        assert_eq!(
            index.inside_or_outside(&Point::new(0.0, 0.6, 0.6)),
            PointLocation::Outside
        );
        assert_eq!(
            index.inside_or_outside(&Point::new(0.0, 0.45, 0.45)),
            PointLocation::Inside
        );
    }

    #[test]
    fn segment_hits_are_sorted() {
        let surface = octahedron();
        let index = SpatialIndex::new(&surface);
        let start = Point::new(-2.0, 0.1, 0.2);
        let end = Point::new(2.0, 0.1, 0.2);
        let hits = index.intersect_segment(&start, &end);

        assert_eq!(hits.len(), 2);
        // |x| = 1 - 0.3 at both crossings.
        assert_relative_eq!(hits[0].point.x, -0.7, epsilon = 1.0e-12);
        assert_relative_eq!(hits[1].point.x, 0.7, epsilon = 1.0e-12);
        assert_relative_eq!(hits[0].time_of_impact, 1.3 / 4.0, epsilon = 1.0e-12);
        assert_eq!(surface.indices()[hits[0].cell as usize], [2, 1, 4]);
        assert_eq!(surface.indices()[hits[1].cell as usize], [0, 2, 4]);

        let inner = index.intersect_segment(&Point::new(-0.5, 0.1, 0.2), &Point::new(0.5, 0.1, 0.2));
        assert!(inner.is_empty());
        let half = index.intersect_segment(&Point::new(0.0, 0.1, 0.2), &end);
        assert_eq!(half.len(), 1);
    }

    #[test]
    fn clipped_surface_is_closed_for_queries() {
        let iolets = [
            Iolet::inlet(Point::new(0.0, 0.0, -0.5), Vector::z()),
            Iolet::outlet(Point::new(0.0, 0.0, 0.5), -Vector::z()),
        ];
        let clipped = SurfaceClipper::new(Point::origin())
            .clip(&octahedron(), &iolets)
            .unwrap();
        let index = SpatialIndex::new(&clipped);

        assert_eq!(
            index.inside_or_outside(&Point::new(0.1, 0.1, 0.45)),
            PointLocation::Inside
        );
        assert_eq!(
            index.inside_or_outside(&Point::new(0.1, 0.1, 0.55)),
            PointLocation::Outside
        );

        let hits = index.intersect_segment(&Point::new(0.1, 0.2, 0.0), &Point::new(0.1, 0.2, 2.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(clipped.iolet_id(hits[0].cell), 1);
        assert_relative_eq!(hits[0].point.z, 0.5, epsilon = 1.0e-9);
    }
}
