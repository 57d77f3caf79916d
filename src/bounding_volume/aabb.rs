//! Axis Aligned Bounding Box.

use crate::math::{Point, Real, Vector, DIM};
use na;

/// An Axis-Aligned Bounding Box (AABB).
///
/// Used for the bounds of a surface (which determine the lattice [`Domain`](crate::lattice::Domain))
/// and for the nodes of the [`Bvh`](crate::partitioning::Bvh) of a
/// [`SpatialIndex`](crate::generation::SpatialIndex).
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// The point with the smallest coordinates on each axis.
    pub mins: Point<Real>,
    /// The point with the largest coordinates on each axis.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB.
    ///
    /// # Arguments:
    ///   * `mins` - position of the point with the smallest coordinates.
    ///   * `maxs` - position of the point with the highest coordinates. Each component of `mins`
    ///     must be smaller than the related components of `maxs`.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with `mins` components set to `Real::max_values` and `maxs`components set to `-Real::max_values`.
    ///
    /// This is often used as the initial values of some AABB merging algorithms.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Computes the AABB bounding the given set of points.
    pub fn from_points<I>(pts: I) -> Self
    where
        I: IntoIterator<Item = Point<Real>>,
    {
        let mut result = Self::new_invalid();

        for pt in pts {
            result.take_point(pt);
        }

        result
    }

    /// Returns `false` if this AABB was never enlarged after [`Aabb::new_invalid`].
    #[inline]
    pub fn is_valid(&self) -> bool {
        na::partial_le(&self.mins, &self.maxs)
    }

    /// The center of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The extents of this AABB, i.e., `maxs - mins`.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// The half-extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        self.extents() * 0.5
    }

    /// Half of the area of this AABB, the cost metric of surface-area heuristics.
    #[inline]
    pub fn half_area(&self) -> Real {
        let extents = self.extents();
        extents.x * (extents.y + extents.z) + extents.y * extents.z
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// Merges `other` into this AABB.
    #[inline]
    pub fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.inf(&other.mins);
        self.maxs = self.maxs.sup(&other.maxs);
    }

    /// The smallest AABB containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// A copy of this AABB enlarged by `amount` on every side.
    #[inline]
    pub fn loosened(&self, amount: Real) -> Aabb {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        Aabb {
            mins: self.mins + Vector::repeat(-amount),
            maxs: self.maxs + Vector::repeat(amount),
        }
    }

    /// Does this AABB contain the given point?
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        for i in 0..DIM {
            if point[i] < self.mins[i] || point[i] > self.maxs[i] {
                return false;
            }
        }

        true
    }

    /// Distance from `pt` to this AABB. Zero if `pt` is inside.
    #[inline]
    pub fn distance_to_local_point(&self, pt: &Point<Real>) -> Real {
        let mins_pt = self.mins - pt;
        let pt_maxs = pt - self.maxs;
        mins_pt.sup(&pt_maxs).sup(&Vector::zeros()).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb;
    use crate::math::Point;

    #[test]
    fn aabb_from_points_is_tight() {
        let aabb = Aabb::from_points([
            Point::new(1.0, -2.0, 0.5),
            Point::new(-1.0, 3.0, 0.0),
            Point::new(0.0, 0.0, 4.0),
        ]);
        assert_eq!(aabb.mins, Point::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.maxs, Point::new(1.0, 3.0, 4.0));
        assert!(aabb.is_valid());
        assert!(!Aabb::new_invalid().is_valid());
    }

    #[test]
    fn aabb_point_distance() {
        let aabb = Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.distance_to_local_point(&Point::new(0.5, 0.5, 0.5)), 0.0);
        assert_relative_eq!(aabb.distance_to_local_point(&Point::new(3.0, 0.5, 0.5)), 2.0);
        assert_relative_eq!(
            aabb.distance_to_local_point(&Point::new(2.0, 2.0, 0.5)),
            2.0f64.sqrt()
        );
    }
}
