//! Definition of the triangle shape.

use crate::math::{Point, Real, UnitVector, Vector, DEFAULT_EPSILON};
use na::Unit;

/// A triangle shape.
#[derive(PartialEq, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// The triangle first point.
    pub a: Point<Real>,
    /// The triangle second point.
    pub b: Point<Real>,
    /// The triangle third point.
    pub c: Point<Real>,
}

impl Triangle {
    /// Creates a triangle from three points.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> Triangle {
        Triangle { a, b, c }
    }

    /// The vertices of this triangle.
    #[inline]
    pub fn vertices(&self) -> [Point<Real>; 3] {
        [self.a, self.b, self.c]
    }

    /// A vector normal of this triangle, with a norm equal to twice its area.
    ///
    /// It points towards the side from which the vertices appear counter-clockwise.
    #[inline]
    pub fn scaled_normal(&self) -> Vector<Real> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        ab.cross(&ac)
    }

    /// The normal of this triangle, or `None` if it is degenerate.
    #[inline]
    pub fn normal(&self) -> Option<UnitVector<Real>> {
        Unit::try_new(self.scaled_normal(), DEFAULT_EPSILON)
    }

    /// The area of this triangle.
    #[inline]
    pub fn area(&self) -> Real {
        self.scaled_normal().norm() * 0.5
    }

    /// The centroid of this triangle.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// The interior angles of this triangle at `a`, `b` and `c`.
    pub fn angles(&self) -> [Real; 3] {
        [
            (self.b - self.a).angle(&(self.c - self.a)),
            (self.a - self.b).angle(&(self.c - self.b)),
            (self.b - self.c).angle(&(self.a - self.c)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::Triangle;
    use crate::math::{Point, Vector};

    #[test]
    fn triangle_normal_area_angles() {
        let tri = Triangle::new(
            Point::origin(),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        );
        assert_relative_eq!(*tri.normal().unwrap(), Vector::z());
        assert_relative_eq!(tri.area(), 0.5);
        let angles = tri.angles();
        assert_relative_eq!(angles.iter().sum::<f64>(), std::f64::consts::PI);
        assert_relative_eq!(angles[0], std::f64::consts::FRAC_PI_2);

        let flat = Triangle::new(Point::origin(), Point::new(1.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0));
        assert!(flat.normal().is_none());
    }
}
