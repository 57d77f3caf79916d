/*!
voxgen3d
========

**voxgen3d** turns a closed triangulated surface with labelled inlet and outlet
planes into a block-structured lattice geometry file for a lattice-Boltzmann
fluid solver.

The pipeline is:
1. [`transformation::SurfaceClipper`] cuts the raw surface at every iolet plane,
   caps the openings and tags each cap triangle with its iolet.
2. [`generation::SpatialIndex`] answers inside/outside and segment-crossing
   queries on the capped surface.
3. [`lattice::Domain`] covers the surface bounds with blocks of sites and
   streams them through a [`lattice::BlockSweep`].
4. [`generation::SiteClassifier`] resolves every site and packs it into a
   [`lattice::SiteConfig`] word.
5. [`generation::GeometryWriter`] serializes blocks with a two-pass header.

[`generation::GeometryGenerator`] drives all of the above.
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![deny(unused_qualifications)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[cfg(test)]
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod generation;
pub mod lattice;
pub mod partitioning;
pub mod query;
pub mod shape;
pub mod transformation;
pub mod utils;

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    pub use na::{Point2, Point3, UnitVector3, Vector2, Vector3};

    /// The scalar type used throughout this crate.
    pub use f64 as Real;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The unit vector type.
    pub use UnitVector3 as UnitVector;

    /// Integer coordinates of a lattice site, or of a block of sites.
    pub type LatticeIndex = Point3<i32>;
}
