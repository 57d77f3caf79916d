use crate::math::{Point, Real, UnitVector, Vector};
use na::Unit;

/// Whether an iolet lets fluid in or out of the domain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum IoletKind {
    /// Fluid enters the domain through this iolet.
    Inlet,
    /// Fluid leaves the domain through this iolet.
    Outlet,
}

/// A planar inlet or outlet opening of the vessel surface.
///
/// The plane of the iolet passes through `centre` and is orthogonal to `normal`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Iolet {
    /// Inlet or outlet.
    pub kind: IoletKind,
    /// A point of the iolet plane.
    pub centre: Point<Real>,
    /// The normal of the iolet plane.
    pub normal: Vector<Real>,
    /// The index of this iolet among the iolets of the same kind.
    ///
    /// Assigned by [`assign_iolet_indices`].
    pub index: u32,
}

impl Iolet {
    /// Creates an iolet. Its index is set to zero until [`assign_iolet_indices`] is called.
    pub fn new(kind: IoletKind, centre: Point<Real>, normal: Vector<Real>) -> Self {
        Self {
            kind,
            centre,
            normal,
            index: 0,
        }
    }

    /// Creates an inlet.
    pub fn inlet(centre: Point<Real>, normal: Vector<Real>) -> Self {
        Self::new(IoletKind::Inlet, centre, normal)
    }

    /// Creates an outlet.
    pub fn outlet(centre: Point<Real>, normal: Vector<Real>) -> Self {
        Self::new(IoletKind::Outlet, centre, normal)
    }

    /// The normalized plane normal, or `None` if `self.normal` is (nearly) zero.
    pub fn unit_normal(&self) -> Option<UnitVector<Real>> {
        Unit::try_new(self.normal, Real::EPSILON)
    }

    /// Signed distance from `pt` to the iolet plane along `self.normal`.
    pub fn signed_distance(&self, pt: &Point<Real>) -> Real {
        self.unit_normal()
            .map(|n| (pt - self.centre).dot(&n))
            .unwrap_or(0.0)
    }
}

/// Numbers the iolets in list order, inlets and outlets separately.
///
/// After this call, the inlets have indices `0..num_inlets` and the outlets
/// `0..num_outlets`.
pub fn assign_iolet_indices(iolets: &mut [Iolet]) {
    let mut num_inlets = 0;
    let mut num_outlets = 0;

    for iolet in iolets.iter_mut() {
        let counter = match iolet.kind {
            IoletKind::Inlet => &mut num_inlets,
            IoletKind::Outlet => &mut num_outlets,
        };
        iolet.index = *counter;
        *counter += 1;
    }
}
