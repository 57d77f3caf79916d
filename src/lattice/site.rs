use super::neighbours::NUM_NEIGHBOURS;
use super::site_config::SiteType;
use crate::math::{LatticeIndex, Point, Real, Vector};
use crate::shape::{Iolet, IoletKind};

/// A lattice site and the classification state accumulated for it.
///
/// A site is updated both by its own classification and by the classification of the
/// earlier sites it neighbours.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    /// The global integer coordinates of this site.
    pub index: LatticeIndex,
    /// The position of this site.
    pub position: Point<Real>,
    /// Whether this site lies inside the fluid region, if known yet.
    pub is_fluid: Option<bool>,
    /// Whether a lattice link of this site crosses the surface.
    ///
    /// Once the site is classified, only wall crossings count.
    pub is_edge: bool,
    /// The iolet with the closest crossing, if any.
    pub iolet: Option<Iolet>,
    /// The normal of [`Site::iolet`].
    pub boundary_normal: Vector<Real>,
    /// The distance to the closest iolet crossing.
    pub boundary_distance: Real,
    /// The surface normal at the closest wall crossing.
    pub wall_normal: Vector<Real>,
    /// The distance to the closest wall crossing.
    pub wall_distance: Real,
    /// For each lattice direction, the distance to the first surface crossing.
    pub cut_distances: [Real; NUM_NEIGHBOURS],
    /// For each lattice direction, the triangle of the first surface crossing.
    pub cut_cell_ids: [Option<u32>; NUM_NEIGHBOURS],
}

impl Site {
    /// An unclassified site.
    pub fn new(index: LatticeIndex, position: Point<Real>) -> Self {
        Self {
            index,
            position,
            is_fluid: None,
            is_edge: false,
            iolet: None,
            boundary_normal: Vector::zeros(),
            boundary_distance: Real::INFINITY,
            wall_normal: Vector::zeros(),
            wall_distance: Real::INFINITY,
            cut_distances: [Real::INFINITY; NUM_NEIGHBOURS],
            cut_cell_ids: [None; NUM_NEIGHBOURS],
        }
    }

    /// The type of this site. Sites of unknown status are solid.
    pub fn site_type(&self) -> SiteType {
        if self.is_fluid != Some(true) {
            return SiteType::Solid;
        }

        match self.iolet.map(|io| io.kind) {
            Some(IoletKind::Inlet) => SiteType::Inlet,
            Some(IoletKind::Outlet) => SiteType::Outlet,
            None => SiteType::Fluid,
        }
    }

    /// The index of [`Site::iolet`] among the iolets of its kind.
    pub fn boundary_id(&self) -> Option<u32> {
        self.iolet.map(|io| io.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_follows_fluid_status_and_iolet() {
        let mut site = Site::new(LatticeIndex::new(1, 2, 3), Point::origin());
        assert_eq!(site.site_type(), SiteType::Solid);

        site.is_fluid = Some(true);
        assert_eq!(site.site_type(), SiteType::Fluid);

        let mut outlet = Iolet::outlet(Point::origin(), Vector::z());
        outlet.index = 4;
        site.iolet = Some(outlet);
        assert_eq!(site.site_type(), SiteType::Outlet);
        assert_eq!(site.boundary_id(), Some(4));

        site.is_fluid = Some(false);
        assert_eq!(site.site_type(), SiteType::Solid);
    }
}
