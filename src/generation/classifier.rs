use crate::generation::{PointLocation, SpatialIndex};
use crate::lattice::{
    neighbour_offset, reverse_direction, Domain, LATER_NEIGHBOURS, NUM_NEIGHBOURS,
};
use crate::math::{LatticeIndex, Point, Real, Vector};
use crate::shape::Iolet;

/// Resolves the fluid status and boundary data of lattice sites against a capped surface.
///
/// Sites must be classified in file order: each classification resolves the later
/// neighbours of the site from the parity of the surface crossings along their links, so
/// only the first site of each connected region needs a point containment query.
pub struct SiteClassifier<'a> {
    index: &'a SpatialIndex<'a>,
    iolets: &'a [Iolet],
    probe_offset: Vector<Real>,
}

impl<'a> SiteClassifier<'a> {
    /// A classifier querying `index`.
    ///
    /// The surface tag `i >= 0` designates `iolets[i]`. Every query point is translated by
    /// `probe_offset`, given in the units of the surface.
    pub fn new(index: &'a SpatialIndex<'a>, iolets: &'a [Iolet], probe_offset: Vector<Real>) -> Self {
        Self {
            index,
            iolets,
            probe_offset,
        }
    }

    /// The point at which `site` is tested against the surface.
    #[inline]
    pub fn probe_point(&self, domain: &Domain, site: &LatticeIndex) -> Point<Real> {
        domain.calc_position(site) + self.probe_offset
    }

    /// Classifies `site`, and propagates what its links tell about its later neighbours.
    ///
    /// Panics if a crossed triangle is tagged with an iolet index out of the iolet list.
    pub fn classify(&self, domain: &mut Domain, site: &LatticeIndex) {
        let start = self.probe_point(domain, site);
        let is_fluid = match domain.site_mut(site).is_fluid {
            Some(is_fluid) => is_fluid,
            None => self.index.inside_or_outside(&start) == PointLocation::Inside,
        };
        domain.site_mut(site).is_fluid = Some(is_fluid);

        for i in LATER_NEIGHBOURS {
            let neighbour = site + neighbour_offset(i);
            if !domain.contains_site(&neighbour) {
                continue;
            }

            let end = self.probe_point(domain, &neighbour);
            let hits = self.index.intersect_segment(&start, &end);
            let length = na::distance(&start, &end);

            if let (Some(first), Some(last)) = (hits.first(), hits.last()) {
                let s = domain.site_mut(site);
                s.cut_distances[i] = first.time_of_impact * length;
                s.cut_cell_ids[i] = Some(first.cell);
                s.is_edge = true;

                // Dropped if the block of `neighbour` is already written, see `LATER_NEIGHBOURS`.
                let j = reverse_direction(i);
                let n = domain.site_mut(&neighbour);
                n.cut_distances[j] = (1.0 - last.time_of_impact) * length;
                n.cut_cell_ids[j] = Some(last.cell);
                n.is_edge = true;
            }

            // Each crossing flips the side of the surface.
            domain.site_mut(&neighbour).is_fluid = Some(is_fluid == (hits.len() % 2 == 0));
        }

        let surface = self.index.surface();
        let s = domain.site_mut(site);

        if !is_fluid || !s.is_edge {
            return;
        }

        // From now on, only wall crossings make an edge.
        s.is_edge = false;

        for i in 0..NUM_NEIGHBOURS {
            let Some(cell) = s.cut_cell_ids[i] else {
                continue;
            };
            let distance = s.cut_distances[i];
            let tag = surface.iolet_id(cell);

            if tag >= 0 {
                if distance < s.boundary_distance {
                    let iolet = self.iolets[tag as usize];
                    s.boundary_normal = iolet
                        .unit_normal()
                        .map(|n| n.into_inner())
                        .unwrap_or(iolet.normal);
                    s.boundary_distance = distance;
                    s.iolet = Some(iolet);
                }
            } else {
                s.is_edge = true;

                if distance < s.wall_distance {
                    s.wall_distance = distance;
                    s.wall_normal = surface.cell_normal(cell);
                }
            }
        }
    }
}
