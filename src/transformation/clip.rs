use crate::generation::ConfigurationError;
use crate::math::{Point, Point2, Real, UnitVector, Vector};
use crate::query::SplitResult;
use crate::shape::{Iolet, Surface, SurfaceFlags, WALL_IOLET_ID};
use crate::transformation::ear_clipping::{signed_area2, triangulate_ear_clipping};
use crate::utils::hashmap::HashMap;
use log::{debug, warn};
use smallvec::SmallVec;

/// Cuts a closed surface at the planes of its iolets and closes each opening with a flat cap.
///
/// The triangles of each cap are tagged with the position of their iolet in the iolet list.
/// Every other triangle is tagged as wall ([`WALL_IOLET_ID`]).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SurfaceClipper {
    /// A point of the fluid region.
    ///
    /// At each iolet plane, the half-space containing this point is kept, and only the
    /// connected part of the surface closest to it survives.
    pub seed_point: Point<Real>,
    /// Vertices closer than this distance to an iolet plane are considered to lie on it.
    pub epsilon: Real,
}

impl SurfaceClipper {
    /// A clipper keeping the part of the surface around `seed_point`.
    pub fn new(seed_point: Point<Real>) -> Self {
        Self {
            seed_point,
            epsilon: 1.0e-9,
        }
    }

    /// Clips `raw` at each iolet plane, in list order, and caps the openings.
    ///
    /// The iolet tags of `raw` are ignored. The result is cleaned up: duplicate vertices are
    /// merged, degenerate and duplicate triangles are removed, and it is oriented with
    /// outward normals.
    pub fn clip(&self, raw: &Surface, iolets: &[Iolet]) -> Result<Surface, ConfigurationError> {
        let mut surface = Surface::from_parts(
            raw.vertices().to_vec(),
            raw.indices().to_vec(),
            vec![WALL_IOLET_ID; raw.num_triangles()],
        );
        // Connectivity is based on vertex indices, so duplicates must be merged first.
        surface.set_flags(SurfaceFlags::CLEAN)?;

        for (i, iolet) in iolets.iter().enumerate() {
            let normal = iolet
                .unit_normal()
                .ok_or(ConfigurationError::DegenerateIoletNormal { iolet: i })?;
            let seed_dist = (self.seed_point - iolet.centre).dot(&normal);

            if seed_dist.abs() <= self.epsilon {
                return Err(ConfigurationError::SeedOnIoletPlane { iolet: i });
            }

            let bias = iolet.centre.coords.dot(&normal);
            let kept = match surface.local_split(&normal, bias, self.epsilon) {
                SplitResult::Pair(negative, positive) => {
                    if seed_dist < 0.0 {
                        negative
                    } else {
                        positive
                    }
                }
                SplitResult::Negative if seed_dist < 0.0 => {
                    warn!("the plane of the iolet {} does not cut the surface", i);
                    continue;
                }
                SplitResult::Positive if seed_dist > 0.0 => {
                    warn!("the plane of the iolet {} does not cut the surface", i);
                    continue;
                }
                _ => return Err(ConfigurationError::EmptyClip { iolet: i }),
            };

            if kept.is_empty() {
                return Err(ConfigurationError::EmptyClip { iolet: i });
            }

            let mut kept = self.seeded_component(kept);
            // Intersection points only lie on the plane up to rounding.
            let tolerance = self.epsilon.max(1.0e-9 * (1.0 + bias.abs()));
            let loops = boundary_loops(&kept, &normal, bias, tolerance)
                .ok_or(ConfigurationError::UnclosedBoundaryLoop { iolet: i })?;

            debug!(
                "iolet {}: kept {} triangles, capping {} boundary loop(s)",
                i,
                kept.num_triangles(),
                loops.len()
            );

            for polyline in &loops {
                cap_loop(&mut kept, polyline, &normal, i as i32);
            }

            surface = kept;
        }

        surface.set_flags(SurfaceFlags::CLEAN)?;
        Ok(surface)
    }

    /// The connected component of `surface` with the vertex closest to the seed point.
    fn seeded_component(&self, surface: Surface) -> Surface {
        let components = surface.connected_components();

        if components.len() <= 1 {
            return surface;
        }

        let vertices = surface.vertices();
        let mut best = (Real::MAX, 0);

        for (t, idx) in surface.indices().iter().enumerate() {
            for i in idx {
                let dist = na::distance_squared(&vertices[*i as usize], &self.seed_point);
                if dist < best.0 {
                    best = (dist, t as u32);
                }
            }
        }

        components
            .iter()
            .find(|component| component.contains(&best.1))
            .map(|component| surface.extract_triangles(component))
            .unwrap_or(surface)
    }
}

/// Chains the boundary half-edges of `surface` lying on the plane `normal · x = bias` into
/// closed polylines.
///
/// Each polyline follows the direction of its half-edges. Returns `None` if a polyline cannot
/// be closed or has less than three vertices.
fn boundary_loops(
    surface: &Surface,
    normal: &UnitVector<Real>,
    bias: Real,
    tolerance: Real,
) -> Option<Vec<Vec<u32>>> {
    let vertices = surface.vertices();
    let on_plane = |i: u32| (vertices[i as usize].coords.dot(normal) - bias).abs() <= tolerance;
    let (edges, off_plane): (Vec<_>, Vec<_>) = surface
        .boundary_half_edges()
        .into_iter()
        .partition(|e| on_plane(e[0]) && on_plane(e[1]));

    if !off_plane.is_empty() {
        warn!(
            "{} boundary edges do not lie on the iolet plane and are left open",
            off_plane.len()
        );
    }

    let mut outgoing: HashMap<u32, SmallVec<[usize; 2]>> = HashMap::default();
    for (k, e) in edges.iter().enumerate() {
        outgoing.entry(e[0]).or_default().push(k);
    }

    let mut used = vec![false; edges.len()];
    let mut loops = vec![];

    for first in 0..edges.len() {
        if used[first] {
            continue;
        }

        used[first] = true;
        let start = edges[first][0];
        let mut polyline = vec![start];
        let mut current = edges[first][1];

        while current != start {
            polyline.push(current);
            let next = outgoing
                .get(&current)?
                .iter()
                .copied()
                .find(|k| !used[*k])?;
            used[next] = true;
            current = edges[next][1];
        }

        if polyline.len() < 3 {
            return None;
        }

        loops.push(polyline);
    }

    Some(loops)
}

/// Closes the boundary `polyline` of `surface` with triangles tagged with `tag`.
///
/// The cap triangles traverse the polyline edges in the opposite direction, so they are
/// oriented consistently with the rest of the surface.
fn cap_loop(surface: &mut Surface, polyline: &[u32], normal: &UnitVector<Real>, tag: i32) {
    let (u, v) = plane_basis(normal);
    let origin = surface.vertices()[polyline[0] as usize];
    let projected: Vec<Point2<Real>> = polyline
        .iter()
        .map(|i| {
            let d = surface.vertices()[*i as usize] - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        })
        .collect();
    let n = polyline.len();

    let triangles = if signed_area2(&projected) > 0.0 {
        // The ears follow the polyline, flip them.
        triangulate_ear_clipping(&projected).map(|tris| {
            tris.into_iter()
                .map(|t| [t[0], t[2], t[1]].map(|k| polyline[k as usize]))
                .collect::<Vec<_>>()
        })
    } else {
        let reversed: Vec<_> = projected.iter().rev().copied().collect();
        triangulate_ear_clipping(&reversed).map(|tris| {
            tris.into_iter()
                .map(|t| t.map(|k| polyline[n - 1 - k as usize]))
                .collect()
        })
    };

    match triangles {
        Some(triangles) => {
            for idx in triangles {
                let _ = surface.push_triangle(idx, tag);
            }
        }
        None => {
            warn!(
                "ear clipping failed on a boundary loop of {} vertices, capping it with a fan",
                n
            );
            let centroid = polyline
                .iter()
                .map(|i| surface.vertices()[*i as usize].coords)
                .sum::<Vector<Real>>()
                / n as Real;
            let c = surface.push_vertex(Point::from(centroid));

            for k in 0..n {
                let a = polyline[k];
                let b = polyline[(k + 1) % n];
                let _ = surface.push_triangle([c, b, a], tag);
            }
        }
    }
}

/// Two unit vectors `u`, `v` such that `(u, v, normal)` is a right-handed orthonormal basis.
fn plane_basis(normal: &UnitVector<Real>) -> (Vector<Real>, Vector<Real>) {
    let helper = if normal.x.abs() < 0.9 {
        Vector::x()
    } else {
        Vector::y()
    };
    let u = normal.cross(&helper).normalize();
    let v = normal.cross(&u);
    (u, v)
}
