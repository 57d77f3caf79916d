use crate::math::{Point, Real, UnitVector};
use crate::query::SplitResult;
use crate::shape::Surface;
use crate::utils::{hashmap::HashMap, SortedPair};

const ON_PLANE: u8 = 0;
const NEGATIVE: u8 = 1;
const POSITIVE: u8 = 2;
const CROSSING_EDGE: u8 = NEGATIVE + POSITIVE;

impl Surface {
    /// Splits this surface along the plane `axis · x = bias`.
    ///
    /// Vertices closer than `epsilon` to the plane are considered to lie on it. Triangles
    /// crossing the plane are subdivided, and every sub-triangle keeps the iolet tag of the
    /// triangle it was cut from. Triangles lying entirely on the plane belong to neither side
    /// and are dropped, so that an existing face coplanar with the cut does not close the
    /// opening created by the split.
    pub fn local_split(
        &self,
        axis: &UnitVector<Real>,
        bias: Real,
        epsilon: Real,
    ) -> SplitResult<Surface> {
        // 1. Partition the vertices.
        let vertices = self.vertices();
        let mut colors = vec![ON_PLANE; vertices.len()];
        let mut found_negative = false;
        let mut found_positive = false;

        for (i, pt) in vertices.iter().enumerate() {
            let dist_to_plane = pt.coords.dot(axis) - bias;
            if dist_to_plane < -epsilon {
                found_negative = true;
                colors[i] = NEGATIVE;
            } else if dist_to_plane > epsilon {
                found_positive = true;
                colors[i] = POSITIVE;
            }
        }

        let has_coplanar_triangle = self
            .indices()
            .iter()
            .any(|idx| idx.iter().all(|i| colors[*i as usize] == ON_PLANE));

        // Exit early if `self` isn’t crossed by the plane.
        if !has_coplanar_triangle {
            if !found_negative {
                return SplitResult::Positive;
            }

            if !found_positive {
                return SplitResult::Negative;
            }
        }

        // 2. Split the triangles.
        let mut intersections_found = HashMap::default();
        let mut new_indices = self.indices().to_vec();
        let mut new_iolet_ids = self.iolet_ids().to_vec();
        let mut new_vertices = vertices.to_vec();
        let mut k = 0;

        while k != new_indices.len() {
            let mut ic = 0;
            while ic < 3 {
                let idx = new_indices[k];
                let ia = (ic + 1) % 3;
                let ib = (ic + 2) % 3;
                let idx_a = idx[ia];
                let idx_b = idx[ib];
                let idx_c = idx[ic];

                if colors[idx_a as usize] + colors[idx_b as usize] == CROSSING_EDGE {
                    let edge = SortedPair::new(idx_a, idx_b);
                    let intersection_idx = *intersections_found.entry(edge).or_insert_with(|| {
                        // Always interpolate from the lowest index so the shared vertex does
                        // not depend on which triangle reached the edge first.
                        let a = new_vertices[edge.first() as usize];
                        let b = new_vertices[edge.second() as usize];
                        new_vertices.push(segment_plane_intersection(&a, &b, axis, bias));
                        colors.push(ON_PLANE);
                        (new_vertices.len() - 1) as u32
                    });

                    // `idx_c` now lies opposite to the intersection, so any other crossing
                    // of `new_indices[k]` can only involve `ic == 2`.
                    new_indices[k] = [idx_c, idx_a, intersection_idx];
                    new_indices.push([idx_b, idx_c, intersection_idx]);
                    new_iolet_ids.push(new_iolet_ids[k]);
                    ic = 2;
                    continue;
                }

                ic += 1;
            }

            k += 1;
        }

        // 3. Partition the new triangles into two surfaces.
        let mut vertices_lhs = vec![];
        let mut vertices_rhs = vec![];
        let mut remap = Vec::with_capacity(new_vertices.len());

        for (pt, color) in new_vertices.iter().zip(colors.iter()) {
            match *color {
                ON_PLANE => {
                    remap.push((vertices_lhs.len() as u32, vertices_rhs.len() as u32));
                    vertices_lhs.push(*pt);
                    vertices_rhs.push(*pt);
                }
                NEGATIVE => {
                    remap.push((vertices_lhs.len() as u32, u32::MAX));
                    vertices_lhs.push(*pt);
                }
                _ => {
                    remap.push((u32::MAX, vertices_rhs.len() as u32));
                    vertices_rhs.push(*pt);
                }
            }
        }

        let mut indices_lhs = vec![];
        let mut indices_rhs = vec![];
        let mut tags_lhs = vec![];
        let mut tags_rhs = vec![];

        for (idx, tag) in new_indices.iter().zip(new_iolet_ids.iter()) {
            let idx = idx.map(|i| i as usize);
            let tri_colors = idx.map(|i| colors[i]);
            let tri_remap = idx.map(|i| remap[i]);

            if tri_colors.contains(&NEGATIVE) {
                debug_assert!(!tri_colors.contains(&POSITIVE));
                indices_lhs.push(tri_remap.map(|r| r.0));
                tags_lhs.push(*tag);
            } else if tri_colors.contains(&POSITIVE) {
                debug_assert!(!tri_colors.contains(&NEGATIVE));
                indices_rhs.push(tri_remap.map(|r| r.1));
                tags_rhs.push(*tag);
            }
        }

        let lhs = Surface::from_parts(vertices_lhs, indices_lhs, tags_lhs).without_unused_vertices();
        let rhs = Surface::from_parts(vertices_rhs, indices_rhs, tags_rhs).without_unused_vertices();
        SplitResult::Pair(lhs, rhs)
    }
}

fn segment_plane_intersection(
    a: &Point<Real>,
    b: &Point<Real>,
    axis: &UnitVector<Real>,
    bias: Real,
) -> Point<Real> {
    let da = a.coords.dot(axis) - bias;
    let db = b.coords.dot(axis) - bias;
    let t = da / (da - db);
    a + (b - a) * t
}
