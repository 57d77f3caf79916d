use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::Triangle;
use crate::utils::hashmap::{Entry, HashMap};
use crate::utils::{HashablePoint, SortedPair};
use hashbrown::HashSet;
use std::fmt;

/// The iolet tag of a surface triangle that belongs to the vessel wall.
pub const WALL_IOLET_ID: i32 = -1;

/// Error indicating that a surface cannot be built from the given buffers.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    /// A surface must contain at least one triangle.
    #[error("a surface must contain at least one triangle.")]
    EmptyIndices,
    /// A triangle refers to a vertex that does not exist.
    #[error("the triangle {triangle} refers to the vertex {vertex} but there are only {num_vertices} vertices.")]
    IndexOutOfBounds {
        /// The faulty triangle.
        triangle: u32,
        /// The out-of-bounds vertex index.
        vertex: u32,
        /// The length of the vertex buffer.
        num_vertices: u32,
    },
    /// The iolet tag buffer does not have one entry per triangle.
    #[error("found {num_tags} iolet tags for {num_triangles} triangles.")]
    MismatchedIoletIds {
        /// The number of triangles.
        num_triangles: u32,
        /// The number of iolet tags.
        num_tags: u32,
    },
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
/// Controls the clean-up applied by [`Surface::set_flags`].
pub struct SurfaceFlags(u8);

bitflags::bitflags! {
    impl SurfaceFlags: u8 {
        /// If set, the duplicate vertices of the surface will be merged.
        ///
        /// Two vertices with the exact same coordinates will share the same entry on the
        /// vertex buffer and the index buffer is adjusted accordingly.
        const MERGE_DUPLICATE_VERTICES = 1;
        /// If set, the triangles with two identical vertex indices, or with a zero area, will be
        /// removed.
        const DELETE_DEGENERATE_TRIANGLES = 1 << 1;
        /// If set, two triangles sharing three vertices with identical index values (in any order)
        /// will be deduplicated. The first one is kept.
        const DELETE_DUPLICATE_TRIANGLES = 1 << 2;
        /// If set, the triangle winding is reversed when the enclosed signed volume is negative,
        /// so that the cell normals point outward.
        const ORIENT_OUTWARD = 1 << 3;
        /// Every clean-up step, in the order they are listed above.
        const CLEAN = Self::MERGE_DUPLICATE_VERTICES.bits()
            | Self::DELETE_DEGENERATE_TRIANGLES.bits()
            | Self::DELETE_DUPLICATE_TRIANGLES.bits()
            | Self::ORIENT_OUTWARD.bits();
    }
}

#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
/// A triangulated surface where each triangle carries an iolet tag.
///
/// A tag of [`WALL_IOLET_ID`] marks a triangle of the vessel wall. A tag `i >= 0` marks a
/// triangle of the cap closing the `i`-th iolet of the iolet list. Flat per-triangle normals
/// are computed on construction.
pub struct Surface {
    vertices: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
    iolet_ids: Vec<i32>,
    normals: Vec<Vector<Real>>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Surface({} vertices, {} triangles)",
            self.vertices.len(),
            self.indices.len()
        )
    }
}

/// The pseudo-normals of the vertices and edges of an oriented surface.
///
/// See "Signed distance computation using the angle weighted pseudonormal", Baerentzen, et al.
/// DOI: 10.1109/TVCG.2005.49
#[derive(Clone, Debug)]
pub struct SurfacePseudoNormals {
    /// The angle-weighted pseudo-normal of each vertex.
    pub vertices_pseudo_normal: Vec<Vector<Real>>,
    /// The pseudo-normals of the edges AB, BC, CA of each triangle.
    pub edges_pseudo_normal: Vec<[Vector<Real>; 3]>,
}

impl Surface {
    /// Creates a surface where every triangle is tagged as wall.
    pub fn new(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Result<Self, SurfaceError> {
        let iolet_ids = vec![WALL_IOLET_ID; indices.len()];
        Self::with_iolet_ids(vertices, indices, iolet_ids)
    }

    /// Creates a surface with one iolet tag per triangle.
    pub fn with_iolet_ids(
        vertices: Vec<Point<Real>>,
        indices: Vec<[u32; 3]>,
        iolet_ids: Vec<i32>,
    ) -> Result<Self, SurfaceError> {
        if indices.is_empty() {
            return Err(SurfaceError::EmptyIndices);
        }

        if indices.len() != iolet_ids.len() {
            return Err(SurfaceError::MismatchedIoletIds {
                num_triangles: indices.len() as u32,
                num_tags: iolet_ids.len() as u32,
            });
        }

        for (i, idx) in indices.iter().enumerate() {
            if let Some(vertex) = idx.iter().find(|v| **v as usize >= vertices.len()) {
                return Err(SurfaceError::IndexOutOfBounds {
                    triangle: i as u32,
                    vertex: *vertex,
                    num_vertices: vertices.len() as u32,
                });
            }
        }

        Ok(Self::from_parts(vertices, indices, iolet_ids))
    }

    /// Builds a surface from buffers already known to be consistent. It may be empty.
    pub(crate) fn from_parts(
        vertices: Vec<Point<Real>>,
        indices: Vec<[u32; 3]>,
        iolet_ids: Vec<i32>,
    ) -> Self {
        debug_assert_eq!(indices.len(), iolet_ids.len());
        let mut result = Self {
            vertices,
            indices,
            iolet_ids,
            normals: vec![],
        };
        result.compute_normals();
        result
    }

    /// Applies the clean-up steps selected by `flags`.
    ///
    /// Returns an error if no triangle survives the clean-up.
    pub fn set_flags(&mut self, flags: SurfaceFlags) -> Result<(), SurfaceError> {
        if flags.intersects(
            SurfaceFlags::MERGE_DUPLICATE_VERTICES
                | SurfaceFlags::DELETE_DEGENERATE_TRIANGLES
                | SurfaceFlags::DELETE_DUPLICATE_TRIANGLES,
        ) {
            self.merge_duplicate_vertices(
                flags.contains(SurfaceFlags::DELETE_DEGENERATE_TRIANGLES),
                flags.contains(SurfaceFlags::DELETE_DUPLICATE_TRIANGLES),
            );
        }

        if self.indices.is_empty() {
            return Err(SurfaceError::EmptyIndices);
        }

        if flags.contains(SurfaceFlags::ORIENT_OUTWARD) && self.signed_volume() < 0.0 {
            self.reverse();
        }

        Ok(())
    }

    /// The vertex buffer of this surface.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The index buffer of this surface.
    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// The iolet tag of each triangle.
    #[inline]
    pub fn iolet_ids(&self) -> &[i32] {
        &self.iolet_ids
    }

    /// The iolet tag of the `i`-th triangle.
    #[inline]
    pub fn iolet_id(&self, i: u32) -> i32 {
        self.iolet_ids[i as usize]
    }

    /// The flat normal of each triangle. Degenerate triangles have a zero normal.
    #[inline]
    pub fn cell_normals(&self) -> &[Vector<Real>] {
        &self.normals
    }

    /// The flat normal of the `i`-th triangle.
    #[inline]
    pub fn cell_normal(&self, i: u32) -> Vector<Real> {
        self.normals[i as usize]
    }

    /// The number of triangles of this surface.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Does this surface have no triangle?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Gets the `i`-th triangle of this surface.
    #[inline]
    pub fn triangle(&self, i: u32) -> Triangle {
        let idx = self.indices[i as usize];
        Triangle::new(
            self.vertices[idx[0] as usize],
            self.vertices[idx[1] as usize],
            self.vertices[idx[2] as usize],
        )
    }

    /// An iterator through all the triangles of this surface.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        (0..self.indices.len() as u32).map(move |i| self.triangle(i))
    }

    /// The bounds of the vertices referenced by this surface.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(
            self.indices
                .iter()
                .flat_map(|idx| idx.iter().map(|i| self.vertices[*i as usize])),
        )
    }

    /// The total area of this surface.
    pub fn area(&self) -> Real {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// The volume enclosed by this surface, positive iff the cell normals point outward.
    ///
    /// Only meaningful for closed surfaces.
    pub fn signed_volume(&self) -> Real {
        self.triangles()
            .map(|tri| tri.a.coords.dot(&tri.b.coords.cross(&tri.c.coords)))
            .sum::<Real>()
            / 6.0
    }

    /// Reverses the winding of every triangle, flipping the cell normals.
    pub fn reverse(&mut self) {
        for idx in &mut self.indices {
            idx.swap(1, 2);
        }

        for n in &mut self.normals {
            *n = -*n;
        }
    }

    /// Appends the triangles of `other` to this surface.
    ///
    /// The vertex buffer of `other` is appended as-is: shared positions are only merged by a
    /// subsequent [`SurfaceFlags::MERGE_DUPLICATE_VERTICES`] clean-up.
    pub fn append(&mut self, other: &Surface) {
        let base_id = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|idx| [idx[0] + base_id, idx[1] + base_id, idx[2] + base_id]),
        );
        self.iolet_ids.extend_from_slice(&other.iolet_ids);
        self.normals.extend_from_slice(&other.normals);
    }

    /// Adds one triangle, and returns its index.
    pub(crate) fn push_triangle(&mut self, idx: [u32; 3], iolet_id: i32) -> u32 {
        self.indices.push(idx);
        self.iolet_ids.push(iolet_id);
        let id = self.indices.len() as u32 - 1;
        let normal = self.triangle(id).normal().map(|n| *n);
        self.normals.push(normal.unwrap_or_else(Vector::zeros));
        id
    }

    /// Adds one vertex, and returns its index.
    pub(crate) fn push_vertex(&mut self, pt: Point<Real>) -> u32 {
        self.vertices.push(pt);
        self.vertices.len() as u32 - 1
    }

    /// A new surface made of the given triangles of `self`, in the given order.
    ///
    /// Only the vertices referenced by these triangles are kept.
    pub fn extract_triangles(&self, triangles: &[u32]) -> Surface {
        let indices = triangles.iter().map(|i| self.indices[*i as usize]).collect();
        let iolet_ids = triangles.iter().map(|i| self.iolet_ids[*i as usize]).collect();
        Surface::from_parts(self.vertices.clone(), indices, iolet_ids).without_unused_vertices()
    }

    /// A copy of this surface without the vertices no triangle refers to.
    pub(crate) fn without_unused_vertices(mut self) -> Self {
        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut new_vertices = Vec::with_capacity(self.vertices.len());

        for idx in &mut self.indices {
            for i in idx.iter_mut() {
                if remap[*i as usize] == u32::MAX {
                    remap[*i as usize] = new_vertices.len() as u32;
                    new_vertices.push(self.vertices[*i as usize]);
                }
                *i = remap[*i as usize];
            }
        }

        self.vertices = new_vertices;
        self
    }

    fn compute_normals(&mut self) {
        self.normals = self
            .triangles()
            .map(|tri| tri.normal().map(|n| *n).unwrap_or_else(Vector::zeros))
            .collect();
    }

    /// Merge all duplicate vertices and adjust the index buffer accordingly.
    ///
    /// If `delete_degenerate_triangles` is set to true, any triangle with two identical
    /// vertices, or with a zero area, will be removed. If `delete_duplicate_triangles` is set,
    /// only the first of several triangles with the same three vertices is kept.
    fn merge_duplicate_vertices(
        &mut self,
        delete_degenerate_triangles: bool,
        delete_duplicate_triangles: bool,
    ) {
        let mut vtx_to_id = HashMap::default();
        let mut new_vertices = Vec::with_capacity(self.vertices.len());
        let mut new_indices = Vec::with_capacity(self.indices.len());
        let mut new_iolet_ids = Vec::with_capacity(self.indices.len());
        let mut triangle_set = HashSet::new();

        fn resolve_coord_id(
            coord: &Point<Real>,
            vtx_to_id: &mut HashMap<HashablePoint, u32>,
            new_vertices: &mut Vec<Point<Real>>,
        ) -> u32 {
            match vtx_to_id.entry(HashablePoint(*coord)) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    new_vertices.push(*coord);
                    *entry.insert(new_vertices.len() as u32 - 1)
                }
            }
        }

        for (t, tag) in self.indices.iter().zip(self.iolet_ids.iter()) {
            let idx = t.map(|i| {
                resolve_coord_id(
                    &self.vertices[i as usize],
                    &mut vtx_to_id,
                    &mut new_vertices,
                )
            });

            if delete_degenerate_triangles {
                let tri = Triangle::new(
                    new_vertices[idx[0] as usize],
                    new_vertices[idx[1] as usize],
                    new_vertices[idx[2] as usize],
                );
                if idx[0] == idx[1]
                    || idx[0] == idx[2]
                    || idx[1] == idx[2]
                    || tri.scaled_normal() == Vector::zeros()
                {
                    continue;
                }
            }

            if delete_duplicate_triangles {
                let mut key = idx;
                key.sort_unstable();
                if !triangle_set.insert(key) {
                    continue;
                }
            }

            new_indices.push(idx);
            new_iolet_ids.push(*tag);
        }

        new_vertices.shrink_to_fit();

        self.vertices = new_vertices;
        self.indices = new_indices;
        self.iolet_ids = new_iolet_ids;
        // Vertices and indices changed: the vertices of deleted triangles are no longer needed.
        let cleaned = std::mem::take(self).without_unused_vertices();
        *self = cleaned;
        self.compute_normals();
    }

    /// Groups the triangles of this surface by connected component.
    ///
    /// Two triangles are connected if they share a vertex index. Components are listed in the
    /// order of their first triangle, and triangles keep their relative order.
    pub fn connected_components(&self) -> Vec<Vec<u32>> {
        use ena::unify::{InPlaceUnificationTable, UnifyKey};

        #[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
        struct IntKey(u32);

        impl UnifyKey for IntKey {
            type Value = ();
            fn index(&self) -> u32 {
                self.0
            }
            fn from_index(u: u32) -> IntKey {
                IntKey(u)
            }
            fn tag() -> &'static str {
                "IntKey"
            }
        }

        let mut ufind: InPlaceUnificationTable<IntKey> = InPlaceUnificationTable::new();
        let keys: Vec<_> = (0..self.vertices.len()).map(|_| ufind.new_key(())).collect();

        for idx in &self.indices {
            let k = idx.map(|i| keys[i as usize]);
            ufind.union(k[0], k[1]);
            ufind.union(k[1], k[2]);
        }

        let mut root_to_component = HashMap::default();
        let mut components: Vec<Vec<u32>> = vec![];

        for (i, idx) in self.indices.iter().enumerate() {
            let root = ufind.find(keys[idx[0] as usize]);
            let component = *root_to_component.entry(root).or_insert_with(|| {
                components.push(vec![]);
                components.len() - 1
            });
            components[component].push(i as u32);
        }

        components
    }

    /// The half-edges of this surface without an opposite half-edge, in triangle order.
    ///
    /// On a closed oriented surface, this is empty. Each returned pair `[a, b]` is a half-edge
    /// going from vertex `a` to vertex `b` following the winding of its triangle.
    pub fn boundary_half_edges(&self) -> Vec<[u32; 2]> {
        let mut edge_count: HashMap<SortedPair<u32>, u32> = HashMap::default();

        for idx in &self.indices {
            for k in 0..3 {
                *edge_count
                    .entry(SortedPair::new(idx[k], idx[(k + 1) % 3]))
                    .or_insert(0) += 1;
            }
        }

        self.indices
            .iter()
            .flat_map(|idx| (0..3).map(move |k| [idx[k], idx[(k + 1) % 3]]))
            .filter(|e| edge_count.get(&SortedPair::new(e[0], e[1])) == Some(&1))
            .collect()
    }

    /// Computes the pseudo-normals used for the point containment test.
    ///
    /// For the test to properly detect the inside of the surface, it must be closed, manifold
    /// and oriented with outward normals, and its duplicate vertices must be merged.
    pub fn pseudo_normals(&self) -> SurfacePseudoNormals {
        let mut vertices_pseudo_normal = vec![Vector::zeros(); self.vertices.len()];
        let mut edges_pseudo_normal = HashMap::default();

        for (i, idx) in self.indices.iter().enumerate() {
            let tri = self.triangle(i as u32);

            if let Some(n) = tri.normal() {
                let angles = tri.angles();

                for k in 0..3 {
                    vertices_pseudo_normal[idx[k] as usize] += *n * angles[k];
                    // The incident angle of an edge is always PI, no weighting needed.
                    *edges_pseudo_normal
                        .entry(SortedPair::new(idx[k], idx[(k + 1) % 3]))
                        .or_insert_with(Vector::zeros) += *n;
                }
            }
        }

        let edges_pseudo_normal = self
            .indices
            .iter()
            .map(|idx| {
                [0, 1, 2].map(|k| {
                    edges_pseudo_normal
                        .get(&SortedPair::new(idx[k], idx[(k + 1) % 3]))
                        .copied()
                        .unwrap_or_else(Vector::zeros)
                })
            })
            .collect();

        SurfacePseudoNormals {
            vertices_pseudo_normal,
            edges_pseudo_normal,
        }
    }
}

impl Default for Surface {
    /// An empty surface.
    fn default() -> Self {
        Self::from_parts(vec![], vec![], vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A unit cube with outward normals, each face split into two triangles.
    pub(crate) fn cube() -> Surface {
        let vertices = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(0.0, 1.0, 1.0),
        ];
        let indices = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ];
        Surface::new(vertices, indices).unwrap()
    }

    #[test]
    fn invalid_buffers_are_rejected() {
        assert_eq!(
            Surface::new(vec![Point::origin()], vec![]).unwrap_err(),
            SurfaceError::EmptyIndices
        );
        assert_eq!(
            Surface::new(vec![Point::origin()], vec![[0, 0, 1]]).unwrap_err(),
            SurfaceError::IndexOutOfBounds {
                triangle: 0,
                vertex: 1,
                num_vertices: 1
            }
        );
        assert!(matches!(
            Surface::with_iolet_ids(vec![Point::origin(); 3], vec![[0, 1, 2]], vec![]),
            Err(SurfaceError::MismatchedIoletIds { .. })
        ));
    }

    #[test]
    fn cube_volume_and_orientation() {
        let mut cube = cube();
        assert_relative_eq!(cube.signed_volume(), 1.0);
        assert!(cube.boundary_half_edges().is_empty());

        cube.reverse();
        assert_relative_eq!(cube.signed_volume(), -1.0);
        cube.set_flags(SurfaceFlags::ORIENT_OUTWARD).unwrap();
        assert_relative_eq!(cube.signed_volume(), 1.0);
        assert_relative_eq!(cube.cell_normal(0), -Vector::z());
    }

    #[test]
    fn clean_merges_duplicates_and_keeps_tags() {
        let cube = cube();
        // Triangle soup: every triangle gets its own three vertices.
        let mut vertices = vec![];
        let mut indices = vec![];
        for tri in cube.triangles() {
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&tri.vertices());
            indices.push([base, base + 1, base + 2]);
        }
        // One duplicate triangle and one degenerate triangle.
        indices.push(indices[0]);
        indices.push([0, 0, 1]);
        let mut tags = vec![WALL_IOLET_ID; indices.len()];
        tags[2] = 3;

        let mut soup = Surface::with_iolet_ids(vertices, indices, tags).unwrap();
        assert!(!soup.boundary_half_edges().is_empty());
        soup.set_flags(SurfaceFlags::CLEAN).unwrap();

        assert_eq!(soup.vertices().len(), 8);
        assert_eq!(soup.num_triangles(), 12);
        assert_eq!(soup.iolet_ids()[2], 3);
        assert!(soup.boundary_half_edges().is_empty());
        assert_eq!(soup.connected_components().len(), 1);
    }

    #[test]
    fn components_of_two_cubes() {
        let mut two = cube();
        let mut other = cube();
        other.vertices.iter_mut().for_each(|pt| pt.x += 3.0);
        two.append(&other);

        let components = two.connected_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], (0..12u32).collect::<Vec<_>>());
        assert_eq!(components[1], (12..24u32).collect::<Vec<_>>());

        let second = two.extract_triangles(&components[1]);
        assert_eq!(second.vertices().len(), 8);
        assert_relative_eq!(second.aabb().mins, Point::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn open_box_boundary() {
        let cube = cube();
        // Remove the top face.
        let open = cube.extract_triangles(&[0, 1, 4, 5, 6, 7, 8, 9, 10, 11]);
        let boundary = open.boundary_half_edges();
        assert_eq!(boundary.len(), 4);
        for [a, b] in boundary {
            assert_relative_eq!(open.vertices()[a as usize].z, 1.0);
            assert_relative_eq!(open.vertices()[b as usize].z, 1.0);
        }
    }
}
