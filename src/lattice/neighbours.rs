use crate::math::Vector;

/// The number of lattice directions of the neighbour stencil.
pub const NUM_NEIGHBOURS: usize = 14;

/// The lattice offsets to the neighbours of a site.
///
/// Directions come in opposite pairs: the reverse of the direction `i` is `i ^ 1`. The order
/// matches the one expected by the solver reading the geometry file.
pub const NEIGHBOURS: [[i32; 3]; NUM_NEIGHBOURS] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    [1, 1, 1],
    [-1, -1, -1],
    [1, 1, -1],
    [-1, -1, 1],
    [1, -1, 1],
    [-1, 1, -1],
    [1, -1, -1],
    [-1, 1, 1],
];

/// One direction of each opposite pair.
///
/// None of these directions goes back along `x`, so a link never reaches a block of an
/// earlier `y`-`z` slab. It may still cross into a block written earlier in the sweep: from
/// the first `y` layer of block `(bx, by, bz)`, the direction `[1, -1, 1]` can reach block
/// `(bx, by - 1, bz + 1)`. What the classification of the link writes into such a
/// neighbour, its mirrored cut distance and its edge flag, never reaches the geometry file.
pub const LATER_NEIGHBOURS: [usize; NUM_NEIGHBOURS / 2] = [0, 2, 4, 6, 8, 10, 12];

/// The lattice offset of the direction `i`.
#[inline]
pub fn neighbour_offset(i: usize) -> Vector<i32> {
    Vector::from(NEIGHBOURS[i])
}

/// The direction opposite to `i`.
#[inline]
pub fn reverse_direction(i: usize) -> usize {
    i ^ 1
}
