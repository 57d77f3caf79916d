use crate::math::{Point, Real};
use std::hash::{Hash, Hasher};

/// A point that can be used as a hash-map key.
///
/// Two points are equal iff their coordinates are bitwise equal, i.e. merging
/// with this key is a zero-tolerance deduplication. `-0.0` and `0.0` are
/// normalized to the same key.
#[derive(Copy, Clone, Debug)]
pub struct HashablePoint(pub Point<Real>);

impl HashablePoint {
    fn key(&self) -> [u64; 3] {
        let bits = |x: Real| if x == 0.0 { 0 } else { x.to_bits() };
        [bits(self.0.x), bits(self.0.y), bits(self.0.z)]
    }
}

impl PartialEq for HashablePoint {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HashablePoint {}

impl Hash for HashablePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}
