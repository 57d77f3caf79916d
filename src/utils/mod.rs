//! Various unsorted geometrical and logical operators.

pub use self::hashable_point::HashablePoint;
pub use self::hashmap::{Entry, HashMap};
pub use self::sorted_pair::SortedPair;

mod hashable_point;
pub mod hashmap;
mod sorted_pair;
