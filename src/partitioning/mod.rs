//! Spatial partitioning tools.

pub use self::bvh::{Bvh, BvhNode, Leaves};

mod bvh;
