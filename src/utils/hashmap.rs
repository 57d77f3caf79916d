//! The hash-map used throughout this crate.
//!
//! Iteration order of these maps is never observable in generated files:
//! they are only used for lookups keyed by vertices and edges.

pub use hashbrown::hash_map::Entry;

/// Hashmap using [`hashbrown::HashMap`].
pub type HashMap<K, V> = hashbrown::hash_map::HashMap<K, V>;
