//! The block-structured lattice of sites covering the surface.

pub use self::block::Block;
pub use self::domain::{BlockSweep, Domain, SiteIndices, MAX_BLOCK_SIZE};
pub use self::neighbours::{
    neighbour_offset, reverse_direction, LATER_NEIGHBOURS, NEIGHBOURS, NUM_NEIGHBOURS,
};
pub use self::site::Site;
pub use self::site_config::{
    SiteConfig, SiteType, BOUNDARY_CONFIG_BITS, BOUNDARY_CONFIG_MASK, BOUNDARY_CONFIG_SHIFT,
    BOUNDARY_DIR_BITS, BOUNDARY_DIR_MASK, BOUNDARY_DIR_SHIFT, BOUNDARY_ID_BITS,
    BOUNDARY_ID_MASK, BOUNDARY_ID_SHIFT, MAX_BOUNDARY_ID, PRESSURE_EDGE_MASK, SITE_TYPE_BITS,
    SITE_TYPE_MASK,
};

mod block;
mod domain;
mod neighbours;
mod site;
mod site_config;
