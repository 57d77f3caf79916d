//! Shapes consumed by the voxeliser.

pub use self::iolet::{assign_iolet_indices, Iolet, IoletKind};
pub use self::surface::{
    Surface, SurfaceError, SurfaceFlags, SurfacePseudoNormals, WALL_IOLET_ID,
};
pub use self::triangle::Triangle;

mod iolet;
mod surface;
mod triangle;
