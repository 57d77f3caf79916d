use crate::math::Real;
use crate::shape::{IoletKind, SurfaceError};
use std::io;
use std::path::PathBuf;

/// An input that cannot produce a valid geometry.
///
/// These errors are detected before any output is written.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The voxel size must be finite and positive.
    #[error("the voxel size must be finite and positive, found {0}.")]
    InvalidVoxelSize(Real),
    /// Blocks must contain at least one site, and their records must fit the `u32` byte
    /// length of a header entry.
    #[error("the block size must lie between 1 and {}.", crate::lattice::MAX_BLOCK_SIZE)]
    InvalidBlockSize,
    /// The probe offset must be finite and smaller than half a voxel.
    #[error("the probe offset must be finite and smaller than half a voxel on each axis.")]
    InvalidProbeOffset,
    /// An iolet normal cannot be normalized.
    #[error("the normal of the iolet {iolet} is zero.")]
    DegenerateIoletNormal {
        /// Position of the iolet in the iolet list.
        iolet: usize,
    },
    /// The seed point does not lie strictly on one side of an iolet plane.
    #[error("the seed point lies on the plane of the iolet {iolet}.")]
    SeedOnIoletPlane {
        /// Position of the iolet in the iolet list.
        iolet: usize,
    },
    /// Clipping the surface at an iolet plane left nothing on the side of the seed point.
    #[error("clipping the surface at the iolet {iolet} left no triangle on the side of the seed point.")]
    EmptyClip {
        /// Position of the iolet in the iolet list.
        iolet: usize,
    },
    /// The opening created by clipping at an iolet plane is not a closed loop.
    #[error("the opening created by the iolet {iolet} is not a closed loop.")]
    UnclosedBoundaryLoop {
        /// Position of the iolet in the iolet list.
        iolet: usize,
    },
    /// The boundary id of an iolet does not fit in a site configuration word.
    #[error("found {count} iolets of kind {kind:?} but at most {max} are supported.")]
    TooManyIolets {
        /// The kind of iolet.
        kind: IoletKind,
        /// The number of iolets of this kind.
        count: usize,
        /// The maximum number of iolets of a kind.
        max: usize,
    },
    /// A surface triangle is tagged with an iolet index out of the iolet list.
    #[error("a triangle is tagged with the iolet {tag} but only {num_iolets} iolets are given.")]
    UnknownIoletTag {
        /// The offending tag.
        tag: i32,
        /// The number of iolets.
        num_iolets: usize,
    },
    /// The clipped surface is empty after clean-up.
    #[error("the clipped surface is empty: {0}")]
    EmptySurface(#[from] SurfaceError),
}

/// Errors raised while generating a geometry file.
#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    /// The inputs cannot produce a valid geometry.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The input surface is malformed.
    #[error("invalid surface: {0}")]
    Surface(#[from] SurfaceError),
    /// The rewritten block headers do not fill the region reserved for them.
    ///
    /// This indicates an internal bug: some blocks were not written.
    #[error("the block headers take {actual} bytes but {expected} bytes were reserved.")]
    GeometryInconsistency {
        /// The size of the reserved header region.
        expected: u64,
        /// The size of the header buffer.
        actual: u64,
    },
    /// The record of a block does not fit the `u32` byte length of its header entry.
    #[error("the record of the block {block} takes {length} bytes.")]
    BlockTooLarge {
        /// The position of the block in file order.
        block: usize,
        /// The size of the block record.
        length: u64,
    },
    /// Reading or writing the geometry file failed.
    #[error("I/O failure on {} at byte offset {offset}: {source}", .path.display())]
    Io {
        /// The path of the file, or `<stream>` for in-memory sinks.
        path: PathBuf,
        /// The byte offset where the operation was attempted.
        offset: u64,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}
