//! Classification of the lattice sites and generation of the binary geometry file.

pub use self::classifier::SiteClassifier;
pub use self::error::{ConfigurationError, GenerationError};
pub use self::generator::{write_geometry, GenerationSummary, GeometryGenerator};
pub use self::parameters::GeneratorParameters;
pub use self::reader::{GeometryReader, SiteRecord, SurfaceCrossing};
pub use self::spatial_index::{PointLocation, SegmentHit, SpatialIndex};
pub use self::writer::{
    BlockHeader, BlockWriter, GeometryWriter, BLOCK_HEADER_SIZE, MAX_SITE_RECORD_SIZE,
    PREAMBLE_SIZE,
};

mod classifier;
mod error;
mod generator;
mod parameters;
mod reader;
mod spatial_index;
mod writer;
