use crate::generation::ConfigurationError;
use crate::lattice::{MAX_BLOCK_SIZE, MAX_BOUNDARY_ID};
use crate::math::{Point, Real, Vector};
use crate::shape::{Iolet, IoletKind};

/// The parameters of a geometry generation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct GeneratorParameters {
    /// The distance between two adjacent lattice sites.
    pub voxel_size: Real,
    /// The number of sites along each edge of a block.
    pub block_size: u32,
    /// An opaque tag forwarded to the file preamble.
    pub stress_type: i32,
    /// A point of the fluid region, used to pick the side of each iolet plane to keep.
    pub seed_point: Point<Real>,
    /// Vertices closer than this distance to an iolet plane are considered to lie on it.
    pub clip_epsilon: Real,
    /// The translation applied to the lattice sites before each surface query, in voxels.
    ///
    /// It moves the queries off the lattice planes, which typically contain caps and other
    /// axis-aligned features of the surface. Distances are measured from the translated
    /// points.
    pub probe_offset: Vector<Real>,
}

impl Default for GeneratorParameters {
    fn default() -> Self {
        Self {
            voxel_size: 1.0,
            block_size: 8,
            stress_type: 1,
            seed_point: Point::origin(),
            clip_epsilon: 1.0e-9,
            probe_offset: Vector::new(1.3e-6, 2.9e-6, 4.1e-6),
        }
    }
}

impl GeneratorParameters {
    /// Checks that these parameters can produce a lattice.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
            return Err(ConfigurationError::InvalidVoxelSize(self.voxel_size));
        }

        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigurationError::InvalidBlockSize);
        }

        if !self.probe_offset.iter().all(|x| x.is_finite() && x.abs() < 0.5) {
            return Err(ConfigurationError::InvalidProbeOffset);
        }

        Ok(())
    }
}

/// Checks that the iolet normals can be normalized and that their boundary ids fit in a
/// configuration word.
pub(crate) fn check_iolets(iolets: &[Iolet]) -> Result<(), ConfigurationError> {
    if let Some(iolet) = iolets.iter().position(|io| io.unit_normal().is_none()) {
        return Err(ConfigurationError::DegenerateIoletNormal { iolet });
    }

    for kind in [IoletKind::Inlet, IoletKind::Outlet] {
        let of_kind = iolets.iter().filter(|io| io.kind == kind);
        let count = of_kind
            .clone()
            .map(|io| io.index as usize + 1)
            .max()
            .unwrap_or(0)
            .max(of_kind.count());

        if count > MAX_BOUNDARY_ID as usize + 1 {
            return Err(ConfigurationError::TooManyIolets {
                kind,
                count,
                max: MAX_BOUNDARY_ID as usize + 1,
            });
        }
    }

    Ok(())
}
