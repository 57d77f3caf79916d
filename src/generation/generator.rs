use crate::generation::parameters::check_iolets;
use crate::generation::{
    ConfigurationError, GenerationError, GeneratorParameters, GeometryWriter, SiteClassifier,
    SpatialIndex,
};
use crate::lattice::{BlockSweep, Domain};
use crate::math::{Real, Vector};
use crate::shape::{assign_iolet_indices, Iolet, Surface};
use crate::transformation::SurfaceClipper;
use std::io::{Seek, Write};
use std::path::Path;

/// Statistics of a written geometry file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct GenerationSummary {
    /// The number of blocks of the domain.
    pub total_blocks: usize,
    /// The number of blocks with at least one fluid site.
    pub non_empty_blocks: usize,
    /// The number of fluid sites.
    pub fluid_sites: u64,
    /// The size of the block records, in bytes.
    pub body_bytes: u64,
}

/// Turns a raw vessel surface and its iolets into geometry files.
///
/// The surface is clipped and capped once, on construction. Each call to
/// [`GeometryGenerator::write_to`] or [`GeometryGenerator::write_file`] then sweeps a fresh
/// copy of the lattice, so repeated calls produce identical files.
#[derive(Clone, Debug)]
pub struct GeometryGenerator {
    surface: Surface,
    iolets: Vec<Iolet>,
    parameters: GeneratorParameters,
    domain: Domain,
}

impl GeometryGenerator {
    /// Validates the inputs, clips `surface` at the iolet planes, and lays the lattice over
    /// the result.
    ///
    /// The iolets are renumbered per kind, in list order.
    pub fn new(
        surface: &Surface,
        iolets: &[Iolet],
        parameters: GeneratorParameters,
    ) -> Result<Self, ConfigurationError> {
        parameters.validate()?;

        let mut iolets = iolets.to_vec();
        assign_iolet_indices(&mut iolets);
        check_iolets(&iolets)?;

        let clipper = SurfaceClipper {
            seed_point: parameters.seed_point,
            epsilon: parameters.clip_epsilon,
        };
        let surface = clipper.clip(surface, &iolets)?;
        let domain = Domain::new(parameters.voxel_size, &surface.aabb(), parameters.block_size)?;

        log::info!(
            "Lattice origin: {}, blocks: {:?}, sites: {:?}.",
            domain.origin(),
            domain.block_counts(),
            domain.site_counts()
        );

        Ok(Self {
            surface,
            iolets,
            parameters,
            domain,
        })
    }

    /// The clipped and capped surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The iolets, with their indices assigned.
    pub fn iolets(&self) -> &[Iolet] {
        &self.iolets
    }

    /// The generation parameters.
    pub fn parameters(&self) -> &GeneratorParameters {
        &self.parameters
    }

    /// The lattice, before any block is created.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Writes the geometry to `sink`, from its current position, and returns it.
    pub fn write_to<W: Write + Seek>(
        &self,
        sink: W,
    ) -> Result<(W, GenerationSummary), GenerationError> {
        let writer = GeometryWriter::new(
            sink,
            self.parameters.stress_type,
            self.domain.block_size(),
            self.domain.block_counts(),
        )?;
        self.generate(writer)
    }

    /// Writes the geometry to the file at `path`, replacing it if it exists.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<GenerationSummary, GenerationError> {
        let writer = GeometryWriter::create(
            path,
            self.parameters.stress_type,
            self.domain.block_size(),
            self.domain.block_counts(),
        )?;
        self.generate(writer).map(|(_, summary)| summary)
    }

    fn generate<W: Write + Seek>(
        &self,
        writer: GeometryWriter<W>,
    ) -> Result<(W, GenerationSummary), GenerationError> {
        let mut domain = self.domain.clone();
        sweep_blocks(
            &self.surface,
            &self.iolets,
            &mut domain,
            self.parameters.probe_offset,
            writer,
        )
    }
}

/// Classifies every site of `domain` against `surface` and writes the geometry to `sink`.
///
/// `surface` must be closed and oriented outward, each triangle tag `i >= 0` designating
/// `iolets[i]`. The iolet indices are used as boundary ids. `probe_offset` is given in
/// voxels. The blocks of `domain` are all retired on success.
pub fn write_geometry<W: Write + Seek>(
    surface: &Surface,
    iolets: &[Iolet],
    domain: &mut Domain,
    stress_type: i32,
    probe_offset: Vector<Real>,
    sink: W,
) -> Result<(W, GenerationSummary), GenerationError> {
    check_iolets(iolets)?;

    if let Some(tag) = surface
        .iolet_ids()
        .iter()
        .copied()
        .find(|tag| *tag >= 0 && *tag as usize >= iolets.len())
    {
        return Err(ConfigurationError::UnknownIoletTag {
            tag,
            num_iolets: iolets.len(),
        }
        .into());
    }

    let writer = GeometryWriter::new(sink, stress_type, domain.block_size(), domain.block_counts())?;
    sweep_blocks(surface, iolets, domain, probe_offset, writer)
}

fn sweep_blocks<W: Write + Seek>(
    surface: &Surface,
    iolets: &[Iolet],
    domain: &mut Domain,
    probe_offset: Vector<Real>,
    mut writer: GeometryWriter<W>,
) -> Result<(W, GenerationSummary), GenerationError> {
    let index = SpatialIndex::new(surface);
    let classifier = SiteClassifier::new(&index, iolets, probe_offset * domain.voxel_size());
    let mut sweep = BlockSweep::new(domain);
    let mut summary = GenerationSummary {
        total_blocks: domain.total_blocks(),
        ..Default::default()
    };

    while let Some(block) = sweep.next_block(domain) {
        let header = writer.write_block(|block_writer| {
            for site in domain.site_indices(&block) {
                classifier.classify(domain, &site);
                let config = domain.site_config(&site);
                block_writer.write_site(domain.site_mut(&site), config);
            }
        })?;

        if !header.is_empty() {
            summary.non_empty_blocks += 1;
            summary.fluid_sites += header.fluid_sites as u64;
            summary.body_bytes += header.byte_length as u64;
        }
    }

    let sink = writer.close()?;

    log::info!(
        "Wrote {} blocks ({} non-empty), {} fluid sites, {} body bytes.",
        summary.total_blocks,
        summary.non_empty_blocks,
        summary.fluid_sites,
        summary.body_bytes
    );

    Ok((sink, summary))
}
