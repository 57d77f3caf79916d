use crate::generation::{ConfigurationError, GenerationError};
use crate::lattice::{Site, SiteConfig, MAX_BLOCK_SIZE, NUM_NEIGHBOURS};
use crate::math::{Real, Vector, DIM};
use static_assertions::const_assert;
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// The size, in bytes, of the file preamble: the stress type, the block counts and the block
/// size.
pub const PREAMBLE_SIZE: u64 = 4 * (2 + DIM as u64);

/// The size, in bytes, of the header of one block: its fluid site count and its byte length.
pub const BLOCK_HEADER_SIZE: u64 = 8;

/// The size, in bytes, of the largest site record: an edge boundary site.
pub const MAX_SITE_RECORD_SIZE: u64 = 4 + 2 * 8 * (DIM as u64 + 1) + 8 * NUM_NEIGHBOURS as u64;

const_assert!(
    (MAX_BLOCK_SIZE as u64).pow(DIM as u32) * MAX_SITE_RECORD_SIZE <= u32::MAX as u64
);

/// The header entry of a block: how many fluid sites it holds and how many bytes it takes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BlockHeader {
    /// The number of fluid sites of the block.
    pub fluid_sites: u32,
    /// The size of the block record, in bytes.
    pub byte_length: u32,
}

impl BlockHeader {
    /// Does this block hold no fluid site?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fluid_sites == 0
    }
}

/// Accumulates the record of one block.
///
/// All the values are big-endian.
#[derive(Clone, Debug, Default)]
pub struct BlockWriter {
    buffer: Vec<u8>,
    fluid_sites: u32,
}

impl BlockWriter {
    /// Appends an unsigned integer.
    #[inline]
    pub fn pack_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends a double.
    #[inline]
    pub fn pack_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends the three components of a vector.
    pub fn pack_vector(&mut self, v: &Vector<Real>) {
        for c in v.iter() {
            self.pack_f64(*c);
        }
    }

    /// Counts one more fluid site.
    #[inline]
    pub fn increment_fluid_sites(&mut self) {
        self.fluid_sites += 1;
    }

    /// The number of fluid sites written so far.
    #[inline]
    pub fn fluid_sites(&self) -> u32 {
        self.fluid_sites
    }

    /// The bytes written so far.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Appends the record of a classified site.
    ///
    /// Solid sites are reduced to their configuration word. Fluid sites add their iolet
    /// crossing if they have one, their closest wall crossing if they are edge sites, then
    /// the crossing distance along every lattice direction (infinite if there is none).
    pub fn write_site(&mut self, site: &Site, config: SiteConfig) {
        self.pack_u32(config.bits());

        let site_type = config.site_type();
        if !site_type.is_fluid() {
            return;
        }

        self.increment_fluid_sites();

        if site_type.is_boundary() {
            self.pack_vector(&site.boundary_normal);
            self.pack_f64(site.boundary_distance);
        }

        if config.is_edge() {
            self.pack_vector(&site.wall_normal);
            self.pack_f64(site.wall_distance);
        }

        for distance in site.cut_distances {
            self.pack_f64(distance);
        }
    }
}

/// Streams the blocks of a geometry file to a seekable sink.
///
/// The preamble is written first, followed by a placeholder header with one entry per
/// block. Block records are then appended in file order, and [`GeometryWriter::close`]
/// rewrites the header with the actual entries.
pub struct GeometryWriter<W: Write + Seek> {
    sink: W,
    path: PathBuf,
    num_blocks: usize,
    header: Vec<u8>,
    header_start: u64,
    offset: u64,
}

impl GeometryWriter<BufWriter<File>> {
    /// Creates the file at `path` and writes its preamble.
    pub fn create(
        path: impl AsRef<Path>,
        stress_type: i32,
        block_size: u32,
        block_counts: [u32; DIM],
    ) -> Result<Self, GenerationError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| GenerationError::Io {
            path: path.to_path_buf(),
            offset: 0,
            source,
        })?;

        Self::with_path(
            BufWriter::new(file),
            path.to_path_buf(),
            stress_type,
            block_size,
            block_counts,
        )
    }
}

impl<W: Write + Seek> GeometryWriter<W> {
    /// Writes the preamble of a geometry file to `sink`.
    ///
    /// The geometry is written from the current position of `sink`. Fails with
    /// [`ConfigurationError::InvalidBlockSize`] unless `block_size` lies between 1 and
    /// [`MAX_BLOCK_SIZE`].
    pub fn new(
        sink: W,
        stress_type: i32,
        block_size: u32,
        block_counts: [u32; DIM],
    ) -> Result<Self, GenerationError> {
        Self::with_path(sink, PathBuf::from("<stream>"), stress_type, block_size, block_counts)
    }

    fn with_path(
        mut sink: W,
        path: PathBuf,
        stress_type: i32,
        block_size: u32,
        block_counts: [u32; DIM],
    ) -> Result<Self, GenerationError> {
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(ConfigurationError::InvalidBlockSize.into());
        }

        let start = sink
            .stream_position()
            .map_err(|source| GenerationError::Io {
                path: path.clone(),
                offset: 0,
                source,
            })?;
        let num_blocks: usize = block_counts.iter().map(|n| *n as usize).product();

        let mut result = Self {
            sink,
            path,
            num_blocks,
            header: Vec::with_capacity(num_blocks * BLOCK_HEADER_SIZE as usize),
            header_start: start + PREAMBLE_SIZE,
            offset: start,
        };

        let mut preamble = Vec::with_capacity(PREAMBLE_SIZE as usize);
        preamble.extend_from_slice(&stress_type.to_be_bytes());
        for n in block_counts {
            preamble.extend_from_slice(&n.to_be_bytes());
        }
        preamble.extend_from_slice(&block_size.to_be_bytes());
        result.write_all(&preamble)?;

        // Zeroed until the blocks are known.
        let placeholder = vec![0; result.header_region_len() as usize];
        result.write_all(&placeholder)?;
        log::debug!(
            "Reserved {} header bytes for {} blocks at offset {}.",
            placeholder.len(),
            num_blocks,
            result.header_start
        );

        Ok(result)
    }

    /// The number of blocks this file is made of.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// The number of blocks written so far.
    #[inline]
    pub fn num_blocks_written(&self) -> usize {
        self.header.len() / BLOCK_HEADER_SIZE as usize
    }

    /// The current byte offset in the sink.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn header_region_len(&self) -> u64 {
        self.num_blocks as u64 * BLOCK_HEADER_SIZE
    }

    /// Appends the next block, filled by `f`.
    ///
    /// Blocks must be written in file order.
    pub fn write_block(
        &mut self,
        f: impl FnOnce(&mut BlockWriter),
    ) -> Result<BlockHeader, GenerationError> {
        let mut block = BlockWriter::default();
        f(&mut block);
        self.finish_block(block)
    }

    /// Appends the block accumulated by `block`.
    ///
    /// A block without fluid sites is reduced to a zeroed header entry: none of its bytes
    /// reach the sink.
    pub fn finish_block(&mut self, block: BlockWriter) -> Result<BlockHeader, GenerationError> {
        let body: &[u8] = if block.fluid_sites == 0 {
            &[]
        } else {
            &block.buffer
        };
        let byte_length =
            u32::try_from(body.len()).map_err(|_| GenerationError::BlockTooLarge {
                block: self.num_blocks_written(),
                length: body.len() as u64,
            })?;
        let header = BlockHeader {
            fluid_sites: block.fluid_sites,
            byte_length,
        };

        log::debug!(
            "Block {} at offset {}: {} fluid sites, {} bytes.",
            self.num_blocks_written(),
            self.offset,
            header.fluid_sites,
            header.byte_length
        );

        self.write_all(body)?;
        self.header
            .extend_from_slice(&header.fluid_sites.to_be_bytes());
        self.header
            .extend_from_slice(&header.byte_length.to_be_bytes());

        Ok(header)
    }

    /// Rewrites the block headers and flushes the sink.
    ///
    /// Fails with [`GenerationError::GeometryInconsistency`] if the number of blocks written
    /// differs from the number of blocks of the file.
    pub fn close(mut self) -> Result<W, GenerationError> {
        let expected = self.header_region_len();
        let actual = self.header.len() as u64;

        if expected != actual {
            return Err(GenerationError::GeometryInconsistency { expected, actual });
        }

        let end = self.offset;
        self.seek(self.header_start)?;
        let header = std::mem::take(&mut self.header);
        self.write_all(&header)?;
        self.seek(end)?;
        self.sink.flush().map_err(|e| self.io_error(e))?;

        log::debug!(
            "Wrote {} block headers to {}, {} bytes in total.",
            self.num_blocks,
            self.path.display(),
            end
        );

        Ok(self.sink)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), GenerationError> {
        self.sink.write_all(bytes).map_err(|e| self.io_error(e))?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    fn seek(&mut self, offset: u64) -> Result<(), GenerationError> {
        self.offset = self
            .sink
            .seek(SeekFrom::Start(offset))
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> GenerationError {
        GenerationError::Io {
            path: self.path.clone(),
            offset: self.offset,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::SiteType;
    use crate::math::{LatticeIndex, Point};
    use crate::shape::Iolet;
    use std::io::Cursor;

    fn be_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn preamble_and_headers() {
        let mut writer = GeometryWriter::new(Cursor::new(vec![]), -3, 2, [1, 1, 2]).unwrap();
        assert_eq!(writer.offset(), PREAMBLE_SIZE + 2 * BLOCK_HEADER_SIZE);

        let empty = writer.write_block(|block| block.pack_u32(0)).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.byte_length, 0);

        let full = writer
            .write_block(|block| {
                block.pack_u32(7);
                block.increment_fluid_sites();
            })
            .unwrap();
        assert_eq!(full, BlockHeader { fluid_sites: 1, byte_length: 4 });

        let bytes = writer.close().unwrap().into_inner();
        assert_eq!(bytes.len(), 20 + 16 + 4);
        assert_eq!(i32::from_be_bytes(bytes[0..4].try_into().unwrap()), -3);
        assert_eq!([be_u32(&bytes, 4), be_u32(&bytes, 8), be_u32(&bytes, 12)], [1, 1, 2]);
        assert_eq!(be_u32(&bytes, 16), 2);
        assert_eq!([be_u32(&bytes, 20), be_u32(&bytes, 24)], [0, 0]);
        assert_eq!([be_u32(&bytes, 28), be_u32(&bytes, 32)], [1, 4]);
        assert_eq!(be_u32(&bytes, 36), 7);
    }

    #[test]
    fn missing_blocks_are_inconsistent() {
        let mut writer = GeometryWriter::new(Cursor::new(vec![]), 1, 2, [2, 1, 1]).unwrap();
        let _ = writer.write_block(|_| {}).unwrap();

        match writer.close() {
            Err(GenerationError::GeometryInconsistency { expected, actual }) => {
                assert_eq!((expected, actual), (16, 8));
            }
            other => panic!("unexpected result: {:?}", other.map(|c| c.into_inner())),
        }
    }

    #[test]
    fn geometry_starts_at_the_sink_position() {
        let mut sink = Cursor::new(b"xyz".to_vec());
        sink.set_position(3);
        let mut writer = GeometryWriter::new(sink, 1, 1, [1, 1, 1]).unwrap();
        let _ = writer.write_block(|_| {}).unwrap();
        let bytes = writer.close().unwrap().into_inner();
        assert_eq!(&bytes[..3], b"xyz");
        assert_eq!(bytes.len(), 3 + 20 + 8);
    }

    #[test]
    fn oversized_blocks_are_rejected() {
        for block_size in [0, MAX_BLOCK_SIZE + 1] {
            let result = GeometryWriter::new(Cursor::new(vec![]), 1, block_size, [1, 1, 1]);
            assert!(matches!(
                result,
                Err(GenerationError::Configuration(
                    ConfigurationError::InvalidBlockSize
                ))
            ));
        }

        assert!(GeometryWriter::new(Cursor::new(vec![]), 1, MAX_BLOCK_SIZE, [1, 1, 1]).is_ok());
    }

    #[test]
    fn site_records() {
        let mut site = Site::new(LatticeIndex::origin(), Point::origin());
        let mut block = BlockWriter::default();

        block.write_site(&site, SiteConfig::new(SiteType::Solid));
        assert_eq!(block.bytes().len(), 4);
        assert_eq!(block.fluid_sites(), 0);

        site.is_fluid = Some(true);
        block.write_site(&site, SiteConfig::new(SiteType::Fluid));
        assert_eq!(block.bytes().len(), 4 + 4 + 14 * 8);
        assert_eq!(block.fluid_sites(), 1);
        assert_eq!(&block.bytes()[8..16], &f64::INFINITY.to_be_bytes());

        site.iolet = Some(Iolet::inlet(Point::origin(), Vector::z()));
        site.boundary_normal = Vector::z();
        site.boundary_distance = 0.25;
        let before = block.bytes().len();
        let config = SiteConfig::new(SiteType::Inlet)
            .with_cut_mask(1)
            .with_edge_flag();
        block.write_site(&site, config);
        assert_eq!(block.bytes().len() - before, MAX_SITE_RECORD_SIZE as usize);
        assert_eq!(&block.bytes()[before + 4 + 24..before + 4 + 32], &0.25f64.to_be_bytes());
    }
}
