use crate::generation::{BlockHeader, BLOCK_HEADER_SIZE, PREAMBLE_SIZE};
use crate::lattice::{SiteConfig, SiteType, MAX_BLOCK_SIZE, NUM_NEIGHBOURS};
use crate::math::{Real, Vector, DIM};
use std::io::{self, Read};

/// The normal and distance of a surface crossing, as stored in a geometry file.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SurfaceCrossing {
    /// The normal of the crossed surface.
    pub normal: Vector<Real>,
    /// The distance from the site to the crossing.
    pub distance: Real,
}

/// The decoded record of one site of a geometry file.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteRecord {
    /// The configuration word of the site.
    pub config: SiteConfig,
    /// The closest iolet crossing, for inlet and outlet sites.
    pub boundary: Option<SurfaceCrossing>,
    /// The closest wall crossing, for edge sites.
    pub wall: Option<SurfaceCrossing>,
    /// The crossing distance along each lattice direction, for fluid sites.
    pub cut_distances: Option<[Real; NUM_NEIGHBOURS]>,
}

impl SiteRecord {
    /// The record of a solid site.
    pub fn solid() -> Self {
        Self {
            config: SiteConfig::new(SiteType::Solid),
            boundary: None,
            wall: None,
            cut_distances: None,
        }
    }

    /// The type of the site.
    #[inline]
    pub fn site_type(&self) -> SiteType {
        self.config.site_type()
    }

    fn decode(data: &mut &[u8]) -> io::Result<Self> {
        let config = SiteConfig(read_u32(data)?);
        let site_type = config.site_type();

        if !site_type.is_fluid() {
            return Ok(Self {
                config,
                ..Self::solid()
            });
        }

        let boundary = if site_type.is_boundary() {
            Some(read_crossing(data)?)
        } else {
            None
        };
        let wall = if config.is_edge() {
            Some(read_crossing(data)?)
        } else {
            None
        };

        let mut cut_distances = [Real::INFINITY; NUM_NEIGHBOURS];
        for distance in &mut cut_distances {
            *distance = read_f64(data)?;
        }

        Ok(Self {
            config,
            boundary,
            wall,
            cut_distances: Some(cut_distances),
        })
    }
}

/// Reads a geometry file block by block.
///
/// The preamble and the block headers are decoded on construction. The block records are
/// then decoded in file order by [`GeometryReader::read_block`].
pub struct GeometryReader<R: Read> {
    source: R,
    stress_type: i32,
    block_counts: [u32; DIM],
    block_size: u32,
    headers: Vec<BlockHeader>,
    next_block: usize,
}

impl<R: Read> GeometryReader<R> {
    /// Decodes the preamble and the block headers read from `source`.
    pub fn new(mut source: R) -> io::Result<Self> {
        let mut preamble = [0; PREAMBLE_SIZE as usize];
        source.read_exact(&mut preamble)?;
        let mut data = &preamble[..];

        let stress_type = read_u32(&mut data)? as i32;
        let mut block_counts = [0; DIM];
        for n in &mut block_counts {
            *n = read_u32(&mut data)?;
        }
        let block_size = read_u32(&mut data)?;

        let num_blocks = block_counts
            .iter()
            .try_fold(1usize, |acc, n| acc.checked_mul(*n as usize))
            .ok_or_else(|| invalid_data("block count overflow"))?;

        let header_len = num_blocks
            .checked_mul(BLOCK_HEADER_SIZE as usize)
            .ok_or_else(|| invalid_data("block count overflow"))?;
        let mut header = vec![];
        let _ = source
            .by_ref()
            .take(header_len as u64)
            .read_to_end(&mut header)?;
        if header.len() != header_len {
            return Err(invalid_data("truncated block headers"));
        }
        let mut data = &header[..];
        let mut headers = Vec::with_capacity(num_blocks);

        for _ in 0..num_blocks {
            headers.push(BlockHeader {
                fluid_sites: read_u32(&mut data)?,
                byte_length: read_u32(&mut data)?,
            });
        }

        Ok(Self {
            source,
            stress_type,
            block_counts,
            block_size,
            headers,
            next_block: 0,
        })
    }

    /// The stress type stored in the preamble.
    pub fn stress_type(&self) -> i32 {
        self.stress_type
    }

    /// The number of blocks along each axis.
    pub fn block_counts(&self) -> [u32; DIM] {
        self.block_counts
    }

    /// The number of sites along each edge of a block.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// The header entries of all the blocks, in file order.
    pub fn headers(&self) -> &[BlockHeader] {
        &self.headers
    }

    /// The total size of the block records, in bytes.
    pub fn body_length(&self) -> u64 {
        self.headers.iter().map(|h| h.byte_length as u64).sum()
    }

    /// Decodes the records of the next block, or returns `None` once all the blocks are read.
    ///
    /// Blocks without fluid sites are returned as solid records.
    pub fn read_block(&mut self) -> io::Result<Option<Vec<SiteRecord>>> {
        let Some(header) = self.headers.get(self.next_block).copied() else {
            return Ok(None);
        };
        self.next_block += 1;

        let num_sites = (self.block_size as usize)
            .checked_pow(DIM as u32)
            .filter(|n| *n <= MAX_BLOCK_SIZE.pow(DIM as u32) as usize)
            .ok_or_else(|| invalid_data("block size out of range"))?;

        if header.is_empty() {
            if header.byte_length != 0 {
                return Err(invalid_data("block without fluid sites has a body"));
            }

            return Ok(Some(vec![SiteRecord::solid(); num_sites]));
        }

        // Every site takes at least its configuration word.
        if (header.byte_length as usize) < num_sites * 4 {
            return Err(invalid_data("block record shorter than its sites"));
        }

        let mut body = vec![];
        let _ = self
            .source
            .by_ref()
            .take(header.byte_length as u64)
            .read_to_end(&mut body)?;
        if body.len() != header.byte_length as usize {
            return Err(invalid_data("truncated block record"));
        }
        let mut data = &body[..];

        let sites = (0..num_sites)
            .map(|_| SiteRecord::decode(&mut data))
            .collect::<io::Result<Vec<_>>>()?;

        if !data.is_empty() {
            return Err(invalid_data("trailing bytes after the last site of a block"));
        }

        let fluid_sites = sites.iter().filter(|s| s.site_type().is_fluid()).count();
        if fluid_sites != header.fluid_sites as usize {
            return Err(invalid_data("fluid site count mismatch"));
        }

        Ok(Some(sites))
    }
}

fn invalid_data(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

fn read_array<const N: usize>(data: &mut &[u8]) -> io::Result<[u8; N]> {
    let mut bytes = [0; N];
    data.read_exact(&mut bytes)
        .map_err(|_| invalid_data("truncated site record"))?;
    Ok(bytes)
}

fn read_u32(data: &mut &[u8]) -> io::Result<u32> {
    read_array(data).map(u32::from_be_bytes)
}

fn read_f64(data: &mut &[u8]) -> io::Result<f64> {
    read_array(data).map(f64::from_be_bytes)
}

fn read_crossing(data: &mut &[u8]) -> io::Result<SurfaceCrossing> {
    let normal = Vector::new(read_f64(data)?, read_f64(data)?, read_f64(data)?);
    let distance = read_f64(data)?;
    Ok(SurfaceCrossing { normal, distance })
}
