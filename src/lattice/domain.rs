use super::block::Block;
use super::neighbours::{neighbour_offset, NUM_NEIGHBOURS};
use super::site::Site;
use super::site_config::{SiteConfig, SiteType};
use crate::bounding_volume::Aabb;
use crate::generation::ConfigurationError;
use crate::math::{LatticeIndex, Point, Real, Vector, DIM};
use crate::utils::hashmap::HashMap;

/// The largest number of sites along each edge of a block.
pub const MAX_BLOCK_SIZE: u32 = 256;

/// The lattice of sites covering a surface, split into cubic blocks.
///
/// Blocks are created on demand and retired by a [`BlockSweep`] once no site of a later
/// block can reach them, so only a thin slab of the lattice is alive at any time.
#[derive(Clone, Debug)]
pub struct Domain {
    voxel_size: Real,
    origin: Point<Real>,
    block_size: u32,
    block_counts: [u32; DIM],
    blocks: HashMap<LatticeIndex, Block>,
}

impl Domain {
    /// The smallest lattice of spacing `voxel_size` covering `bounds`, centered on it.
    ///
    /// Along each axis, the lattice has `floor(extent / voxel_size) + 2` sites, rounded up to
    /// a whole number of blocks, and the padding before the first site and after the last
    /// covered site are equal.
    pub fn new(voxel_size: Real, bounds: &Aabb, block_size: u32) -> Result<Self, ConfigurationError> {
        if !(voxel_size.is_finite() && voxel_size > 0.0) {
            return Err(ConfigurationError::InvalidVoxelSize(voxel_size));
        }

        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(ConfigurationError::InvalidBlockSize);
        }

        assert!(bounds.is_valid(), "the domain bounds must not be empty");

        let mut origin = Point::origin();
        let mut block_counts = [0; DIM];

        for d in 0..DIM {
            let extent = bounds.maxs[d] - bounds.mins[d];
            // Room for the sites just outside of the bounds.
            let num_sites = (extent / voxel_size).floor() as u32 + 2;
            let extra = num_sites as Real * voxel_size - extent;
            origin[d] = bounds.mins[d] - 0.5 * extra;
            block_counts[d] = num_sites.div_ceil(block_size);
        }

        Ok(Self {
            voxel_size,
            origin,
            block_size,
            block_counts,
            blocks: HashMap::default(),
        })
    }

    /// The distance between two adjacent sites.
    #[inline]
    pub fn voxel_size(&self) -> Real {
        self.voxel_size
    }

    /// The position of the site `(0, 0, 0)`.
    #[inline]
    pub fn origin(&self) -> Point<Real> {
        self.origin
    }

    /// The number of sites along each edge of a block.
    #[inline]
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// The number of blocks along each axis.
    #[inline]
    pub fn block_counts(&self) -> [u32; DIM] {
        self.block_counts
    }

    /// The number of sites along each axis.
    pub fn site_counts(&self) -> [u32; DIM] {
        self.block_counts.map(|n| n * self.block_size)
    }

    /// The total number of blocks.
    pub fn total_blocks(&self) -> usize {
        self.block_counts.iter().map(|n| *n as usize).product()
    }

    /// The position of the site with the given global index.
    pub fn calc_position(&self, site: &LatticeIndex) -> Point<Real> {
        lattice_position(&self.origin, self.voxel_size, site)
    }

    /// Is `site` a valid global site index?
    pub fn contains_site(&self, site: &LatticeIndex) -> bool {
        let counts = self.site_counts();
        (0..DIM).all(|d| site[d] >= 0 && (site[d] as u32) < counts[d])
    }

    /// Is `block` a valid block index?
    pub fn contains_block(&self, block: &LatticeIndex) -> bool {
        (0..DIM).all(|d| block[d] >= 0 && (block[d] as u32) < self.block_counts[d])
    }

    /// The index of the block containing `site`.
    pub fn block_of(&self, site: &LatticeIndex) -> LatticeIndex {
        site.map(|i| i.div_euclid(self.block_size as i32))
    }

    /// The global indices of the sites of `block`, in file order.
    pub fn site_indices(&self, block: &LatticeIndex) -> SiteIndices {
        SiteIndices {
            first: *block * self.block_size as i32,
            size: self.block_size as usize,
            next: 0,
        }
    }

    /// The number of blocks currently held in memory.
    pub fn num_live_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// The block with the given index, if it is in memory.
    pub fn block(&self, block: &LatticeIndex) -> Option<&Block> {
        self.blocks.get(block)
    }

    /// The block with the given index, created if it is not in memory.
    ///
    /// Panics if `block` is not part of the domain.
    pub fn get_or_create_block(&mut self, block: &LatticeIndex) -> &mut Block {
        assert!(
            self.contains_block(block),
            "the block {block} is outside of the domain"
        );

        let (origin, voxel_size, size) = (self.origin, self.voxel_size, self.block_size);
        let indices = self.site_indices(block);

        self.blocks.entry(*block).or_insert_with(|| {
            let sites = indices
                .map(|site| Site::new(site, lattice_position(&origin, voxel_size, &site)))
                .collect();
            Block::new(*block, size, sites)
        })
    }

    /// Removes a block from memory.
    pub fn retire_block(&mut self, block: &LatticeIndex) -> Option<Block> {
        self.blocks.remove(block)
    }

    /// The site with the given global index, if its block is in memory.
    pub fn site(&self, site: &LatticeIndex) -> Option<&Site> {
        self.blocks
            .get(&self.block_of(site))
            .map(|block| block.site(site))
    }

    /// The site with the given global index, its block being created if needed.
    ///
    /// Panics if `site` is not part of the domain.
    pub fn site_mut(&mut self, site: &LatticeIndex) -> &mut Site {
        let block = self.block_of(site);
        self.get_or_create_block(&block).site_mut(site)
    }

    /// The configuration word of `site`.
    ///
    /// For fluid sites with a wall crossing, the word records which in-domain neighbours are
    /// not fluid. Neighbours of unknown status count as solid.
    pub fn site_config(&self, site: &LatticeIndex) -> SiteConfig {
        let Some(s) = self.site(site) else {
            return SiteConfig::new(SiteType::Solid);
        };

        let site_type = s.site_type();
        let mut config = SiteConfig::new(site_type);

        if site_type.is_fluid() && s.is_edge {
            let mut mask = 0u16;

            for i in 0..NUM_NEIGHBOURS {
                let neighbour = site + neighbour_offset(i);

                if self.contains_site(&neighbour)
                    && self.site(&neighbour).and_then(|n| n.is_fluid) != Some(true)
                {
                    mask |= 1 << i;
                }
            }

            config = config.with_cut_mask(mask).with_edge_flag();
        }

        if let Some(id) = s.boundary_id().filter(|_| site_type.is_boundary()) {
            config = config.with_boundary_id(id);
        }

        config
    }

    /// Retires the blocks no site after `current` can reach.
    ///
    /// Later links never decrease the `x` block index, so once `current` is done, the blocks
    /// of the previous `x` row that are behind it along `y` and `z` are released. On the last
    /// row of an axis, the current index is released too.
    fn retire_behind(&mut self, current: &LatticeIndex) {
        let max = self.block_counts.map(|n| n as i32 - 1);
        let candidates = |d: usize| {
            [current[d] - 1, current[d]]
                .into_iter()
                .filter(move |i| *i >= 0 && (*i != current[d] || *i == max[d]))
        };

        for i in candidates(0) {
            for j in candidates(1) {
                for k in candidates(2) {
                    let _ = self.retire_block(&LatticeIndex::new(i, j, k));
                }
            }
        }
    }
}

fn lattice_position(origin: &Point<Real>, voxel_size: Real, site: &LatticeIndex) -> Point<Real> {
    origin + site.coords.cast::<Real>() * voxel_size
}

/// The global indices of the sites of a block, in file order.
#[derive(Clone, Debug)]
pub struct SiteIndices {
    first: LatticeIndex,
    size: usize,
    next: usize,
}

impl Iterator for SiteIndices {
    type Item = LatticeIndex;

    fn next(&mut self) -> Option<LatticeIndex> {
        if self.next == self.size * self.size * self.size {
            return None;
        }

        let n = self.next;
        self.next += 1;
        let local = Vector::new(
            n / (self.size * self.size),
            (n / self.size) % self.size,
            n % self.size,
        );
        Some(self.first + local.map(|i| i as i32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.size * self.size * self.size - self.next;
        (len, Some(len))
    }
}

impl ExactSizeIterator for SiteIndices {}

/// Visits the blocks of a [`Domain`] in file order, releasing memory behind itself.
///
/// Blocks are visited with the `z` index varying fastest, then `y`, then `x`. Each call to
/// [`BlockSweep::next_block`] first retires the blocks no longer reachable from the block
/// visited last. Once the sweep is over, no block remains in memory.
#[derive(Clone, Debug)]
pub struct BlockSweep {
    block_counts: [u32; DIM],
    next: usize,
    previous: Option<LatticeIndex>,
}

impl BlockSweep {
    /// A sweep over all the blocks of `domain`.
    pub fn new(domain: &Domain) -> Self {
        Self {
            block_counts: domain.block_counts(),
            next: 0,
            previous: None,
        }
    }

    /// Retires the blocks left behind, then creates and returns the next block index.
    pub fn next_block(&mut self, domain: &mut Domain) -> Option<LatticeIndex> {
        if let Some(previous) = self.previous.take() {
            domain.retire_behind(&previous);
        }

        let [_, ny, nz] = self.block_counts.map(|n| n as usize);
        let total: usize = self.block_counts.iter().map(|n| *n as usize).product();

        if self.next >= total {
            return None;
        }

        let n = self.next;
        self.next += 1;
        let block = LatticeIndex::new((n / (ny * nz)) as i32, ((n / nz) % ny) as i32, (n % nz) as i32);
        let _ = domain.get_or_create_block(&block);
        self.previous = Some(block);
        Some(block)
    }
}
