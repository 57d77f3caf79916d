use super::site::Site;
use crate::math::LatticeIndex;

/// A cube of `size³` sites.
///
/// Sites are stored with the `z` index varying fastest, then `y`, then `x`: the order in
/// which they are written to the geometry file.
#[derive(Clone, Debug)]
pub struct Block {
    index: LatticeIndex,
    size: u32,
    sites: Vec<Site>,
}

impl Block {
    pub(crate) fn new(index: LatticeIndex, size: u32, sites: Vec<Site>) -> Self {
        debug_assert_eq!(sites.len(), (size * size * size) as usize);
        Self { index, size, sites }
    }

    /// The integer coordinates of this block in the block grid.
    #[inline]
    pub fn index(&self) -> LatticeIndex {
        self.index
    }

    /// The global index of the first site of this block.
    #[inline]
    pub fn first_site(&self) -> LatticeIndex {
        self.index * self.size as i32
    }

    /// Does this block contain the site with the given global index?
    pub fn contains_site(&self, site: &LatticeIndex) -> bool {
        let local = site - self.first_site();
        local.iter().all(|i| *i >= 0 && *i < self.size as i32)
    }

    /// The sites of this block, in file order.
    #[inline]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// The site with the given global index.
    ///
    /// Panics if the site does not belong to this block.
    pub fn site(&self, site: &LatticeIndex) -> &Site {
        &self.sites[self.local_id(site)]
    }

    /// The site with the given global index.
    ///
    /// Panics if the site does not belong to this block.
    pub fn site_mut(&mut self, site: &LatticeIndex) -> &mut Site {
        let id = self.local_id(site);
        &mut self.sites[id]
    }

    fn local_id(&self, site: &LatticeIndex) -> usize {
        assert!(
            self.contains_site(site),
            "the site {site} is not part of the block {}",
            self.index
        );
        let local = (site - self.first_site()).map(|i| i as usize);
        let size = self.size as usize;
        (local.x * size + local.y) * size + local.z
    }
}
