use super::neighbours::NUM_NEIGHBOURS;
use static_assertions::const_assert;

/// The number of bits holding the [`SiteType`].
pub const SITE_TYPE_BITS: u32 = 2;
/// The number of bits holding the cut-direction mask, one per lattice direction.
pub const BOUNDARY_CONFIG_BITS: u32 = 14;
/// The number of reserved direction bits.
pub const BOUNDARY_DIR_BITS: u32 = 4;
/// The number of bits holding the boundary id of inlet and outlet sites.
pub const BOUNDARY_ID_BITS: u32 = 10;

/// The position of the cut-direction mask.
pub const BOUNDARY_CONFIG_SHIFT: u32 = SITE_TYPE_BITS;
/// The position of the reserved direction bits.
pub const BOUNDARY_DIR_SHIFT: u32 = BOUNDARY_CONFIG_SHIFT + BOUNDARY_CONFIG_BITS;
/// The position of the boundary id.
pub const BOUNDARY_ID_SHIFT: u32 = BOUNDARY_DIR_SHIFT + BOUNDARY_DIR_BITS;

// 0000 0000  0000 0000  0000 0000  0000 0011
/// Selects the [`SiteType`] bits.
pub const SITE_TYPE_MASK: u32 = (1 << SITE_TYPE_BITS) - 1;
// 0000 0000  0000 0000  1111 1111  1111 1100
/// Selects the cut-direction mask.
pub const BOUNDARY_CONFIG_MASK: u32 = ((1 << BOUNDARY_CONFIG_BITS) - 1) << BOUNDARY_CONFIG_SHIFT;
// 0000 0000  0000 1111  0000 0000  0000 0000
/// Selects the reserved direction bits. They are always zero.
pub const BOUNDARY_DIR_MASK: u32 = ((1 << BOUNDARY_DIR_BITS) - 1) << BOUNDARY_DIR_SHIFT;
// 0011 1111  1111 0000  0000 0000  0000 0000
/// Selects the boundary id.
pub const BOUNDARY_ID_MASK: u32 = ((1 << BOUNDARY_ID_BITS) - 1) << BOUNDARY_ID_SHIFT;
// 1000 0000  0000 0000  0000 0000  0000 0000
/// Set on edge sites, i.e. on the sites whose record carries a wall normal and distance.
pub const PRESSURE_EDGE_MASK: u32 = 1 << 31;

/// The largest boundary id a configuration word can hold.
pub const MAX_BOUNDARY_ID: u32 = (1 << BOUNDARY_ID_BITS) - 1;

const_assert!(BOUNDARY_CONFIG_BITS as usize == NUM_NEIGHBOURS);
const_assert!(BOUNDARY_ID_SHIFT + BOUNDARY_ID_BITS < 31);

/// The kind of a lattice site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum SiteType {
    /// Outside of the fluid region.
    Solid = 0b00,
    /// Inside of the fluid region, and not next to an iolet.
    Fluid = 0b01,
    /// A fluid site whose closest iolet crossing is an inlet.
    Inlet = 0b10,
    /// A fluid site whose closest iolet crossing is an outlet.
    Outlet = 0b11,
}

impl SiteType {
    /// The type encoded by the two lowest bits of `bits`.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & SITE_TYPE_MASK {
            0b00 => SiteType::Solid,
            0b01 => SiteType::Fluid,
            0b10 => SiteType::Inlet,
            _ => SiteType::Outlet,
        }
    }

    /// Is this any of the fluid types?
    pub const fn is_fluid(self) -> bool {
        !matches!(self, SiteType::Solid)
    }

    /// Is this an inlet or an outlet?
    pub const fn is_boundary(self) -> bool {
        matches!(self, SiteType::Inlet | SiteType::Outlet)
    }
}

/// The packed 32-bit classification of a site, as stored in the geometry file.
///
/// From the lowest to the highest bits: the [`SiteType`] (2 bits), the cut-direction mask
/// (14 bits, one per lattice direction leading to a solid site), 4 unused bits, the boundary
/// id of inlet and outlet sites (10 bits), and the edge flag in bit 31.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SiteConfig(pub u32);

impl SiteConfig {
    /// The configuration of a site of the given type, with all other fields cleared.
    pub const fn new(site_type: SiteType) -> Self {
        Self(site_type as u32)
    }

    /// Sets the cut-direction mask.
    #[must_use]
    pub const fn with_cut_mask(self, mask: u16) -> Self {
        Self(
            (self.0 & !BOUNDARY_CONFIG_MASK)
                | (((mask as u32) << BOUNDARY_CONFIG_SHIFT) & BOUNDARY_CONFIG_MASK),
        )
    }

    /// Sets the boundary id. Only the lowest [`BOUNDARY_ID_BITS`] bits of `id` are kept.
    #[must_use]
    pub const fn with_boundary_id(self, id: u32) -> Self {
        Self((self.0 & !BOUNDARY_ID_MASK) | ((id << BOUNDARY_ID_SHIFT) & BOUNDARY_ID_MASK))
    }

    /// Sets the edge flag.
    #[must_use]
    pub const fn with_edge_flag(self) -> Self {
        Self(self.0 | PRESSURE_EDGE_MASK)
    }

    /// The raw configuration word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The type of the site.
    #[inline]
    pub const fn site_type(self) -> SiteType {
        SiteType::from_bits(self.0)
    }

    /// The cut-direction mask: bit `i` is set if the direction `i` leads to a solid site.
    #[inline]
    pub const fn cut_mask(self) -> u16 {
        ((self.0 & BOUNDARY_CONFIG_MASK) >> BOUNDARY_CONFIG_SHIFT) as u16
    }

    /// Does the direction `i` lead to a solid site?
    #[inline]
    pub const fn is_cut(self, i: usize) -> bool {
        self.cut_mask() & (1 << i) != 0
    }

    /// The boundary id of an inlet or outlet site.
    #[inline]
    pub const fn boundary_id(self) -> u32 {
        (self.0 & BOUNDARY_ID_MASK) >> BOUNDARY_ID_SHIFT
    }

    /// Is the edge flag set?
    #[inline]
    pub const fn is_edge(self) -> bool {
        self.0 & PRESSURE_EDGE_MASK != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_match_layout() {
        assert_eq!(SITE_TYPE_MASK, 0x0000_0003);
        assert_eq!(BOUNDARY_CONFIG_MASK, 0x0000_fffc);
        assert_eq!(BOUNDARY_DIR_MASK, 0x000f_0000);
        assert_eq!(BOUNDARY_ID_MASK, 0x3ff0_0000);
        assert_eq!(
            SITE_TYPE_MASK & BOUNDARY_CONFIG_MASK & BOUNDARY_DIR_MASK & BOUNDARY_ID_MASK,
            0
        );
    }

    #[test]
    fn pack_and_unpack_fields() {
        let config = SiteConfig::new(SiteType::Outlet)
            .with_cut_mask(0b10_0000_0000_0101)
            .with_boundary_id(37)
            .with_edge_flag();

        assert_eq!(config.site_type(), SiteType::Outlet);
        assert_eq!(config.cut_mask(), 0b10_0000_0000_0101);
        assert!(config.is_cut(0) && config.is_cut(2) && config.is_cut(13));
        assert!(!config.is_cut(1));
        assert_eq!(config.boundary_id(), 37);
        assert!(config.is_edge());
        assert_eq!(config.bits() & BOUNDARY_DIR_MASK, 0);
        assert_eq!(
            config.bits(),
            0b11 | (0b10_0000_0000_0101 << 2) | (37 << 20) | (1 << 31)
        );
    }

    #[test]
    fn simple_configs_are_the_type() {
        assert_eq!(SiteConfig::new(SiteType::Solid).bits(), 0);
        assert_eq!(SiteConfig::new(SiteType::Fluid).bits(), 1);
        assert!(SiteType::Inlet.is_boundary() && SiteType::Inlet.is_fluid());
        assert!(!SiteType::Fluid.is_boundary() && !SiteType::Solid.is_fluid());
    }
}
