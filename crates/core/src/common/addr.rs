//! Address decomposition and set/way indexing.
//!
//! This module turns raw addresses into cache coordinates. It provides the following:
//! 1. **Decomposition:** Splits an address into set index, tag, and line-base address.
//! 2. **Slot Indexing:** A 2D `(set, way)` index validated against the cache geometry.
//! 3. **Line Arithmetic:** Helpers for reconstructing addresses from their parts.

/// Identifier of the logical owner of a line (a core id in the simulator).
pub type TenantId = u8;

/// Result of splitting an address into cache coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decomposed {
    /// Set the address maps into.
    pub set: usize,
    /// Tag compared against each way of the set.
    pub tag: u64,
    /// Address of the first byte of the line.
    pub line_addr: u64,
}

/// Precomputed shifts and masks for address decomposition.
///
/// `set_index = (addr >> shift_bits) & set_mask`, `tag = (addr >> shift_bits) & tag_mask`
/// and `line_addr = addr & !offset_mask`. The tag keeps the full upper address
/// (set bits cleared), so two lines in the same set never share a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddrLayout {
    /// log2 of the set count.
    pub set_bits: u32,
    /// log2 of the line size; applied before extracting set and tag.
    pub shift_bits: u32,
    /// Mask applied after shifting to get the set index.
    pub set_mask: u64,
    /// Mask applied after shifting to get the tag.
    pub tag_mask: u64,
    /// Mask selecting the byte offset within a line.
    pub offset_mask: u64,
}

impl AddrLayout {
    /// Builds the layout for a cache with `num_sets` sets of `line_bytes`-byte lines.
    ///
    /// Both arguments must be powers of two; the cache constructor validates this
    /// before calling.
    pub fn new(num_sets: usize, line_bytes: usize) -> Self {
        debug_assert!(num_sets.is_power_of_two());
        debug_assert!(line_bytes.is_power_of_two());
        let set_bits = num_sets.trailing_zeros();
        let shift_bits = line_bytes.trailing_zeros();
        let set_mask = (num_sets as u64) - 1;
        Self {
            set_bits,
            shift_bits,
            set_mask,
            tag_mask: !set_mask,
            offset_mask: (line_bytes as u64) - 1,
        }
    }

    /// Splits `addr` into set index, tag, and line-base address.
    #[inline(always)]
    pub fn decompose(&self, addr: u64) -> Decomposed {
        let shifted = addr >> self.shift_bits;
        Decomposed {
            set: (shifted & self.set_mask) as usize,
            tag: shifted & self.tag_mask,
            line_addr: addr & !self.offset_mask,
        }
    }

    /// Returns the line-base address of `addr`.
    #[inline(always)]
    pub fn line_addr(&self, addr: u64) -> u64 {
        addr & !self.offset_mask
    }

    /// Returns the byte offset of `addr` within its line.
    #[inline(always)]
    pub fn offset(&self, addr: u64) -> u64 {
        addr & self.offset_mask
    }

    /// Rebuilds a line-base address from a tag and a set index.
    ///
    /// Inverse of [`AddrLayout::decompose`] for the line-aligned part of an address.
    pub fn compose(&self, tag: u64, set: usize) -> u64 {
        (tag | (set as u64 & self.set_mask)) << self.shift_bits
    }
}

/// A `(set, way)` coordinate inside one cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    /// Set index.
    pub set: usize,
    /// Way index within the set.
    pub way: usize,
}

impl Slot {
    /// Creates a slot coordinate.
    #[inline(always)]
    pub const fn new(set: usize, way: usize) -> Self {
        Self { set, way }
    }
}

/// Fixed bounds of a cache's 2D storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Number of sets.
    pub sets: usize,
    /// Ways per set (associativity).
    pub ways: usize,
}

impl Geometry {
    /// Creates a geometry of `sets` rows by `ways` columns.
    pub const fn new(sets: usize, ways: usize) -> Self {
        Self { sets, ways }
    }

    /// Total number of slots.
    pub const fn len(&self) -> usize {
        self.sets * self.ways
    }

    /// Returns `true` if the geometry holds no slots.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps a slot to its row-major flat index.
    ///
    /// Bounds are checked in debug builds; release builds rely on the slice
    /// indexing that follows.
    #[inline(always)]
    pub fn flat(&self, slot: Slot) -> usize {
        debug_assert!(slot.set < self.sets, "set {} out of {}", slot.set, self.sets);
        debug_assert!(slot.way < self.ways, "way {} out of {}", slot.way, self.ways);
        slot.set * self.ways + slot.way
    }

    /// Flat index range covering every way of `set`.
    #[inline(always)]
    pub fn set_range(&self, set: usize) -> std::ops::Range<usize> {
        debug_assert!(set < self.sets, "set {} out of {}", set, self.sets);
        let base = set * self.ways;
        base..base + self.ways
    }
}
