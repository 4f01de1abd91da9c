//! Line metadata and per-set storage.
//!
//! Metadata and payloads live in parallel row-major arrays. Replacement
//! disciplines only ever see a set's metadata as a `&[Line]` slice, so they stay
//! independent of the payload type.

use crate::common::{Geometry, Slot, TenantId};

/// Metadata of one way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    /// Line holds a valid tag.
    pub valid: bool,
    /// Tenant that inserted the line.
    pub tenant: TenantId,
    /// Upper address bits compared on lookup.
    pub tag: u64,
    /// Address of the first byte of the line.
    pub base: u64,
    /// Recency timestamp used by LRU-style disciplines.
    pub last_access: u64,
    /// Logical time of the fill.
    pub inserted: u64,
    /// Filled by a prefetch and not yet demanded.
    pub prefetched: bool,
    /// Written since the fill.
    pub dirty: bool,
    /// Re-reference prediction value (SRRIP).
    pub rrpv: u8,
}

impl Line {
    /// Returns `true` if the line is valid and carries `tag`.
    #[inline(always)]
    pub fn holds(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }

    /// Marks the line invalid and clears its address.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.tag = 0;
        self.base = 0;
        self.prefetched = false;
        self.dirty = false;
    }
}

/// A `sets x ways` array of lines with one payload per way.
pub struct SetStore<T> {
    geometry: Geometry,
    lines: Vec<Line>,
    data: Vec<T>,
}

impl<T> SetStore<T> {
    /// Allocates an all-invalid store, building each payload with `fresh`.
    pub fn new(geometry: Geometry, rrpv: u8, fresh: &dyn Fn() -> T) -> Self {
        let line = Line {
            rrpv,
            ..Line::default()
        };
        Self {
            geometry,
            lines: vec![line; geometry.len()],
            data: (0..geometry.len()).map(|_| fresh()).collect(),
        }
    }

    /// Bounds of the store.
    pub const fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Metadata of every way in `set`.
    #[inline(always)]
    pub fn set(&self, set: usize) -> &[Line] {
        &self.lines[self.geometry.set_range(set)]
    }

    /// Mutable metadata of every way in `set`.
    #[inline(always)]
    pub fn set_mut(&mut self, set: usize) -> &mut [Line] {
        let range = self.geometry.set_range(set);
        &mut self.lines[range]
    }

    /// Metadata of one slot.
    #[inline(always)]
    pub fn line(&self, slot: Slot) -> &Line {
        &self.lines[self.geometry.flat(slot)]
    }

    /// Mutable metadata of one slot.
    #[inline(always)]
    pub fn line_mut(&mut self, slot: Slot) -> &mut Line {
        let idx = self.geometry.flat(slot);
        &mut self.lines[idx]
    }

    /// Payload of one slot.
    #[inline(always)]
    pub fn data(&self, slot: Slot) -> &T {
        &self.data[self.geometry.flat(slot)]
    }

    /// Mutable payload of one slot.
    #[inline(always)]
    pub fn data_mut(&mut self, slot: Slot) -> &mut T {
        let idx = self.geometry.flat(slot);
        &mut self.data[idx]
    }

    /// Metadata and payload of one slot, borrowed together.
    pub fn entry_mut(&mut self, slot: Slot) -> (&mut Line, &mut T) {
        let idx = self.geometry.flat(slot);
        (&mut self.lines[idx], &mut self.data[idx])
    }

    /// Exchanges the payloads of two slots.
    pub fn swap_data(&mut self, a: Slot, b: Slot) {
        let (a, b) = (self.geometry.flat(a), self.geometry.flat(b));
        self.data.swap(a, b);
    }

    /// Way of `set` holding `tag`, if any.
    #[inline(always)]
    pub fn find(&self, set: usize, tag: u64) -> Option<usize> {
        self.set(set).iter().position(|line| line.holds(tag))
    }

    /// First invalid way of `set`, if any.
    pub fn first_invalid(&self, set: usize) -> Option<usize> {
        self.set(set).iter().position(|line| !line.valid)
    }

    /// Number of valid ways in `set`.
    pub fn valid_count(&self, set: usize) -> usize {
        self.set(set).iter().filter(|line| line.valid).count()
    }

    /// Invalidates every line, keeping payload storage.
    pub fn invalidate_all(&mut self, rrpv: u8) {
        for line in &mut self.lines {
            line.invalidate();
            line.rrpv = rrpv;
        }
    }

    /// Iterates over every valid line in the store.
    pub fn valid_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|line| line.valid)
    }
}

impl<T> std::fmt::Debug for SetStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetStore")
            .field("geometry", &self.geometry)
            .field("valid", &self.lines.iter().filter(|l| l.valid).count())
            .finish_non_exhaustive()
    }
}
