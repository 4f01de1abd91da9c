//! Shadow store for shadow-ideal replacement.
//!
//! Lines evicted from the primary array are parked in a per-set shadow array
//! managed with true LRU. When a primary miss finds its line in the shadow, the
//! two recency stamps are compared: a shadow line more recent than the
//! primary LRU line would have survived with a little more capacity, so it is
//! swapped back in and the access counts as a hit.

use std::mem;

use super::line::{Line, SetStore};
use super::policies::lru_way;
use crate::common::{Geometry, Slot};

/// What a shadow lookup did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowOutcome {
    /// The tag is not in the shadow set.
    Absent,
    /// The shadow line was swapped into this primary way.
    Promoted(usize),
    /// The shadow line was older than the primary LRU line and was dropped.
    Discarded,
}

/// Per-set shadow arrays.
#[derive(Debug)]
pub struct ShadowStore<T> {
    store: SetStore<T>,
}

impl<T> ShadowStore<T> {
    /// Allocates `sets` shadow sets of `ways` ways each.
    pub fn new(sets: usize, ways: usize, fresh: &dyn Fn() -> T) -> Self {
        Self {
            store: SetStore::new(Geometry::new(sets, ways), 0, fresh),
        }
    }

    /// Read access to the shadow lines of `set`.
    pub fn set(&self, set: usize) -> &[Line] {
        self.store.set(set)
    }

    /// Returns `true` if `tag` is held in the shadow of `set`.
    pub fn contains(&self, set: usize, tag: u64) -> bool {
        self.store.find(set, tag).is_some()
    }

    /// Moves an evicted primary line into the shadow of `set`.
    ///
    /// The shadow's own LRU way is overwritten; payloads are swapped so the
    /// primary way is left with the shadow's stale payload.
    pub fn absorb(&mut self, set: usize, victim: &Line, data: &mut T, now: u64) -> usize {
        let way = lru_way(self.store.set(set));
        let (line, slot_data) = self.store.entry_mut(Slot::new(set, way));
        *line = Line {
            last_access: now,
            ..victim.clone()
        };
        mem::swap(slot_data, data);
        way
    }

    /// Resolves a primary miss of `tag` in `set` against the shadow.
    ///
    /// An invalid primary way counts as the oldest possible line.
    pub fn resolve_miss(
        &mut self,
        primary: &mut SetStore<T>,
        set: usize,
        tag: u64,
        now: u64,
    ) -> ShadowOutcome {
        let Some(shadow_way) = self.store.find(set, tag) else {
            return ShadowOutcome::Absent;
        };
        let primary_way = lru_way(primary.set(set));
        let primary_slot = Slot::new(set, primary_way);
        let shadow_slot = Slot::new(set, shadow_way);

        let primary_time = {
            let line = primary.line(primary_slot);
            if line.valid { line.last_access } else { 0 }
        };
        let shadow_time = self.store.line(shadow_slot).last_access;
        if primary_time >= shadow_time {
            self.store.line_mut(shadow_slot).invalidate();
            return ShadowOutcome::Discarded;
        }

        let (p_line, p_data) = primary.entry_mut(primary_slot);
        let (s_line, s_data) = self.store.entry_mut(shadow_slot);
        mem::swap(p_line, s_line);
        mem::swap(p_data, s_data);
        s_line.last_access = shadow_time;
        p_line.last_access = now;
        ShadowOutcome::Promoted(primary_way)
    }

    /// Invalidates `tag` in the shadow of `set`, if present.
    pub fn forget(&mut self, set: usize, tag: u64) -> bool {
        match self.store.find(set, tag) {
            Some(way) => {
                self.store.line_mut(Slot::new(set, way)).invalidate();
                true
            }
            None => false,
        }
    }

    /// Invalidates every shadow line.
    pub fn clear(&mut self) {
        self.store.invalidate_all(0);
    }
}
