//! Set-Associative Cache Engine.
//!
//! This module implements the generic cache used for every cache-like structure
//! of the simulator. It models hits, misses, and evictions under a pluggable
//! replacement discipline and owns the side structures some disciplines need:
//! 1. **Oracle:** Per-set unsure lists realizing Belady replacement.
//! 2. **Shadow-ideal:** A shadow array of recently evicted lines.
//! 3. **Ideal storage:** A bounded per-set ring approximating the oracle.
//!
//! Callers drive the cache with `probe` and, on a miss, `insert`. Payloads are
//! opaque to the engine: each way owns one `T`, created by the payload factory
//! given at construction and moved (never copied) between storage areas.

/// Bounded oracle ring.
pub mod ideal_storage;
/// Line metadata and per-set storage.
pub mod line;
/// Unsure lists for oracle replacement.
pub mod oracle;
/// Replacement discipline implementations.
pub mod policies;
/// Shadow array for shadow-ideal replacement.
pub mod shadow;

use tracing::{debug, trace};

use self::ideal_storage::IdealStorage;
use self::line::{Line, SetStore};
use self::oracle::UnsureLists;
use self::policies::{ReplacementPolicy, Touch, VictimQuery, lru_way};
use self::shadow::{ShadowOutcome, ShadowStore};
use crate::common::constants::{CLOCK_START, LRU_INSERT_TIME};
use crate::common::{AddrLayout, CacheError, Decomposed, Geometry, Slot, TenantId};
use crate::config::{CacheConfig, InsertPosition, ReplacementPolicy as PolicyType};
use crate::stats::CacheStats;

/// Largest number of tenants a cache can track.
pub const MAX_TENANTS: usize = TenantId::MAX as usize + 1;

/// Result of [`Cache::probe`].
#[derive(Debug)]
pub struct Probe<'a, T> {
    /// Line-base address of the probed address.
    pub line_addr: u64,
    /// Payload of the line on a hit, `None` on a miss.
    pub data: Option<&'a mut T>,
}

impl<T> Probe<'_, T> {
    /// Returns `true` if the line was found.
    pub const fn is_hit(&self) -> bool {
        self.data.is_some()
    }
}

/// Result of [`Cache::insert`] and its variants.
#[derive(Debug)]
pub struct Insertion<'a, T> {
    /// Line-base address of the inserted line.
    pub line_addr: u64,
    /// Line-base address of the valid line that was evicted, if any.
    pub victim: Option<u64>,
    /// Payload of the new line.
    ///
    /// Holds whatever the way held before (the victim's payload, or a fresh
    /// one); callers overwrite it.
    pub data: &'a mut T,
}

/// Result of [`Cache::peek_victim`].
#[derive(Debug)]
pub struct Victim<'a, T> {
    /// Line-base address held by the way that would be replaced.
    pub line_addr: u64,
    /// Whether that way currently holds a valid line.
    pub valid: bool,
    /// Whether that line was written since it was filled.
    pub dirty: bool,
    /// Payload of that way.
    pub data: &'a T,
}

/// Discipline-specific storage beside the line array.
#[derive(Debug)]
enum SideStore<T> {
    None,
    Oracle(UnsureLists<T>),
    Shadow(ShadowStore<T>),
    IdealStorage(IdealStorage<T>),
}

/// Factory for fresh payloads.
type PayloadFactory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A set-associative cache with a pluggable replacement discipline.
///
/// Every way owns a payload of type `T`. The engine is single-threaded and
/// synchronous; independent instances share no state.
pub struct Cache<T> {
    name: String,
    kind: PolicyType,
    layout: AddrLayout,
    line_bytes: usize,
    payload_bytes: usize,
    tenants: usize,
    store: SetStore<T>,
    policy: Box<dyn ReplacementPolicy>,
    side: SideStore<T>,
    fresh: PayloadFactory<T>,
    /// RRPV given to invalid lines (the distant value under SRRIP).
    invalid_rrpv: u8,
    clock: u64,
    demand_accesses: u64,
    stats: CacheStats,
}

/// Cache whose payloads are zeroed byte buffers of `payload_bytes` bytes.
pub type ByteCache = Cache<Box<[u8]>>;

impl ByteCache {
    /// Builds a cache whose payloads are `config.payload_bytes` zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (see [`Cache::with_payload`]).
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        let bytes = config.payload_bytes;
        Self::with_payload(config, move || vec![0u8; bytes].into_boxed_slice())
    }
}

impl<T: Default + 'static> Cache<T> {
    /// Builds a cache whose payloads start as `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (see [`Cache::with_payload`]).
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::with_payload(config, T::default)
    }
}

impl<T> Cache<T> {
    /// Builds a cache, creating each payload with `fresh`.
    ///
    /// # Arguments
    ///
    /// * `config` - Geometry, discipline, and side-structure capacities.
    /// * `fresh` - Factory for payloads; called once per way at construction
    ///   and whenever the oracle demotes a line.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the associativity or line size is zero, the
    /// line size or set count is not a power of two, the size is not a whole
    /// number of sets, the tenant count is out of range, a side-structure
    /// capacity is zero, the partition quotas are inconsistent, or the RRPV
    /// width is unsupported.
    pub fn with_payload<F>(config: &CacheConfig, fresh: F) -> Result<Self, CacheError>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let sets = validate(config)?;
        let policy = policies::build(config, sets)?;
        let invalid_rrpv = if config.policy == PolicyType::Srrip {
            (1u8 << config.rrpv_bits) - 1
        } else {
            0
        };
        let geometry = Geometry::new(sets, config.ways);
        let store = SetStore::new(geometry, invalid_rrpv, &fresh);
        let side = match config.policy {
            PolicyType::Ideal => SideStore::Oracle(UnsureLists::new(sets, config.ways)),
            PolicyType::ShadowIdeal => {
                SideStore::Shadow(ShadowStore::new(sets, config.shadow_ways(), &fresh))
            }
            PolicyType::IdealStorage => SideStore::IdealStorage(IdealStorage::new(
                sets,
                config.ideal_storage_entries,
                config.ways,
                &fresh,
            )),
            _ => SideStore::None,
        };

        debug!(
            cache = %config.name,
            policy = %config.policy,
            sets,
            ways = config.ways,
            line_bytes = config.line_bytes,
            "cache initialized"
        );

        Ok(Self {
            name: config.name.clone(),
            kind: config.policy,
            layout: AddrLayout::new(sets, config.line_bytes),
            line_bytes: config.line_bytes,
            payload_bytes: config.payload_bytes,
            tenants: config.tenants,
            store,
            policy,
            side,
            fresh: Box::new(fresh),
            invalid_rrpv,
            clock: CLOCK_START,
            demand_accesses: 0,
            stats: CacheStats::default(),
        })
    }

    /// Cache name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active replacement discipline.
    pub const fn policy(&self) -> PolicyType {
        self.kind
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.store.geometry().sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.store.geometry().ways
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Configured payload size in bytes.
    pub const fn payload_bytes(&self) -> usize {
        self.payload_bytes
    }

    /// Number of tenants that may own lines.
    pub const fn tenants(&self) -> usize {
        self.tenants
    }

    /// Address decomposition parameters.
    pub const fn layout(&self) -> &AddrLayout {
        &self.layout
    }

    /// Splits `addr` into set index, tag, and line-base address.
    pub fn index(&self, addr: u64) -> Decomposed {
        self.layout.decompose(addr)
    }

    /// Line-base address of `addr`.
    pub fn line_addr(&self, addr: u64) -> u64 {
        self.layout.line_addr(addr)
    }

    /// Accumulated statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Clears the statistics without touching cache contents.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Probes that counted toward replacement order and hit.
    pub const fn demand_accesses(&self) -> u64 {
        self.demand_accesses
    }

    /// Current value of the logical clock.
    pub const fn now(&self) -> u64 {
        self.clock
    }

    #[inline]
    fn tick(&mut self) -> u64 {
        let now = self.clock;
        self.clock += 1;
        now
    }

    fn check_tenant(&self, tenant: TenantId) {
        assert!(
            usize::from(tenant) < self.tenants,
            "{}: tenant {} out of range (tenants {})",
            self.name,
            tenant,
            self.tenants
        );
    }

    /// Returns `true` if the authoritative store holds the line.
    fn holds(&self, d: Decomposed) -> bool {
        match &self.side {
            SideStore::IdealStorage(ring) => ring.contains(d.set, d.tag),
            SideStore::Oracle(lists) => {
                self.store.find(d.set, d.tag).is_some() || lists.contains(d.set, d.tag)
            }
            _ => self.store.find(d.set, d.tag).is_some(),
        }
    }

    /// Looks up `addr`.
    ///
    /// On a hit with `count_access` set, the line loses its prefetched flag
    /// and the discipline records the use. A primary miss is resolved against
    /// the unsure list (oracle) or the shadow array (shadow-ideal); under ideal
    /// storage the ring decides.
    ///
    /// # Arguments
    ///
    /// * `addr` - Any address within the line.
    /// * `count_access` - Whether the access updates replacement order.
    ///
    /// # Returns
    ///
    /// The line-base address and, on a hit, the line's payload.
    pub fn probe(&mut self, addr: u64, count_access: bool) -> Probe<'_, T> {
        let d = self.layout.decompose(addr);
        let now = self.tick();
        self.stats.probes += 1;

        if matches!(self.side, SideStore::IdealStorage(_)) {
            return self.probe_ring(d, count_access, now);
        }

        let way = match self.store.find(d.set, d.tag) {
            Some(way) => {
                if count_access {
                    self.touch_hit(d.set, way, now);
                }
                Some(way)
            }
            None => self.resolve_miss(d, now),
        };

        match way {
            Some(way) => {
                self.stats.hits += 1;
                if count_access {
                    self.stats.demand_hits += 1;
                }
                trace!(
                    cache = %self.name,
                    set = d.set,
                    way,
                    addr = format_args!("{:#x}", d.line_addr),
                    "hit"
                );
                Probe {
                    line_addr: d.line_addr,
                    data: Some(self.store.data_mut(Slot::new(d.set, way))),
                }
            }
            None => {
                self.stats.misses += 1;
                trace!(
                    cache = %self.name,
                    set = d.set,
                    addr = format_args!("{:#x}", d.line_addr),
                    "miss"
                );
                Probe {
                    line_addr: d.line_addr,
                    data: None,
                }
            }
        }
    }

    fn touch_hit(&mut self, set: usize, way: usize, now: u64) {
        let lines = self.store.set_mut(set);
        lines[way].prefetched = false;
        self.demand_accesses += 1;
        self.policy.touch(set, way, lines, now, Touch::Hit);
    }

    /// Resolves a primary miss against the discipline's side structure.
    fn resolve_miss(&mut self, d: Decomposed, now: u64) -> Option<usize> {
        match &mut self.side {
            SideStore::Oracle(lists) => {
                let way = lists.promote(&mut self.store, d.set, d.tag, now)?;
                self.stats.unsure_promotions += 1;
                debug!(
                    cache = %self.name,
                    set = d.set,
                    way,
                    sure = lists.sure_count(d.set),
                    "unsure line promoted"
                );
                Some(way)
            }
            SideStore::Shadow(shadow) => {
                match shadow.resolve_miss(&mut self.store, d.set, d.tag, now) {
                    ShadowOutcome::Promoted(way) => {
                        self.stats.shadow_promotions += 1;
                        debug!(cache = %self.name, set = d.set, way, "shadow line swapped in");
                        Some(way)
                    }
                    ShadowOutcome::Discarded => {
                        self.stats.shadow_discards += 1;
                        debug!(
                            cache = %self.name,
                            set = d.set,
                            "shadow line older than lru, dropped"
                        );
                        None
                    }
                    ShadowOutcome::Absent => None,
                }
            }
            _ => None,
        }
    }

    fn probe_ring(&mut self, d: Decomposed, count_access: bool, now: u64) -> Probe<'_, T> {
        if let Some(way) = self.store.find(d.set, d.tag) {
            self.store.line_mut(Slot::new(d.set, way)).last_access = now;
        }
        let SideStore::IdealStorage(ring) = &mut self.side else {
            unreachable!("{}: ring probe without a ring", self.name);
        };
        match ring.lookup(d.set, d.tag) {
            Some(hit) => {
                self.stats.hits += 1;
                self.stats.ideal_storage_hits += 1;
                if count_access {
                    self.stats.demand_hits += 1;
                }
                if hit.dropped > 0 {
                    debug!(
                        cache = %self.name,
                        set = d.set,
                        dropped = hit.dropped,
                        "ideal storage entries expired"
                    );
                }
                Probe {
                    line_addr: d.line_addr,
                    data: Some(ring.data_mut(d.set, hit.slot)),
                }
            }
            None => {
                self.stats.misses += 1;
                Probe {
                    line_addr: d.line_addr,
                    data: None,
                }
            }
        }
    }

    /// Inserts the line of `addr` with the discipline's default recency.
    ///
    /// Must only be called after a probe of the same address missed.
    ///
    /// # Panics
    ///
    /// Panics if `tenant` is out of range, or on a discipline contract
    /// violation (inconsistent partition quotas, oracle bookkeeping mismatch).
    pub fn insert(&mut self, tenant: TenantId, addr: u64, prefetch: bool) -> Insertion<'_, T> {
        self.insert_at(tenant, addr, InsertPosition::Default, prefetch)
    }

    /// Inserts the line of `addr` as the least recently used line of its set.
    ///
    /// # Panics
    ///
    /// See [`Cache::insert`].
    pub fn insert_lru(&mut self, tenant: TenantId, addr: u64) -> Insertion<'_, T> {
        self.insert_at(tenant, addr, InsertPosition::Lru, false)
    }

    /// Inserts the line of `addr` at the given recency position.
    ///
    /// # Arguments
    ///
    /// * `tenant` - Owner of the new line.
    /// * `addr` - Any address within the line.
    /// * `position` - Recency given to the new line.
    /// * `prefetch` - Whether the line is brought in by a prefetch.
    ///
    /// # Returns
    ///
    /// The new line's payload, its line-base address, and the line-base
    /// address of the evicted line if a valid one was displaced. The oracle
    /// discipline never reports a victim.
    ///
    /// # Panics
    ///
    /// See [`Cache::insert`].
    pub fn insert_at(
        &mut self,
        tenant: TenantId,
        addr: u64,
        position: InsertPosition,
        prefetch: bool,
    ) -> Insertion<'_, T> {
        self.check_tenant(tenant);
        let d = self.layout.decompose(addr);
        assert!(
            !self.holds(d),
            "{}: insert of {:#x} which is already present",
            self.name,
            d.line_addr
        );
        let now = self.tick();
        self.stats.inserts += 1;

        if matches!(self.side, SideStore::IdealStorage(_)) {
            return self.insert_ring(tenant, d, prefetch, now);
        }

        let (way, victim) = if let SideStore::Oracle(lists) = &mut self.side {
            let placement = lists.place(&mut self.store, d.set, &*self.fresh);
            if placement.demoted > 0 {
                self.stats.oracle_demotions += placement.demoted as u64;
                debug!(
                    cache = %self.name,
                    set = d.set,
                    demoted = placement.demoted,
                    "sure lines demoted"
                );
            }
            (placement.way, None)
        } else {
            let way = self.policy.find_victim(VictimQuery {
                set: d.set,
                tenant,
                lines: self.store.set(d.set),
            });
            let slot = Slot::new(d.set, way);
            let old = self.store.line(slot);
            let victim = old.valid.then_some(old.base);
            if victim.is_some() {
                self.stats.evictions += 1;
                if let SideStore::Shadow(shadow) = &mut self.side {
                    let (line, data) = self.store.entry_mut(slot);
                    let _ = shadow.absorb(d.set, line, data, now);
                }
            }
            self.policy.before_fill(d.set, way, self.store.set_mut(d.set));
            (way, victim)
        };

        let line = self.store.line_mut(Slot::new(d.set, way));
        *line = Line {
            valid: true,
            tenant,
            tag: d.tag,
            base: d.line_addr,
            last_access: now,
            inserted: now,
            prefetched: prefetch,
            dirty: false,
            rrpv: line.rrpv,
        };
        self.apply_position(d.set, way, position, now);

        match victim {
            Some(victim) => debug!(
                cache = %self.name,
                set = d.set,
                way,
                victim = format_args!("{victim:#x}"),
                addr = format_args!("{:#x}", d.line_addr),
                "replaced"
            ),
            None => trace!(
                cache = %self.name,
                set = d.set,
                way,
                addr = format_args!("{:#x}", d.line_addr),
                "filled"
            ),
        }

        Insertion {
            line_addr: d.line_addr,
            victim,
            data: self.store.data_mut(Slot::new(d.set, way)),
        }
    }

    /// Gives a just-filled way its recency under `position`.
    fn apply_position(&mut self, set: usize, way: usize, position: InsertPosition, now: u64) {
        let srrip = self.kind == PolicyType::Srrip;
        let max_rrpv = self.invalid_rrpv;
        let lines = self.store.set_mut(set);
        match position {
            InsertPosition::Default => {
                self.policy.touch(set, way, lines, now, Touch::Fill);
                return;
            }
            InsertPosition::Lru | InsertPosition::Srrip => lines[way].last_access = LRU_INSERT_TIME,
            InsertPosition::Mru => lines[way].last_access = now,
            InsertPosition::Mid | InsertPosition::LowQuarter => {
                let mut times: Vec<u64> = lines
                    .iter()
                    .map(|line| if line.valid { line.last_access } else { 0 })
                    .collect();
                times.sort_unstable();
                let rank = if position == InsertPosition::Mid {
                    times.len() / 2
                } else {
                    times.len() / 4
                };
                let time = times[rank];
                lines[way].last_access = if time == 0 { now } else { time };
            }
        }
        if srrip {
            lines[way].rrpv = match position {
                InsertPosition::Lru => max_rrpv,
                InsertPosition::Mru => 0,
                _ => max_rrpv.saturating_sub(1),
            };
        }
    }

    fn insert_ring(
        &mut self,
        tenant: TenantId,
        d: Decomposed,
        prefetch: bool,
        now: u64,
    ) -> Insertion<'_, T> {
        let SideStore::IdealStorage(ring) = &mut self.side else {
            unreachable!("{}: ring insert without a ring", self.name);
        };
        let (slot, victim) = ring.push(d.set, d.tag, d.line_addr, tenant, now);
        if victim.is_some() {
            self.stats.evictions += 1;
        }

        let way = match self.store.find(d.set, d.tag) {
            Some(way) => way,
            None => {
                let way = lru_way(self.store.set(d.set));
                *self.store.line_mut(Slot::new(d.set, way)) = Line {
                    valid: true,
                    tenant,
                    tag: d.tag,
                    base: d.line_addr,
                    inserted: now,
                    prefetched: prefetch,
                    ..Line::default()
                };
                way
            }
        };
        self.store.line_mut(Slot::new(d.set, way)).last_access = now;
        trace!(
            cache = %self.name,
            set = d.set,
            slot,
            way,
            addr = format_args!("{:#x}", d.line_addr),
            "ring push"
        );

        Insertion {
            line_addr: d.line_addr,
            victim,
            data: ring.data_mut(d.set, slot),
        }
    }

    /// Invalidates the line of `addr`, including any unsure, shadow, or ring
    /// copy. A no-op if the line is absent.
    pub fn invalidate(&mut self, addr: u64) {
        let d = self.layout.decompose(addr);
        let mut removed = false;
        if let Some(way) = self.store.find(d.set, d.tag) {
            let line = self.store.line_mut(Slot::new(d.set, way));
            line.invalidate();
            line.rrpv = self.invalid_rrpv;
            removed = true;
            if let SideStore::Oracle(lists) = &mut self.side {
                lists.release(d.set);
            }
        }
        removed |= match &mut self.side {
            SideStore::None => false,
            SideStore::Oracle(lists) => lists.forget(d.set, d.tag),
            SideStore::Shadow(shadow) => shadow.forget(d.set, d.tag),
            SideStore::IdealStorage(ring) => ring.forget(d.set, d.tag),
        };
        if removed {
            self.stats.invalidations += 1;
            trace!(
                cache = %self.name,
                set = d.set,
                addr = format_args!("{:#x}", d.line_addr),
                "invalidated"
            );
        }
    }

    /// Returns the way the next insert of `addr` by `tenant` would replace,
    /// without changing any state.
    ///
    /// # Panics
    ///
    /// Panics under the oracle discipline, which has no direct victim.
    pub fn peek_victim(&self, tenant: TenantId, addr: u64) -> Victim<'_, T> {
        let d = self.layout.decompose(addr);
        if let SideStore::IdealStorage(ring) = &self.side {
            let (line, data) = ring.next_victim(d.set);
            return Victim {
                line_addr: line.base,
                valid: line.valid,
                dirty: line.dirty,
                data,
            };
        }
        let way = self.policy.find_victim(VictimQuery {
            set: d.set,
            tenant,
            lines: self.store.set(d.set),
        });
        let slot = Slot::new(d.set, way);
        let line = self.store.line(slot);
        Victim {
            line_addr: line.base,
            valid: line.valid,
            dirty: line.dirty,
            data: self.store.data(slot),
        }
    }

    /// Position of the line of `addr` in its tenant's recency stack.
    ///
    /// Zero is the most recently used line of that tenant in the set.
    /// Returns `None` if the line is absent.
    ///
    /// # Panics
    ///
    /// Panics if the line is owned by a tenant other than `tenant`.
    pub fn lru_stack_position(&self, tenant: TenantId, addr: u64) -> Option<usize> {
        let d = self.layout.decompose(addr);
        let way = self.store.find(d.set, d.tag)?;
        let lines = self.store.set(d.set);
        let hit = &lines[way];
        assert_eq!(
            hit.tenant, tenant,
            "{}: line {:#x} belongs to tenant {}",
            self.name, d.line_addr, hit.tenant
        );
        Some(
            lines
                .iter()
                .filter(|line| {
                    line.valid && line.tenant == hit.tenant && line.last_access > hit.last_access
                })
                .count(),
        )
    }

    /// Sets the dirty flag of the line of `addr`; returns `false` if absent.
    ///
    /// Under ideal storage the flag lives on the ring entry, which decides
    /// hits and victims.
    pub fn mark_dirty(&mut self, addr: u64) -> bool {
        let d = self.layout.decompose(addr);
        if let SideStore::IdealStorage(ring) = &mut self.side {
            return ring.mark_dirty(d.set, d.tag);
        }
        match self.store.find(d.set, d.tag) {
            Some(way) => {
                self.store.line_mut(Slot::new(d.set, way)).dirty = true;
                true
            }
            None => false,
        }
    }

    /// Invalidates every way and clears all side structures and discipline
    /// pointers. Storage is kept; statistics are not cleared.
    pub fn reset(&mut self) {
        self.store.invalidate_all(self.invalid_rrpv);
        self.policy.reset();
        match &mut self.side {
            SideStore::None => {}
            SideStore::Oracle(lists) => lists.clear(),
            SideStore::Shadow(shadow) => shadow.clear(),
            SideStore::IdealStorage(ring) => ring.clear(),
        }
        debug!(cache = %self.name, "cache reset");
    }

    /// Resets the cache and returns the line-base addresses of the lines that
    /// were dirty, in set/way order.
    pub fn flush(&mut self) -> Vec<u64> {
        let store = match &self.side {
            SideStore::IdealStorage(ring) => ring.slots(),
            _ => &self.store,
        };
        let dirty: Vec<u64> = store
            .valid_lines()
            .filter(|line| line.dirty)
            .map(|line| line.base)
            .collect();
        self.reset();
        dirty
    }

    /// Metadata of every way in `set`.
    pub fn lines(&self, set: usize) -> &[Line] {
        self.store.set(set)
    }

    /// Number of valid ways in `set`.
    pub fn valid_ways(&self, set: usize) -> usize {
        self.store.valid_count(set)
    }

    /// Number of valid ways in `set` owned by `tenant`.
    pub fn occupancy(&self, set: usize, tenant: TenantId) -> usize {
        self.store
            .set(set)
            .iter()
            .filter(|line| line.valid && line.tenant == tenant)
            .count()
    }

    /// Lines waiting in the unsure list of `set`; zero unless oracle.
    pub fn unsure_len(&self, set: usize) -> usize {
        match &self.side {
            SideStore::Oracle(lists) => lists.unsure_len(set),
            _ => 0,
        }
    }

    /// Sure count of `set` under the oracle discipline.
    pub fn sure_count(&self, set: usize) -> Option<usize> {
        match &self.side {
            SideStore::Oracle(lists) => Some(lists.sure_count(set)),
            _ => None,
        }
    }

    /// Returns `true` if the shadow array holds the line of `addr`.
    pub fn shadow_holds(&self, addr: u64) -> bool {
        let d = self.layout.decompose(addr);
        matches!(&self.side, SideStore::Shadow(shadow) if shadow.contains(d.set, d.tag))
    }

    /// Returns `true` if the ideal-storage ring holds the line of `addr`.
    pub fn ring_holds(&self, addr: u64) -> bool {
        let d = self.layout.decompose(addr);
        matches!(&self.side, SideStore::IdealStorage(ring) if ring.contains(d.set, d.tag))
    }

    /// Changes the number of ways allocated to `tenant`.
    ///
    /// The quotas must sum to the associativity again before the next insert.
    ///
    /// # Panics
    ///
    /// Panics if the discipline is not partition-based or `tenant` is out of range.
    pub fn set_partition_quota(&mut self, tenant: TenantId, ways: usize) {
        self.check_tenant(tenant);
        let Some(partition) = self.policy.as_partition_mut() else {
            panic!("{}: partition quota set on a {} cache", self.name, self.kind);
        };
        partition.set_quota(tenant, ways);
        debug!(cache = %self.name, tenant, ways, "partition quota changed");
    }

    /// Number of ways allocated to `tenant`.
    ///
    /// # Panics
    ///
    /// Panics if the discipline is not partition-based or `tenant` is out of range.
    pub fn partition_quota(&self, tenant: TenantId) -> usize {
        self.check_tenant(tenant);
        let Some(partition) = self.policy.as_partition() else {
            panic!("{}: partition quota read on a {} cache", self.name, self.kind);
        };
        partition.quota(tenant)
    }
}

impl<T> std::fmt::Debug for Cache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("policy", &self.kind)
            .field("sets", &self.sets())
            .field("ways", &self.ways())
            .field("line_bytes", &self.line_bytes)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Checks the geometry of `config` and returns the set count.
fn validate(config: &CacheConfig) -> Result<usize, CacheError> {
    let name = || config.name.clone();
    if config.ways == 0 {
        return Err(CacheError::ZeroWays { name: name() });
    }
    if !config.line_bytes.is_power_of_two() {
        return Err(CacheError::LineSize {
            name: name(),
            line_bytes: config.line_bytes,
        });
    }
    let set_bytes = config.line_bytes * config.ways;
    if config.size_bytes % set_bytes != 0 {
        return Err(CacheError::SizeNotDivisible {
            name: name(),
            size_bytes: config.size_bytes,
            line_bytes: config.line_bytes,
            ways: config.ways,
        });
    }
    let sets = config.size_bytes / set_bytes;
    if !sets.is_power_of_two() {
        return Err(CacheError::SetCount { name: name(), sets });
    }
    if config.tenants == 0 || config.tenants > MAX_TENANTS {
        return Err(CacheError::Tenants {
            name: name(),
            tenants: config.tenants,
            max: MAX_TENANTS,
        });
    }
    if config.policy == PolicyType::ShadowIdeal && config.shadow_ways() == 0 {
        return Err(CacheError::Capacity {
            name: name(),
            what: "shadow_ways",
        });
    }
    if config.policy == PolicyType::IdealStorage && config.ideal_storage_entries == 0 {
        return Err(CacheError::Capacity {
            name: name(),
            what: "ideal_storage_entries",
        });
    }
    Ok(sets)
}
