//! Memory access traces.
//!
//! A trace is a text file with one access per line:
//!
//! ```text
//! # tenant  address   kind
//! 0         0x1000    R
//! 1         4096      W
//! 0         0x2040    P
//! 0         0x1000    I
//! ```
//!
//! The address is hexadecimal with a `0x` prefix or decimal. The kind is
//! optional and defaults to a read. `#` starts a comment; blank lines are
//! skipped.

use std::io::BufRead;

use anyhow::{Context, Result, bail};
use cachesim_core::Cache;
use cachesim_core::common::TenantId;
use cachesim_core::config::InsertPosition;
use serde::Serialize;

/// What a trace line asks of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Demand load: probe, insert on a miss.
    Read,
    /// Demand store: as a read, then the line is marked dirty.
    Write,
    /// Prefetch: insert at the LRU position if absent, without counting the access.
    Prefetch,
    /// Invalidation of the line.
    Invalidate,
}

/// One parsed trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceOp {
    /// Requesting tenant.
    pub tenant: TenantId,
    /// Accessed address.
    pub addr: u64,
    /// Access kind.
    pub kind: AccessKind,
}

fn parse_addr(text: &str) -> Result<u64> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("invalid address '{text}'"))
}

/// Parses one trace line; `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns an error if a field is malformed or there are too many fields.
pub fn parse_line(line: &str) -> Result<Option<TraceOp>> {
    let content = line.split('#').next().unwrap_or_default().trim();
    if content.is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = content.split_whitespace().collect();
    let (tenant, addr, kind) = match fields.as_slice() {
        [tenant, addr] => (tenant, addr, "R"),
        [tenant, addr, kind] => (tenant, addr, *kind),
        _ => bail!("expected '<tenant> <addr> [R|W|P|I]', got '{content}'"),
    };
    let tenant: TenantId = tenant
        .parse()
        .with_context(|| format!("invalid tenant '{tenant}'"))?;
    let kind = match kind.to_ascii_uppercase().as_str() {
        "R" => AccessKind::Read,
        "W" => AccessKind::Write,
        "P" => AccessKind::Prefetch,
        "I" => AccessKind::Invalidate,
        other => bail!("unknown access kind '{other}'"),
    };
    Ok(Some(TraceOp {
        tenant,
        addr: parse_addr(addr)?,
        kind,
    }))
}

/// Reads every access from `reader`.
///
/// # Errors
///
/// Returns an error on I/O failure or on the first malformed line, naming its
/// line number.
pub fn read_trace(reader: impl BufRead) -> Result<Vec<TraceOp>> {
    let mut ops = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("failed to read trace")?;
        if let Some(op) = parse_line(&line).with_context(|| format!("trace line {}", idx + 1))? {
            ops.push(op);
        }
    }
    Ok(ops)
}

/// Totals of a replay, independent of the cache's own statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Trace operations applied, warm-up included.
    pub ops: u64,
    /// Operations applied before statistics were cleared.
    pub warmup: u64,
    /// Demand accesses that missed after warm-up.
    pub demand_misses: u64,
    /// Prefetches that brought in a new line after warm-up.
    pub prefetch_fills: u64,
    /// Evictions of dirty lines after warm-up.
    pub writebacks: u64,
}

/// Replays `ops` against `cache` with probe-then-insert.
///
/// Statistics of the cache are cleared after the first `warmup` operations.
pub fn replay<T>(cache: &mut Cache<T>, ops: &[TraceOp], warmup: usize) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (idx, op) in ops.iter().enumerate() {
        if idx == warmup && warmup > 0 {
            cache.reset_stats();
            summary = ReplaySummary {
                warmup: warmup as u64,
                ops: summary.ops,
                ..ReplaySummary::default()
            };
        }
        summary.ops += 1;
        match op.kind {
            AccessKind::Invalidate => cache.invalidate(op.addr),
            AccessKind::Prefetch => {
                if !cache.probe(op.addr, false).is_hit() {
                    let dirty = dirty_victim(cache, op.tenant, op.addr);
                    let _ = cache.insert_at(op.tenant, op.addr, InsertPosition::Lru, true);
                    summary.prefetch_fills += 1;
                    summary.writebacks += u64::from(dirty);
                }
            }
            AccessKind::Read | AccessKind::Write => {
                if !cache.probe(op.addr, true).is_hit() {
                    let dirty = dirty_victim(cache, op.tenant, op.addr);
                    let _ = cache.insert(op.tenant, op.addr, false);
                    summary.demand_misses += 1;
                    summary.writebacks += u64::from(dirty);
                }
                if op.kind == AccessKind::Write {
                    let _ = cache.mark_dirty(op.addr);
                }
            }
        }
    }
    summary
}

/// Whether the next insert of `addr` would evict a dirty line.
fn dirty_victim<T>(cache: &Cache<T>, tenant: TenantId, addr: u64) -> bool {
    if !cache.policy().has_direct_victim() {
        return false;
    }
    let victim = cache.peek_victim(tenant, addr);
    victim.valid && victim.dirty
}
