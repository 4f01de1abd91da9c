//! Cache simulator CLI.
//!
//! This binary replays memory access traces against one configured cache. It performs:
//! 1. **Run:** Load a JSON cache configuration and a text trace, replay it with
//!    probe-then-insert, and print the cache statistics as text or JSON.
//! 2. **Policies:** List the replacement disciplines a configuration may name.
//!
//! Engine events are logged through `tracing`; set `RUST_LOG=cachesim_core=debug`
//! to see replacements, or `trace` for every hit and miss.

mod trace;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cachesim_core::config::ReplacementPolicy;
use cachesim_core::stats::CacheStats;
use cachesim_core::{ByteCache, CacheConfig};

use crate::trace::ReplaySummary;

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Set-associative cache simulator",
    long_about = "Replay a memory access trace against a configured cache and report hit/miss statistics.\n\nExamples:\n  cachesim run --config l2.json --trace app.trace\n  cachesim run -c llc.json -t app.trace --warmup 100000 --json\n  cachesim policies"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace against one cache.
    Run {
        /// Cache configuration (JSON).
        #[arg(short, long)]
        config: PathBuf,

        /// Trace file: one '<tenant> <addr> [R|W|P|I]' per line.
        #[arg(short, long)]
        trace: PathBuf,

        /// Operations replayed before statistics are cleared.
        #[arg(long, default_value_t = 0)]
        warmup: usize,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the replacement disciplines.
    Policies,
}

/// JSON report of a run.
#[derive(Debug, Serialize)]
struct Report<'a> {
    config: &'a CacheConfig,
    replay: &'a ReplaySummary,
    stats: &'a CacheStats,
    hit_rate: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            config,
            trace,
            warmup,
            json,
        } => cmd_run(&config, &trace, warmup, json),
        Commands::Policies => {
            cmd_policies();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

/// Loads a cache configuration from a JSON file.
fn load_config(path: &Path) -> Result<CacheConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    CacheConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Builds the cache, replays the trace, and prints the report.
fn cmd_run(config_path: &Path, trace_path: &Path, warmup: usize, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let mut cache = ByteCache::from_config(&config)?;

    let file = File::open(trace_path)
        .with_context(|| format!("failed to open trace {}", trace_path.display()))?;
    let ops = trace::read_trace(BufReader::new(file))
        .with_context(|| format!("failed to parse trace {}", trace_path.display()))?;
    if let Some(op) = ops.iter().find(|op| usize::from(op.tenant) >= cache.tenants()) {
        bail!(
            "trace uses tenant {} but cache '{}' has {} tenant(s)",
            op.tenant,
            cache.name(),
            cache.tenants()
        );
    }
    info!(
        cache = %config.name,
        policy = %config.policy,
        ops = ops.len(),
        warmup,
        "replaying trace"
    );

    let summary = trace::replay(&mut cache, &ops, warmup);

    if json {
        let report = Report {
            config: &config,
            replay: &summary,
            stats: cache.stats(),
            hit_rate: cache.stats().hit_rate(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} ({}): {} sets x {} ways, {} B lines",
            cache.name(),
            cache.policy(),
            cache.sets(),
            cache.ways(),
            cache.line_bytes()
        );
        println!(
            "replayed {} ops ({} warm-up), {} demand misses, {} prefetch fills, {} writebacks",
            summary.ops,
            summary.warmup,
            summary.demand_misses,
            summary.prefetch_fills,
            summary.writebacks
        );
        cache.stats().print(cache.name());
    }
    Ok(())
}

/// Prints every discipline with its configuration spelling.
fn cmd_policies() {
    for policy in ReplacementPolicy::ALL {
        let spelling = serde_json::to_string(&policy).unwrap_or_default();
        let note = if policy.has_direct_victim() {
            ""
        } else {
            "  (probe before every insert)"
        };
        println!("  {:<16} {}{}", policy.name(), spelling, note);
    }
}
