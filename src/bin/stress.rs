//! memshard Stress Binary
//!
//! Hammers a single MemTable from many threads and reports throughput.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use clap::Parser;
use memshard::{Config, MemTable, ValuePointer};
use tracing_subscriber::{fmt, EnvFilter};

/// memshard load generator
#[derive(Parser, Debug)]
#[command(name = "memshard-stress")]
#[command(about = "Concurrent load generator for the memshard memtable")]
#[command(version)]
struct Args {
    /// Worker threads
    #[arg(short, long, default_value = "8")]
    threads: usize,

    /// Operations per thread
    #[arg(short, long, default_value = "200000")]
    ops: u64,

    /// Size of the shared key space
    #[arg(short, long, default_value = "100000")]
    keys: u64,

    /// Number of partitions (power of two)
    #[arg(short, long, default_value = "16")]
    partitions: usize,

    /// Percentage of writes that are removes
    #[arg(short, long, default_value = "10")]
    remove_ratio: u64,
}

/// Per-worker tallies
#[derive(Debug, Default)]
struct Tally {
    puts: u64,
    stale: u64,
    removes: u64,
    hits: u64,
    misses: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,memshard=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("memshard stress v{}", memshard::VERSION);
    tracing::info!(
        threads = args.threads,
        ops = args.ops,
        keys = args.keys,
        partitions = args.partitions,
        "starting"
    );

    let config = Config::builder().partition_count(args.partitions).build();
    let table = match MemTable::with_config(config) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create memtable: {}", e);
            std::process::exit(1);
        }
    };

    // Shared sequence allocator, standing in for the engine's
    let next_seq = AtomicU64::new(1);
    let started = Instant::now();

    let result = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = (0..args.threads)
            .map(|worker| {
                let table = &table;
                let next_seq = &next_seq;
                let args = &args;
                s.spawn(move |_| run_worker(worker as u64, table, next_seq, args))
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join())
            .collect::<Result<Vec<_>, _>>()
    });

    let tallies = match result {
        Ok(Ok(tallies)) => tallies,
        _ => {
            tracing::error!("Worker thread panicked");
            std::process::exit(1);
        }
    };

    let elapsed = started.elapsed();
    let total = Tally {
        puts: tallies.iter().map(|t| t.puts).sum(),
        stale: tallies.iter().map(|t| t.stale).sum(),
        removes: tallies.iter().map(|t| t.removes).sum(),
        hits: tallies.iter().map(|t| t.hits).sum(),
        misses: tallies.iter().map(|t| t.misses).sum(),
    };
    let ops = args.ops * args.threads as u64;
    let ops_per_sec = ops as f64 / elapsed.as_secs_f64();

    tracing::info!(?total, elapsed_ms = elapsed.as_millis() as u64, ops_per_sec, "finished");

    let stats = table.stats();
    tracing::info!(
        live = stats.live_entries(),
        nodes = stats.nodes(),
        tombstones = stats.tombstones(),
        buckets = stats.buckets(),
        resizing = stats.resizing(),
        "final table state"
    );
}

/// Mixed workload: half reads, the rest puts and removes on a shared key space
fn run_worker(worker: u64, table: &MemTable, next_seq: &AtomicU64, args: &Args) -> Tally {
    let mut tally = Tally::default();
    // xorshift; a per-worker stream is all the workload needs
    let mut state = 0x9E37_79B9_7F4A_7C15u64 ^ (worker + 1);

    for _ in 0..args.ops {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;

        let key = format!("key-{:010}", state % args.keys.max(1)).into_bytes();
        let roll = (state >> 32) % 100;

        if roll < 50 {
            if table.contains_key(&key) {
                tally.hits += 1;
            } else {
                tally.misses += 1;
            }
        } else if roll < 50 + args.remove_ratio / 2 {
            let seq = next_seq.fetch_add(1, Ordering::Relaxed);
            table.remove(&key, seq);
            tally.removes += 1;
        } else {
            let seq = next_seq.fetch_add(1, Ordering::Relaxed);
            let ptr = ValuePointer::new(worker as u32, seq, key.len() as u32);
            let (_, applied) = table.put(key, seq, Some(ptr));
            tally.puts += 1;
            if !applied {
                tally.stale += 1;
            }
        }
    }

    tally
}
