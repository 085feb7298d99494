//! # memshard
//!
//! The in-memory write buffer ("memtable") of a log-structured key-value
//! engine, built as a sharded hash table:
//! - Fixed number of partitions, each behind its own reader/writer lock
//! - Chained buckets with incremental resize (one bucket migrated per write)
//! - Sequence-number arbitration between writes to the same key
//! - Tombstoning and unlinking delete paths
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Storage Engine (external)                    │
//! │          WAL · sequence allocation · flush to runs           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ get / put / remove / contains_key / size
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       MemTable                               │
//! │            hash(key) ─► top bits ─► partition                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼────────────┬─────────────┐
//!          ▼            ▼            ▼             ▼
//!   ┌─────────────┐ ┌─────────┐ ┌─────────┐  ┌─────────────┐
//!   │ Partition 0 │ │   P1    │ │   ...   │  │  P(N - 1)   │
//!   │  (RwLock)   │ │(RwLock) │ │         │  │  (RwLock)   │
//!   └─────────────┘ └─────────┘ └─────────┘  └─────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use memshard::{MemTable, ValuePointer};
//!
//! let table = MemTable::new();
//! let p1 = ValuePointer::new(0, 0, 16);
//!
//! assert_eq!(table.put(b"a".to_vec(), 1, Some(p1)), (None, true));
//! assert_eq!(table.get(b"a"), (Some(p1), 1));
//!
//! // Older writes lose
//! let stale = ValuePointer::new(0, 16, 16);
//! assert_eq!(table.put(b"a".to_vec(), 0, Some(stale)), (Some(stale), false));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod memtable;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MemShardError, Result};
pub use config::{Config, ConfigBuilder};
pub use memtable::{MemTable, MemTableStats, PartitionStats, ResizePhase, ValuePointer};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memshard
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
