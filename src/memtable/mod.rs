//! MemTable Module
//!
//! In-memory write buffer for recent writes, ahead of the flush to sorted runs.
//!
//! ## Responsibilities
//! - Fast point reads and writes in memory
//! - Sequence-number arbitration between writes to the same key
//! - Track live entry count for flush triggers
//!
//! ## Data Structure Choice
//! A fixed set of partitions, each a chained hash table behind its own
//! `RwLock`:
//! - Keys route to a partition by the top bits of their digest and to a
//!   bucket by the digest modulo the bucket count
//! - Chains live in a per-partition arena addressed by index
//! - Resizes migrate one bucket per write, so no caller pays for a full rehash
//!
//! ```text
//!   hash(key) ──┬── top bits ──► partition[p]  (RwLock)
//!               │                   │
//!               └── hash % len ─────┼──► active[b]   ──► e3 ─► e7 ─► ∅
//!                                   └──► incoming[b] ──► e1 ─► ∅   (resize only)
//! ```
//!
//! ## Deletion paths
//! `remove` leaves a tombstone: the entry stays linked with its value cleared
//! and still counts towards resize thresholds. `put` with `None` unlinks the
//! entry immediately. Both paths are kept as they are; callers choose.

mod hash;
mod partition;
mod stats;
mod table;

pub use hash::hash_key;
pub use stats::{MemTableStats, PartitionStats, ResizePhase};
pub use table::MemTable;

/// Location of a value in the external value log.
///
/// The memtable stores and returns it without interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValuePointer {
    /// Value log segment holding the value
    pub segment_id: u32,

    /// Byte offset of the value inside the segment
    pub offset: u64,

    /// Length of the value in bytes
    pub len: u32,
}

impl ValuePointer {
    pub fn new(segment_id: u32, offset: u64, len: u32) -> Self {
        Self {
            segment_id,
            offset,
            len,
        }
    }
}
