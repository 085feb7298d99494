//! MemTable implementation
//!
//! Fixed set of partitions, each behind its own `RwLock`.

use bytes::Bytes;
use parking_lot::RwLock;

use super::hash::{hash_key, partition_index};
use super::partition::Partition;
use super::stats::MemTableStats;
use super::ValuePointer;
use crate::config::Config;
use crate::error::Result;

/// In-memory table for recent writes
///
/// ## Concurrency
/// - Every key belongs to exactly one partition, chosen by the top bits of
///   its digest
/// - `get`/`contains_key` take that partition's lock shared, `put`/`remove`
///   take it exclusive
/// - No operation holds more than one partition lock, so operations on
///   different partitions never wait on each other
/// - `size`/`stats` read partitions one at a time: best-effort, not a
///   consistent snapshot
pub struct MemTable {
    config: Config,

    partitions: Box<[RwLock<Partition>]>,

    /// High-order digest bits that select a partition
    partition_bits: u32,
}

impl MemTable {
    /// Create a new empty MemTable with the default configuration
    pub fn new() -> Self {
        Self::build(Config::default())
    }

    /// Create a new empty MemTable, validating `config` first
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: Config) -> Self {
        let partitions = (0..config.partition_count)
            .map(|id| RwLock::new(Partition::new(id, &config)))
            .collect();
        let partition_bits = config.partition_bits();

        tracing::debug!(
            partitions = config.partition_count,
            initial_buckets = config.initial_bucket_count,
            "memtable created"
        );

        Self {
            config,
            partitions,
            partition_bits,
        }
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Get the value pointer and sequence number stored for `key` (read lock)
    ///
    /// Returns `(None, 0)` for an unknown key. A tombstoned key returns `None`
    /// with the sequence number of the last write that set a value.
    pub fn get(&self, key: &[u8]) -> (Option<ValuePointer>, u64) {
        let hash = hash_key(key);
        self.partition(hash).read().get(key, hash)
    }

    /// Write `value` for `key` at sequence number `seq` (write lock)
    ///
    /// The write applies when `seq` is at least the stored sequence number;
    /// ties go to the incoming write. Returns the replaced value pointer and
    /// `true`, or the caller's own `value` and `false` when rejected as stale.
    ///
    /// A `None` value deletes the key by unlinking it (see [`MemTable::remove`]
    /// for the tombstoning delete).
    pub fn put(
        &self,
        key: impl Into<Bytes>,
        seq: u64,
        value: Option<ValuePointer>,
    ) -> (Option<ValuePointer>, bool) {
        let key = key.into();
        let hash = hash_key(&key);
        self.partition(hash).write().put(key, hash, seq, value)
    }

    /// Tombstone `key` at sequence number `seq` (write lock)
    ///
    /// The entry stays in place with its value cleared; only a later
    /// `put(key, _, None)` unlinks it. Returns the cleared value pointer, or
    /// `None` if the key is unknown, already tombstoned, or `seq` is stale.
    pub fn remove(&self, key: &[u8], seq: u64) -> Option<ValuePointer> {
        let hash = hash_key(key);
        self.partition(hash).write().remove(key, hash, seq)
    }

    /// Check whether `key` holds a live value (read lock)
    pub fn contains_key(&self, key: &[u8]) -> bool {
        let hash = hash_key(key);
        self.partition(hash).read().contains_key(key, hash)
    }

    // =========================================================================
    // Size Tracking
    // =========================================================================

    /// Number of live (non-tombstoned) entries, summed partition by partition
    pub fn size(&self) -> usize {
        self.partitions.iter().map(|p| p.read().live_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Check if the live entry count reached the configured flush threshold
    pub fn should_flush(&self) -> bool {
        self.size() >= self.config.flush_threshold
    }

    /// Per-partition counters and resize phases
    pub fn stats(&self) -> MemTableStats {
        MemTableStats {
            partitions: self.partitions.iter().map(|p| p.read().stats()).collect(),
        }
    }

    // =========================================================================
    // Routing
    // =========================================================================

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Index of the partition that owns `key`
    pub fn partition_of(&self, key: &[u8]) -> usize {
        partition_index(hash_key(key), self.partition_bits)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn partition(&self, hash: u32) -> &RwLock<Partition> {
        &self.partitions[partition_index(hash, self.partition_bits)]
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
