//! Partition
//!
//! A single chained hash table with incremental resize and sequence-number
//! gated mutation. Callers hold the owning `RwLock` (shared for `get`,
//! exclusive for `put`/`remove`); nothing in here synchronizes on its own.
//!
//! ## Layout
//! Entries live in an arena (`entries`) and chains are threaded through it by
//! index. A bucket holds the index of its chain head, an entry holds the index
//! of its successor, and `NIL` ends a chain. Unlinked slots go on a free list.
//!
//! ## Incremental resize
//! ```text
//!   active:   [ ∅ | ∅ | ∅ | b3 | b4 | ... ]      cursor = 3
//!                 migrated    not yet migrated
//!   incoming: [ ... 2x or 1/2x buckets ... ]
//! ```
//! Every write migrates the bucket under the cursor before doing its own work.
//! When the cursor passes the last bucket, `incoming` replaces `active`.
//! A key is linked in exactly one of the two arrays at any time.

use bytes::Bytes;

use super::hash::bucket_index;
use super::stats::{PartitionStats, ResizePhase};
use super::ValuePointer;
use crate::config::Config;

/// End-of-chain marker
const NIL: usize = usize::MAX;

/// A partition shrinks once `nodes < buckets / SHRINK_DIVISOR`
const SHRINK_DIVISOR: usize = 4;

/// One record in a bucket chain
#[derive(Debug)]
struct Entry {
    /// Sequence number of the last write applied to this key
    seq: u64,
    /// Cached digest; migration re-buckets without rehashing the key
    hash: u32,
    key: Bytes,
    /// `None` marks a tombstone
    value: Option<ValuePointer>,
    next: usize,
}

/// Which bucket array an entry was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Array {
    Active,
    Incoming,
}

/// Result of a chain lookup
#[derive(Debug, Clone, Copy)]
struct Slot {
    array: Array,
    /// Predecessor in the chain, or `NIL` when the entry is the head
    prev: usize,
    index: usize,
}

/// An in-flight migration from `active` into `incoming`
#[derive(Debug)]
struct Migration {
    incoming: Vec<usize>,
    /// Next bucket of `active` to migrate
    cursor: usize,
}

impl Migration {
    fn new(buckets: usize) -> Self {
        Self {
            incoming: vec![NIL; buckets],
            cursor: 0,
        }
    }
}

#[derive(Debug)]
enum ResizeState {
    Stable,
    Growing(Migration),
    Shrinking(Migration),
}

impl ResizeState {
    fn migration(&self) -> Option<&Migration> {
        match self {
            ResizeState::Stable => None,
            ResizeState::Growing(m) | ResizeState::Shrinking(m) => Some(m),
        }
    }

    fn migration_mut(&mut self) -> Option<&mut Migration> {
        match self {
            ResizeState::Stable => None,
            ResizeState::Growing(m) | ResizeState::Shrinking(m) => Some(m),
        }
    }

    fn into_migration(self) -> Option<Migration> {
        match self {
            ResizeState::Stable => None,
            ResizeState::Growing(m) | ResizeState::Shrinking(m) => Some(m),
        }
    }

    fn phase(&self) -> ResizePhase {
        match self {
            ResizeState::Stable => ResizePhase::Stable,
            ResizeState::Growing(_) => ResizePhase::Growing,
            ResizeState::Shrinking(_) => ResizePhase::Shrinking,
        }
    }
}

/// One independently-locked shard of the memtable
#[derive(Debug)]
pub(crate) struct Partition {
    /// Position in the owning table, for log context
    id: usize,

    entries: Vec<Entry>,
    free: Vec<usize>,

    active: Vec<usize>,
    resize: ResizeState,

    /// Entries holding a value
    live_count: usize,
    /// Linked entries, live or tombstoned; drives resize thresholds
    node_count: usize,

    min_nodes: usize,
    max_load_factor: usize,
}

impl Partition {
    pub(crate) fn new(id: usize, config: &Config) -> Self {
        Self {
            id,
            entries: Vec::new(),
            free: Vec::new(),
            active: vec![NIL; config.initial_bucket_count],
            resize: ResizeState::Stable,
            live_count: 0,
            node_count: 0,
            min_nodes: config.initial_bucket_count,
            max_load_factor: config.max_load_factor,
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Current value pointer and sequence number of `key`.
    ///
    /// A tombstoned key yields `(None, seq)`; an unknown key yields `(None, 0)`.
    pub(crate) fn get(&self, key: &[u8], hash: u32) -> (Option<ValuePointer>, u64) {
        match self.find(key, hash) {
            Some(slot) => {
                let entry = &self.entries[slot.index];
                (entry.value, entry.seq)
            }
            None => (None, 0),
        }
    }

    pub(crate) fn contains_key(&self, key: &[u8], hash: u32) -> bool {
        self.get(key, hash).0.is_some()
    }

    /// Apply a write if `seq` is at least as new as the stored one.
    ///
    /// Returns the previous value pointer and `true` when applied. A stale
    /// write returns the caller's own `value` and `false`. A `None` value
    /// unlinks the entry from its chain.
    pub(crate) fn put(
        &mut self,
        key: Bytes,
        hash: u32,
        seq: u64,
        value: Option<ValuePointer>,
    ) -> (Option<ValuePointer>, bool) {
        self.resize_step();

        let slot = match self.find(&key, hash) {
            Some(slot) => slot,
            // Creating an entry only to unlink it again leaves nothing behind
            None if value.is_none() => {
                self.maybe_start_resize();
                return (None, true);
            }
            None => self.link_new(key, hash),
        };

        let stored_seq = self.entries[slot.index].seq;
        if seq < stored_seq {
            tracing::trace!(
                partition = self.id,
                stored_seq,
                offered_seq = seq,
                "rejected stale put"
            );
            self.maybe_start_resize();
            return (value, false);
        }

        let previous = self.entries[slot.index].value;
        match value {
            None => {
                if previous.is_some() {
                    self.live_count -= 1;
                }
                self.unlink(slot, hash);
            }
            Some(ptr) => {
                let entry = &mut self.entries[slot.index];
                if entry.value.is_none() {
                    self.live_count += 1;
                }
                entry.seq = seq;
                entry.value = Some(ptr);
            }
        }

        self.maybe_start_resize();
        (previous, true)
    }

    /// Tombstone `key` in place if `seq` is at least as new as the stored one.
    ///
    /// The entry stays linked and keeps its sequence number. Returns the value
    /// that was cleared, or `None` for unknown keys and stale removes.
    pub(crate) fn remove(&mut self, key: &[u8], hash: u32, seq: u64) -> Option<ValuePointer> {
        self.resize_step();

        let removed = match self.find(key, hash) {
            Some(slot) if seq >= self.entries[slot.index].seq => {
                let removed = self.entries[slot.index].value.take();
                if removed.is_some() {
                    self.live_count -= 1;
                }
                removed
            }
            _ => None,
        };

        self.maybe_start_resize();
        removed
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub(crate) fn live_count(&self) -> usize {
        self.live_count
    }

    pub(crate) fn stats(&self) -> PartitionStats {
        PartitionStats {
            live_entries: self.live_count,
            nodes: self.node_count,
            buckets: self.active.len(),
            resize: self.resize.phase(),
        }
    }

    // =========================================================================
    // Chain Helpers
    // =========================================================================

    /// Locate `key` in `active`, then in `incoming` if a resize is in flight
    fn find(&self, key: &[u8], hash: u32) -> Option<Slot> {
        if let Some(slot) = self.scan(&self.active, Array::Active, key, hash) {
            return Some(slot);
        }
        let migration = self.resize.migration()?;
        self.scan(&migration.incoming, Array::Incoming, key, hash)
    }

    fn scan(&self, buckets: &[usize], array: Array, key: &[u8], hash: u32) -> Option<Slot> {
        let mut prev = NIL;
        let mut index = buckets[bucket_index(hash, buckets.len())];

        while index != NIL {
            let entry = &self.entries[index];
            if entry.hash == hash && &entry.key[..] == key {
                return Some(Slot { array, prev, index });
            }
            prev = index;
            index = entry.next;
        }

        None
    }

    /// Link a fresh entry (seq 0, no value) at the head of its bucket.
    /// New entries go to `incoming` while a resize is in flight.
    fn link_new(&mut self, key: Bytes, hash: u32) -> Slot {
        let entry = Entry {
            seq: 0,
            hash,
            key,
            value: None,
            next: NIL,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.entries[index] = entry;
                index
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };

        let (array, buckets) = match self.resize.migration_mut() {
            Some(migration) => (Array::Incoming, &mut migration.incoming),
            None => (Array::Active, &mut self.active),
        };
        let bucket = bucket_index(hash, buckets.len());
        self.entries[index].next = buckets[bucket];
        buckets[bucket] = index;

        self.node_count += 1;

        Slot {
            array,
            prev: NIL,
            index,
        }
    }

    /// Unlink the entry at `slot` and return its arena slot to the free list
    fn unlink(&mut self, slot: Slot, hash: u32) {
        let next = self.entries[slot.index].next;

        if slot.prev != NIL {
            self.entries[slot.prev].next = next;
        } else {
            let buckets = match slot.array {
                Array::Active => Some(&mut self.active),
                Array::Incoming => self.resize.migration_mut().map(|m| &mut m.incoming),
            };
            if let Some(buckets) = buckets {
                let bucket = bucket_index(hash, buckets.len());
                buckets[bucket] = next;
            }
        }

        let entry = &mut self.entries[slot.index];
        entry.key = Bytes::new();
        entry.value = None;
        entry.seq = 0;
        entry.next = NIL;
        self.free.push(slot.index);

        self.node_count -= 1;
    }

    // =========================================================================
    // Resize State Machine
    // =========================================================================

    /// Migrate the bucket under the cursor into `incoming`, relinking entries
    /// in place. Completes the resize after the last bucket.
    fn resize_step(&mut self) {
        let Some(migration) = self.resize.migration_mut() else {
            return;
        };

        let mut index = std::mem::replace(&mut self.active[migration.cursor], NIL);
        while index != NIL {
            let entry = &mut self.entries[index];
            let next = entry.next;
            let bucket = bucket_index(entry.hash, migration.incoming.len());
            entry.next = migration.incoming[bucket];
            migration.incoming[bucket] = index;
            index = next;
        }

        migration.cursor += 1;
        if migration.cursor == self.active.len() {
            self.complete_resize();
        }
    }

    fn complete_resize(&mut self) {
        let state = std::mem::replace(&mut self.resize, ResizeState::Stable);
        if let Some(migration) = state.into_migration() {
            let from = self.active.len();
            self.active = migration.incoming;
            tracing::debug!(
                partition = self.id,
                from,
                to = self.active.len(),
                nodes = self.node_count,
                "resize complete"
            );
        }
    }

    /// Begin a grow or shrink if the load is out of bounds and no resize is
    /// in flight
    fn maybe_start_resize(&mut self) {
        if !matches!(self.resize, ResizeState::Stable) {
            return;
        }

        let buckets = self.active.len();
        if self.node_count > self.max_load_factor.saturating_mul(buckets) {
            self.resize = ResizeState::Growing(Migration::new(buckets * 2));
            tracing::debug!(
                partition = self.id,
                from = buckets,
                to = buckets * 2,
                nodes = self.node_count,
                "partition growing"
            );
        } else if self.node_count < buckets / SHRINK_DIVISOR && self.node_count > self.min_nodes {
            self.resize = ResizeState::Shrinking(Migration::new(buckets / 2));
            tracing::debug!(
                partition = self.id,
                from = buckets,
                to = buckets / 2,
                nodes = self.node_count,
                "partition shrinking"
            );
        }
    }
}
