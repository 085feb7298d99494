//! MemTable statistics
//!
//! Point-in-time views of partition state. Each partition is read under its
//! own shared lock, so totals across partitions are best-effort.

/// Resize state of a single partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePhase {
    /// No resize in flight
    Stable,

    /// Migrating into a bucket array twice the size
    Growing,

    /// Migrating into a bucket array half the size
    Shrinking,
}

/// Snapshot of one partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionStats {
    /// Entries holding a value
    pub live_entries: usize,

    /// Linked entries, live or tombstoned
    pub nodes: usize,

    /// Buckets in the active array
    pub buckets: usize,

    pub resize: ResizePhase,
}

/// Snapshot of the whole table
#[derive(Debug, Clone, Default)]
pub struct MemTableStats {
    pub partitions: Vec<PartitionStats>,
}

impl MemTableStats {
    /// Sum of live entries across partitions
    pub fn live_entries(&self) -> usize {
        self.partitions.iter().map(|p| p.live_entries).sum()
    }

    /// Sum of linked entries (including tombstones) across partitions
    pub fn nodes(&self) -> usize {
        self.partitions.iter().map(|p| p.nodes).sum()
    }

    /// Sum of active buckets across partitions
    pub fn buckets(&self) -> usize {
        self.partitions.iter().map(|p| p.buckets).sum()
    }

    /// Number of partitions with a resize in flight
    pub fn resizing(&self) -> usize {
        self.partitions
            .iter()
            .filter(|p| p.resize != ResizePhase::Stable)
            .count()
    }

    /// Tombstoned entries still linked into chains
    pub fn tombstones(&self) -> usize {
        self.nodes().saturating_sub(self.live_entries())
    }
}
