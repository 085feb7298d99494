//! Configuration for memshard
//!
//! Centralized configuration with sensible defaults.

use crate::error::{MemShardError, Result};

/// Upper bound on `partition_count` (partition index comes from the top bits
/// of a 32-bit digest)
pub const MAX_PARTITIONS: usize = 1 << 16;

/// Main configuration for a MemTable instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Sharding Configuration
    // -------------------------------------------------------------------------
    /// Number of independently-locked partitions (power of two)
    pub partition_count: usize,

    // -------------------------------------------------------------------------
    // Partition Configuration
    // -------------------------------------------------------------------------
    /// Buckets allocated for a fresh partition.
    /// Also the node-count floor below which a partition never shrinks.
    pub initial_bucket_count: usize,

    /// A partition grows once `nodes > max_load_factor * buckets`
    pub max_load_factor: usize,

    // -------------------------------------------------------------------------
    // Flush Configuration
    // -------------------------------------------------------------------------
    /// Live entry count at which the table reports it should be flushed
    pub flush_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            partition_count: 16,
            initial_bucket_count: 4,
            max_load_factor: 5,
            flush_threshold: 1 << 20,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration describes a usable table
    pub fn validate(&self) -> Result<()> {
        if !self.partition_count.is_power_of_two() || self.partition_count > MAX_PARTITIONS {
            return Err(MemShardError::Config(format!(
                "partition_count must be a power of two in 1..={}, got {}",
                MAX_PARTITIONS, self.partition_count
            )));
        }

        if self.initial_bucket_count == 0 {
            return Err(MemShardError::Config(
                "initial_bucket_count must be at least 1".to_string(),
            ));
        }

        if self.max_load_factor == 0 {
            return Err(MemShardError::Config(
                "max_load_factor must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of high-order hash bits used to select a partition
    pub(crate) fn partition_bits(&self) -> u32 {
        self.partition_count.trailing_zeros()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the number of partitions (must be a power of two)
    pub fn partition_count(mut self, count: usize) -> Self {
        self.config.partition_count = count;
        self
    }

    /// Set the bucket count of a fresh partition
    pub fn initial_bucket_count(mut self, count: usize) -> Self {
        self.config.initial_bucket_count = count;
        self
    }

    /// Set the average chain length that triggers growth
    pub fn max_load_factor(mut self, factor: usize) -> Self {
        self.config.max_load_factor = factor;
        self
    }

    /// Set the live entry count that triggers a flush
    pub fn flush_threshold(mut self, entries: usize) -> Self {
        self.config.flush_threshold = entries;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
