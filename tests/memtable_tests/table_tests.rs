//! MemTable Tests
//!
//! Tests verify:
//! - Basic get/put/remove/contains_key
//! - Sequence-number arbitration
//! - Both delete paths (tombstone vs unlink)
//! - Size tracking and flush threshold
//! - Configuration validation

use memshard::{Config, MemShardError, MemTable, ResizePhase};

use super::{key, vp};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let memtable = MemTable::new();
    assert_eq!(memtable.size(), 0);
    assert!(memtable.is_empty());
    assert_eq!(memtable.partition_count(), 16);
}

#[test]
fn test_put_and_get() {
    let memtable = MemTable::new();

    assert_eq!(memtable.put(b"key1".to_vec(), 1, vp(1)), (None, true));

    assert_eq!(memtable.get(b"key1"), (vp(1), 1));
    assert!(memtable.contains_key(b"key1"));
}

#[test]
fn test_get_nonexistent_key() {
    let memtable = MemTable::new();

    assert_eq!(memtable.get(b"nonexistent"), (None, 0));
    assert!(!memtable.contains_key(b"nonexistent"));
}

#[test]
fn test_put_multiple_entries() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), 1, vp(1));
    memtable.put(b"key2".to_vec(), 2, vp(2));
    memtable.put(b"key3".to_vec(), 3, vp(3));

    assert_eq!(memtable.size(), 3);
    assert_eq!(memtable.get(b"key1"), (vp(1), 1));
    assert_eq!(memtable.get(b"key2"), (vp(2), 2));
    assert_eq!(memtable.get(b"key3"), (vp(3), 3));
}

#[test]
fn test_put_overwrites_existing() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), 1, vp(1));
    assert_eq!(memtable.put(b"key1".to_vec(), 2, vp(2)), (vp(1), true));

    assert_eq!(memtable.size(), 1);
    assert_eq!(memtable.get(b"key1"), (vp(2), 2));
}

#[test]
fn test_put_accepts_bytes() {
    let memtable = MemTable::new();

    memtable.put(bytes::Bytes::from_static(b"static"), 1, vp(1));

    assert_eq!(memtable.get(b"static"), (vp(1), 1));
}

// =============================================================================
// Sequence Number Tests
// =============================================================================

#[test]
fn test_equal_sequence_overwrites() {
    let memtable = MemTable::new();

    memtable.put(b"k".to_vec(), 5, vp(1));
    assert_eq!(memtable.put(b"k".to_vec(), 5, vp(2)), (vp(1), true));

    assert_eq!(memtable.get(b"k"), (vp(2), 5));
}

#[test]
fn test_stale_put_rejected() {
    let memtable = MemTable::new();

    memtable.put(b"k".to_vec(), 10, vp(1));
    // The caller's own pointer comes back on rejection
    assert_eq!(memtable.put(b"k".to_vec(), 9, vp(2)), (vp(2), false));

    assert_eq!(memtable.get(b"k"), (vp(1), 10));
}

#[test]
fn test_stale_delete_via_put_rejected() {
    let memtable = MemTable::new();

    memtable.put(b"k".to_vec(), 10, vp(1));
    assert_eq!(memtable.put(b"k".to_vec(), 3, None), (None, false));

    assert_eq!(memtable.get(b"k"), (vp(1), 10));
}

#[test]
fn test_stale_remove_ignored() {
    let memtable = MemTable::new();

    memtable.put(b"k".to_vec(), 10, vp(1));
    assert_eq!(memtable.remove(b"k", 9), None);

    assert_eq!(memtable.get(b"k"), (vp(1), 10));
    assert_eq!(memtable.size(), 1);
}

#[test]
fn test_out_of_order_replay_keeps_newest() {
    let memtable = MemTable::new();

    for seq in [4u64, 9, 2, 7, 9, 1] {
        memtable.put(b"k".to_vec(), seq, vp(seq));
    }

    assert_eq!(memtable.get(b"k"), (vp(9), 9));
}

// =============================================================================
// Delete / Tombstone Tests
// =============================================================================

#[test]
fn test_remove_tombstones() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), 1, vp(1));
    assert_eq!(memtable.remove(b"key1", 2), vp(1));

    // Tombstone keeps the sequence of the last value write
    assert_eq!(memtable.get(b"key1"), (None, 1));
    assert!(!memtable.contains_key(b"key1"));
    assert_eq!(memtable.size(), 0);

    let stats = memtable.stats();
    assert_eq!(stats.nodes(), 1);
    assert_eq!(stats.tombstones(), 1);
}

#[test]
fn test_remove_nonexistent_key() {
    let memtable = MemTable::new();

    assert_eq!(memtable.remove(b"nonexistent", 5), None);

    assert_eq!(memtable.get(b"nonexistent"), (None, 0));
    assert_eq!(memtable.stats().nodes(), 0);
}

#[test]
fn test_remove_twice() {
    let memtable = MemTable::new();

    memtable.put(b"k".to_vec(), 1, vp(1));
    assert_eq!(memtable.remove(b"k", 2), vp(1));
    assert_eq!(memtable.remove(b"k", 3), None);

    assert_eq!(memtable.size(), 0);
}

#[test]
fn test_put_after_remove() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), 1, vp(1));
    memtable.remove(b"key1", 2);
    assert_eq!(memtable.put(b"key1".to_vec(), 2, vp(2)), (None, true));

    assert_eq!(memtable.get(b"key1"), (vp(2), 2));
    assert_eq!(memtable.size(), 1);
}

#[test]
fn test_put_none_unlinks() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), 1, vp(1));
    assert_eq!(memtable.put(b"key1".to_vec(), 2, None), (vp(1), true));

    assert_eq!(memtable.get(b"key1"), (None, 0));
    assert!(!memtable.contains_key(b"key1"));
    assert_eq!(memtable.size(), 0);
    assert_eq!(memtable.stats().nodes(), 0);
}

#[test]
fn test_put_none_on_unknown_key() {
    let memtable = MemTable::new();

    assert_eq!(memtable.put(b"ghost".to_vec(), 1, None), (None, true));

    assert_eq!(memtable.size(), 0);
    assert_eq!(memtable.stats().nodes(), 0);
}

#[test]
fn test_put_none_clears_tombstone() {
    let memtable = MemTable::new();

    memtable.put(b"k".to_vec(), 1, vp(1));
    memtable.remove(b"k", 2);
    assert_eq!(memtable.put(b"k".to_vec(), 3, None), (None, true));

    assert_eq!(memtable.stats().nodes(), 0);
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_size_counts_live_only() {
    let memtable = MemTable::new();

    for i in 0..10 {
        memtable.put(key(i), 1, vp(i as u64));
    }
    for i in 0..3 {
        memtable.remove(&key(i), 2);
    }
    for i in 3..5 {
        memtable.put(key(i), 2, None);
    }

    assert_eq!(memtable.size(), 5);
    let stats = memtable.stats();
    assert_eq!(stats.live_entries(), 5);
    assert_eq!(stats.nodes(), 8);
}

#[test]
fn test_should_flush() {
    let config = Config::builder().flush_threshold(3).build();
    let memtable = MemTable::with_config(config).unwrap();

    memtable.put(key(0), 1, vp(0));
    memtable.put(key(1), 1, vp(1));
    assert!(!memtable.should_flush());

    memtable.put(key(2), 1, vp(2));
    assert!(memtable.should_flush());

    memtable.remove(&key(2), 2);
    assert!(!memtable.should_flush());
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.partition_count, 16);
    assert_eq!(config.initial_bucket_count, 4);
    assert_eq!(config.max_load_factor, 5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_rejects_non_power_of_two() {
    let config = Config::builder().partition_count(12).build();
    assert!(matches!(
        MemTable::with_config(config),
        Err(MemShardError::Config(_))
    ));
}

#[test]
fn test_config_rejects_zero() {
    assert!(Config::builder().partition_count(0).build().validate().is_err());
    assert!(Config::builder().initial_bucket_count(0).build().validate().is_err());
    assert!(Config::builder().max_load_factor(0).build().validate().is_err());
}

#[test]
fn test_config_rejects_too_many_partitions() {
    let config = Config::builder().partition_count(1 << 17).build();
    assert!(config.validate().is_err());
}

#[test]
fn test_fresh_partitions_use_initial_buckets() {
    let config = Config::builder()
        .partition_count(4)
        .initial_bucket_count(32)
        .build();
    let memtable = MemTable::with_config(config).unwrap();

    let stats = memtable.stats();
    assert_eq!(stats.partitions.len(), 4);
    for p in &stats.partitions {
        assert_eq!(p.buckets, 32);
        assert_eq!(p.resize, ResizePhase::Stable);
    }
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_empty_key() {
    let memtable = MemTable::new();

    memtable.put(Vec::new(), 1, vp(1));

    assert_eq!(memtable.get(&[]), (vp(1), 1));
    assert_eq!(memtable.remove(&[], 2), vp(1));
    assert!(!memtable.contains_key(&[]));
}

#[test]
fn test_large_key() {
    let memtable = MemTable::new();

    let large_key = vec![0xAB; 1024 * 1024];
    memtable.put(large_key.clone(), 1, vp(1));

    assert_eq!(memtable.get(&large_key), (vp(1), 1));
}

#[test]
fn test_keys_differing_in_one_byte() {
    let memtable = MemTable::new();

    memtable.put(b"abc\x00".to_vec(), 1, vp(1));
    memtable.put(b"abc\x01".to_vec(), 1, vp(2));
    memtable.put(b"abc".to_vec(), 1, vp(3));

    assert_eq!(memtable.get(b"abc\x00"), (vp(1), 1));
    assert_eq!(memtable.get(b"abc\x01"), (vp(2), 1));
    assert_eq!(memtable.get(b"abc"), (vp(3), 1));
}

#[test]
fn test_partition_of_is_stable() {
    let memtable = MemTable::new();

    for i in 0..100 {
        let p = memtable.partition_of(&key(i));
        assert!(p < memtable.partition_count());
        assert_eq!(p, memtable.partition_of(&key(i)));
    }
}
