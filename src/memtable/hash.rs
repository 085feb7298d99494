//! Key digest
//!
//! One 32-bit digest per key drives both partition selection (high bits)
//! and bucket placement (modulo), so it is computed once per operation.

use xxhash_rust::xxh32::xxh32;

const SEED: u32 = 0;

/// Hash a key to the 32-bit digest used for routing and bucket placement
#[inline]
pub fn hash_key(key: &[u8]) -> u32 {
    xxh32(key, SEED)
}

/// Bucket index of `hash` in an array of `len` buckets
#[inline]
pub(crate) fn bucket_index(hash: u32, len: usize) -> usize {
    hash as usize % len
}

/// Partition index of `hash` given `bits` partition-selector bits
#[inline]
pub(crate) fn partition_index(hash: u32, bits: u32) -> usize {
    // Widened so that a single partition (bits == 0) shifts by 32 safely
    ((hash as u64) >> (32 - bits)) as usize
}
