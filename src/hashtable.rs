//! Hash table used by the fragment compressor to find 4-byte match candidates.
//!
//! Entries are positions (relative to the start of the current fragment) stored as `u16`, which
//! is exact since fragments never exceed [`crate::compress::BLOCK_SIZE`] (65536) bytes. The table
//! is ephemeral: one is built per fragment and discarded afterwards.

use alloc::vec::Vec;

/// `MAX_HASH_TABLE_BITS` from the format's configuration surface: the table never grows past
/// 16384 entries, bounding per-call working memory to 32 KiB.
pub(crate) const MAX_HASH_TABLE_BITS: u32 = 14;
const MAX_HASH_TABLE_SIZE: usize = 1 << MAX_HASH_TABLE_BITS;

/// Multiplicative hash constant used by the reference Snappy implementation.
const HASH_MUL: u32 = 0x1e35_a7bd;

#[inline]
fn hash(fingerprint: u32) -> u32 {
    fingerprint.wrapping_mul(HASH_MUL)
}

pub(crate) struct HashTable {
    table: Vec<u16>,
    shift: u32,
}

impl HashTable {
    /// Builds a table sized for a fragment of `fragment_len` bytes.
    pub(crate) fn new(fragment_len: usize) -> Self {
        let size = table_size(fragment_len);
        HashTable {
            table: alloc::vec![0u16; size],
            shift: 32 - size.trailing_zeros(),
        }
    }

    /// Clears the table and, if needed, resizes it for the next fragment. Called once per
    /// fragment so a single allocation is reused across an entire [`crate::compress::compress`]
    /// call (§5 resource policy).
    pub(crate) fn reset(&mut self, fragment_len: usize) {
        let size = table_size(fragment_len);
        if self.table.len() != size {
            self.table.resize(size, 0);
        }
        self.table.fill(0);
        self.shift = 32 - size.trailing_zeros();
    }

    #[inline]
    pub(crate) fn get(&self, fingerprint: u32) -> usize {
        self.table[(hash(fingerprint) >> self.shift) as usize] as usize
    }

    #[inline]
    pub(crate) fn insert(&mut self, fingerprint: u32, pos: usize) {
        debug_assert!(pos <= u16::MAX as usize);
        let idx = (hash(fingerprint) >> self.shift) as usize;
        self.table[idx] = pos as u16;
    }
}

/// Smallest power of two in `[256, 16384]` that's at least `fragment_len`.
#[inline]
fn table_size(fragment_len: usize) -> usize {
    fragment_len.next_power_of_two().clamp(256, MAX_HASH_TABLE_SIZE)
}

#[test]
fn table_size_is_bounded_power_of_two() {
    assert_eq!(table_size(0), 256);
    assert_eq!(table_size(1), 256);
    assert_eq!(table_size(300), 512);
    assert_eq!(table_size(65536), MAX_HASH_TABLE_SIZE);
    assert_eq!(table_size(1_000_000), MAX_HASH_TABLE_SIZE);
    for size in [256usize, 512, 1024, 2048, 4096, 8192, 16384] {
        assert!(table_size(size).is_power_of_two());
        assert!(table_size(size) <= MAX_HASH_TABLE_SIZE);
    }
}
