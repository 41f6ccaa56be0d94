//! # Partition Algorithm
//!
//! Splits a buffer into three contiguous shards. The first two shards are
//! `floor(L/3)` bytes each and the last shard takes the remainder, so for
//! `L < 3` the first two shards are empty.

use crate::domain::SHARD_COUNT;

/// Shard lengths for a buffer of `len` bytes.
pub fn shard_sizes(len: usize) -> [usize; SHARD_COUNT] {
    let base = len / SHARD_COUNT;
    [base, base, len - 2 * base]
}

/// Borrow the three shards of `data` without copying.
pub fn split(data: &[u8]) -> [&[u8]; SHARD_COUNT] {
    let [first, second, _] = shard_sizes(data.len());
    let (head, rest) = data.split_at(first);
    let (middle, tail) = rest.split_at(second);
    [head, middle, tail]
}

/// Concatenate shards in the order given.
///
/// Callers pass shards in index order; the store-reported length of each
/// shard is authoritative, so no sizes are checked here.
pub fn reassemble<I, B>(parts: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(part.as_ref());
    }
    out
}
