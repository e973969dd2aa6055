//! Hash functions for blocking bloom filters
//!
//! Double hashing (Kirsch-Mitzenmacher): two base integers are derived from a
//! SHA-1 and an MD5 digest of the signature, both reduced modulo the filter
//! length, and the i-th position is `(h1 + i * h2) mod m`.
//!
//! The digests serve as a well-distributed, deterministic hash family; they
//! are not relied upon for collision resistance.

use md5::Md5;
use sha1::{Digest, Sha1};

use super::types::BloomSet;

/// Reduce a big-endian digest modulo `m` without materializing the integer
pub fn digest_mod(digest: &[u8], m: usize) -> usize {
    let m = m as u128;
    let reduced = digest
        .iter()
        .fold(0u128, |acc, &byte| ((acc << 8) | byte as u128) % m);
    reduced as usize
}

/// Base integers `(h1, h2)` for a signature, both already reduced modulo `m`
pub fn base_hashes(signature: &str, m: usize) -> (usize, usize) {
    let bytes = signature.as_bytes();
    let h1 = digest_mod(&Sha1::digest(bytes), m);
    let h2 = digest_mod(&Md5::digest(bytes), m);
    (h1, h2)
}

/// Compute k hash positions for a signature
///
/// Positions may repeat (e.g. when `h2 == 0`); callers that need a set use
/// [`flip_bloom_filter`].
pub fn compute_hash_positions(signature: &str, k: usize, m: usize) -> Vec<usize> {
    if m == 0 {
        return Vec::new();
    }
    let (h1, h2) = base_hashes(signature, m);
    (0..k)
        .map(|i| ((h1 as u128 + i as u128 * h2 as u128) % m as u128) as usize)
        .collect()
}

/// Bit positions a signature flips in a bloom filter of length `bf_len`
/// using `num_hash_funcs` hash functions
pub fn flip_bloom_filter(signature: &str, bf_len: usize, num_hash_funcs: usize) -> BloomSet {
    BloomSet::from_positions(compute_hash_positions(signature, num_hash_funcs, bf_len))
}
