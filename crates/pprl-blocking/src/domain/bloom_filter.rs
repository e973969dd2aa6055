//! Blocking bloom filter (bit-vector)
//!
//! Built by OR-ing the bit positions of many signatures. Used as the
//! candidate blocking filter of a P-Sig party, and as the per-record
//! encoding sampled by Lambda-fold. CLK inputs arrive base64 encoded with
//! big-endian bit order inside each byte, which is exactly `BitVec<u8, Msb0>`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bitvec::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use super::hash_functions::compute_hash_positions;
use crate::error::DataError;

/// Bloom filter over signature strings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    /// Bit array storing the filter state
    bits: BitVec<u8, Msb0>,
    /// Number of hash functions (k)
    k: usize,
    /// Number of elements inserted (n)
    n: usize,
}

impl BloomFilter {
    /// Create an empty filter of `m` bits using `k` hash functions
    pub fn new(m: usize, k: usize) -> Self {
        Self {
            bits: bitvec![u8, Msb0; 0; m],
            k,
            n: 0,
        }
    }

    /// Decode a base64 CLK
    ///
    /// The filter length is the decoded byte count times eight; the hash
    /// count is unknown and reported as 0.
    pub fn from_base64(encoded: &str) -> Result<Self, DataError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| DataError::InvalidEncoding(e.to_string()))?;
        Ok(Self {
            bits: BitVec::<u8, Msb0>::from_vec(bytes),
            k: 0,
            n: 0,
        })
    }

    /// Encode the filter as base64 (padding bits beyond the length are zero)
    pub fn to_base64(&self) -> String {
        let mut bits = self.bits.clone();
        bits.set_uninitialized(false);
        STANDARD.encode(bits.as_raw_slice())
    }

    /// Insert a signature, returning the positions it flipped
    pub fn insert(&mut self, signature: &str) -> Vec<usize> {
        let positions = compute_hash_positions(signature, self.k, self.bits.len());
        for &pos in &positions {
            self.bits.set(pos, true);
        }
        self.n += 1;
        positions
    }

    /// Test whether a signature might have been inserted
    pub fn contains(&self, signature: &str) -> bool {
        compute_hash_positions(signature, self.k, self.bits.len())
            .iter()
            .all(|&pos| self.bits[pos])
    }

    /// Set a single bit
    pub fn set(&mut self, pos: usize) {
        self.bits.set(pos, true);
    }

    /// Value of the bit at `pos` (false when out of range)
    pub fn get(&self, pos: usize) -> bool {
        self.bits.get(pos).map(|bit| *bit).unwrap_or(false)
    }

    /// Positions of all set bits, ascending
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Merge another filter into this one (OR operation)
    ///
    /// # Panics
    /// Panics if filters have different sizes.
    pub fn merge(&mut self, other: &BloomFilter) {
        assert_eq!(
            self.bits.len(),
            other.bits.len(),
            "Cannot merge filters with different sizes"
        );
        let self_raw = self.bits.as_raw_mut_slice();
        let other_raw = other.bits.as_raw_slice();
        for (s, o) in self_raw.iter_mut().zip(other_raw.iter()) {
            *s |= *o;
        }
        self.n += other.n;
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Get the filter size in bits
    pub fn size_bits(&self) -> usize {
        self.bits.len()
    }

    /// Get the number of hash functions
    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Get the number of elements inserted
    pub fn elements_inserted(&self) -> usize {
        self.n
    }
}

/// Fold a collection of signatures into one bloom filter
pub fn generate_bloom_filter<I, S>(signatures: I, bf_len: usize, num_hash_funcs: usize) -> BloomFilter
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut filter = BloomFilter::new(bf_len, num_hash_funcs);
    for signature in signatures {
        filter.insert(signature.as_ref());
    }
    filter
}

/// Fold signatures into a bloom filter and record, for every set bit, the
/// signatures that flipped it
pub fn generate_bloom_filter_with_index_map<I, S>(
    signatures: I,
    bf_len: usize,
    num_hash_funcs: usize,
) -> (BloomFilter, BTreeMap<usize, BTreeSet<String>>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut filter = BloomFilter::new(bf_len, num_hash_funcs);
    let mut index_map: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
    for signature in signatures {
        let signature = signature.as_ref();
        for pos in filter.insert(signature) {
            index_map
                .entry(pos)
                .or_default()
                .insert(signature.to_string());
        }
    }
    (filter, index_map)
}
