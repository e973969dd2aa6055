//! # Counting Bloom Filter (party counts)
//!
//! Sums the candidate blocking filters of several parties position by
//! position. A position is *live* when at least `threshold` parties set it;
//! a P-Sig block survives the bit-level merge filter only if every one of its
//! positions is live.

use bitvec::prelude::*;

use super::bloom_filter::BloomFilter;
use super::types::BloomSet;

/// Counting Bloom filter with one counter per bit position
#[derive(Clone, Debug)]
pub struct CountingBloomFilter {
    counters: Vec<u32>,
    /// Number of filters added
    n: usize,
}

impl CountingBloomFilter {
    /// Create a counting filter of `m` positions
    pub fn new(m: usize) -> Self {
        Self {
            counters: vec![0; m],
            n: 0,
        }
    }

    /// Add one party's filter (increment every set position).
    ///
    /// Positions beyond this filter's length are ignored.
    pub fn add_filter(&mut self, filter: &BloomFilter) {
        for pos in filter.ones() {
            self.increment(pos);
        }
        self.n += 1;
    }

    /// Add a set of positions once
    pub fn add_positions(&mut self, positions: &BloomSet) {
        for pos in positions.iter() {
            self.increment(pos);
        }
        self.n += 1;
    }

    /// Counter at position (0 when out of range)
    pub fn count(&self, pos: usize) -> u32 {
        self.counters.get(pos).copied().unwrap_or(0)
    }

    /// Bit mask of positions whose counter reaches `threshold`
    pub fn live_positions(&self, threshold: usize) -> BitVec<u8, Msb0> {
        self.counters
            .iter()
            .map(|&count| count as usize >= threshold)
            .collect()
    }

    /// True if every position of `set` reaches `threshold`
    pub fn all_live(&self, set: &BloomSet, threshold: usize) -> bool {
        set.iter().all(|pos| self.count(pos) as usize >= threshold)
    }

    /// Number of positions
    pub fn size(&self) -> usize {
        self.counters.len()
    }

    /// Number of filters added
    pub fn filters_added(&self) -> usize {
        self.n
    }

    fn increment(&mut self, pos: usize) {
        if let Some(counter) = self.counters.get_mut(pos) {
            *counter = counter.saturating_add(1);
        }
    }
}
