//! Cross-party block merging
//!
//! Given every party's candidate blocks, keep only the blocks that at least
//! `K` parties agree on. Lambda-fold keys are compared literally. P-Sig keys
//! are bit-position sets: a counting bloom filter over the parties' candidate
//! filters first removes blocks touching a position fewer than `K` parties
//! set, then the exact key must still be reported by `K` parties.

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::bloom_filter::BloomFilter;
use super::counting_bloom::CountingBloomFilter;
use super::index::{CandidateBlockingResult, IndexState};
use super::types::{BlockKey, BloomSet, RecordId, ReversedIndex};
use crate::error::{BlockingError, ConfigError};

/// Width in bytes of a compressed block key
pub const COMPRESSED_KEY_LEN: usize = 5;

/// Merge the candidate blocks of several parties, keeping blocks shared by
/// at least `k` of them. Returns one filtered index per party, in input order.
///
/// A party left without any block is `BlockingError::EmptyResult`.
pub fn generate_blocks(
    results: &[CandidateBlockingResult],
    k: usize,
) -> Result<Vec<ReversedIndex>, BlockingError> {
    let parties = results.len();
    if parties < 2 || k < 2 || k > parties {
        return Err(ConfigError::InvalidThreshold { k, parties }.into());
    }

    let expected = results[0].algorithm();
    if let Some(other) = results.iter().find(|r| r.algorithm() != expected) {
        return Err(BlockingError::TypeMismatch {
            expected,
            found: other.algorithm(),
        });
    }

    let merged = match &results[0].state {
        IndexState::PSig(_) => generate_blocks_psig(results, k)?,
        IndexState::LambdaFold(_) => {
            let indices: Vec<&ReversedIndex> = results.iter().map(|r| &r.blocks).collect();
            filter_by_key_count(&indices, k)
        }
    };

    for (party, (result, index)) in results.iter().zip(&merged).enumerate() {
        debug!(
            party,
            before = result.blocks.len(),
            after = index.len(),
            "Party blocks merged"
        );
        if index.is_empty() {
            warn!(party, k, "No block of this party is shared by enough parties");
            return Err(BlockingError::EmptyResult { algorithm: expected });
        }
    }
    info!(
        algorithm = expected,
        parties,
        k,
        blocks = merged.first().map(ReversedIndex::len).unwrap_or(0),
        "Blocks merged"
    );

    Ok(merged)
}

/// Keep keys that appear in at least `k` of the indices
pub fn filter_by_key_count(indices: &[&ReversedIndex], k: usize) -> Vec<ReversedIndex> {
    let mut counts: HashMap<&BlockKey, usize> = HashMap::new();
    for index in indices {
        for key in index.keys() {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    indices
        .iter()
        .map(|index| {
            index
                .iter()
                .filter(|(key, _)| counts.get(key).copied().unwrap_or(0) >= k)
                .map(|(key, ids)| (key.clone(), ids.clone()))
                .collect()
        })
        .collect()
}

fn generate_blocks_psig(
    results: &[CandidateBlockingResult],
    k: usize,
) -> Result<Vec<ReversedIndex>, BlockingError> {
    let mut bf_len = None;
    let mut compress = false;
    for (party, result) in results.iter().enumerate() {
        let Some(state) = result.state.as_psig() else {
            continue;
        };
        match bf_len {
            None => {
                bf_len = Some(state.bf_len());
                compress = state.compress_block_key();
            }
            Some(len) if len != state.bf_len() => {
                return Err(ConfigError::InconsistentStates(format!(
                    "party {} uses bf-len {} but party 0 uses {}",
                    party,
                    state.bf_len(),
                    len
                ))
                .into());
            }
            Some(_) => {}
        }
    }
    let bf_len = bf_len.unwrap_or(0);

    let mut cbf = CountingBloomFilter::new(bf_len);
    for result in results {
        match &result.candidate_filter {
            Some(filter) => cbf.add_filter(filter),
            None => cbf.add_filter(&filter_from_keys(&result.blocks, bf_len)),
        }
    }
    let live = cbf.live_positions(k);
    debug!(
        live_positions = live.count_ones(),
        bf_len, "Counting bloom filter built"
    );

    // Necessary: every bit of the key is set by at least k parties
    let prefiltered: Vec<ReversedIndex> = results
        .iter()
        .map(|result| {
            result
                .blocks
                .iter()
                .filter(|(key, _)| match key.as_bloom_set() {
                    Some(set) => cbf.all_live(set, k),
                    None => true,
                })
                .map(|(key, ids)| (key.clone(), ids.clone()))
                .collect()
        })
        .collect();

    // Authoritative: the exact key is reported by at least k parties
    let refs: Vec<&ReversedIndex> = prefiltered.iter().collect();
    let merged = filter_by_key_count(&refs, k);

    if !compress {
        return Ok(merged);
    }
    merged
        .into_iter()
        .map(|index| {
            index
                .into_iter()
                .map(|(key, ids)| Ok::<_, BlockingError>((compress_block_key(&key)?, ids)))
                .collect()
        })
        .collect()
}

/// Bloom filter whose set bits are the union of the bloom-set keys
fn filter_from_keys(index: &ReversedIndex, bf_len: usize) -> BloomFilter {
    let mut filter = BloomFilter::new(bf_len, 0);
    for set in index.keys().filter_map(BlockKey::as_bloom_set) {
        for pos in set.iter().filter(|&pos| pos < bf_len) {
            filter.set(pos);
        }
    }
    filter
}

/// 5-byte BLAKE2b digest of the canonical string form of a bloom set
pub fn compress_bloom_set(set: &BloomSet) -> Result<[u8; COMPRESSED_KEY_LEN], BlockingError> {
    let mut hasher = Blake2bVar::new(COMPRESSED_KEY_LEN)
        .map_err(|e| ConfigError::InvalidParameter(e.to_string()))?;
    hasher.update(set.to_string().as_bytes());
    let mut digest = [0u8; COMPRESSED_KEY_LEN];
    hasher
        .finalize_variable(&mut digest)
        .map_err(|e| ConfigError::InvalidParameter(e.to_string()))?;
    Ok(digest)
}

/// Compress a bloom-set key; other keys are returned unchanged
pub fn compress_block_key(key: &BlockKey) -> Result<BlockKey, BlockingError> {
    match key {
        BlockKey::BloomSet(set) => Ok(BlockKey::Digest(compress_bloom_set(set)?)),
        other => Ok(other.clone()),
    }
}

/// Map every record to the set of blocks it belongs to, per party
pub fn generate_reverse_blocks(
    indices: &[ReversedIndex],
) -> Vec<BTreeMap<RecordId, BTreeSet<BlockKey>>> {
    indices
        .iter()
        .map(|index| {
            let mut record_to_blocks: BTreeMap<RecordId, BTreeSet<BlockKey>> = BTreeMap::new();
            for (key, ids) in index {
                for id in ids {
                    record_to_blocks
                        .entry(id.clone())
                        .or_default()
                        .insert(key.clone());
                }
            }
            record_to_blocks
        })
        .collect()
}
