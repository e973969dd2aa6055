//! P-Sig: probabilistic signature blocking
//!
//! Each signature group yields a signature per record. Signatures that are
//! too rare or too common are dropped by the occurrence filter, the rest are
//! flipped into a bloom filter and the resulting bit-position set becomes the
//! block key. Signatures whose flips coincide share a block.

use tracing::debug;

use super::bloom_filter::generate_bloom_filter_with_index_map;
use super::config::{PSigConfig, PSIG};
use super::hash_functions::flip_bloom_filter;
use super::index::{BlockingIndex, ReversedIndexResult};
use super::signature::{FeatureResolver, SignatureGenerator};
use super::stats::{per_group_stats, reversed_index_stats};
use super::types::{BlockKey, Record, ReversedIndex, SignatureIndex};
use crate::error::{BlockingError, ConfigError};

/// P-Sig index state: a validated configuration
#[derive(Clone, Debug)]
pub struct PSigIndex {
    config: PSigConfig,
}

impl PSigIndex {
    pub fn new(config: PSigConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PSigConfig {
        &self.config
    }

    pub fn bf_len(&self) -> usize {
        self.config.blocking_filter.bf_len
    }

    pub fn compress_block_key(&self) -> bool {
        self.config.blocking_filter.compress_block_key
    }

    /// One signature index per group, before filtering
    pub fn signature_indices(
        &self,
        records: &[Record],
        header: Option<&[String]>,
    ) -> Result<Vec<SignatureIndex>, BlockingError> {
        let resolver = FeatureResolver::new(header, records.first().map(Vec::len))?;
        let generator = SignatureGenerator::new(
            &self.config.signatures,
            &self.config.shared.null_sentinel,
            &resolver,
        )?;

        let mut indices = vec![SignatureIndex::new(); generator.num_groups()];
        for (row, record) in records.iter().enumerate() {
            let id = self.config.shared.record_id(row, record)?;
            for (group, index) in indices.iter_mut().enumerate() {
                if let Some(signature) = generator.signature_for_group(group, row, record)? {
                    index.entry(signature).or_default().push(id.clone());
                }
            }
        }
        Ok(indices)
    }
}

impl BlockingIndex for PSigIndex {
    fn algorithm(&self) -> &'static str {
        PSIG
    }

    fn build(
        &self,
        records: &[Record],
        header: Option<&[String]>,
    ) -> Result<ReversedIndexResult, BlockingError> {
        let n = records.len();
        if n == 0 {
            return Err(BlockingError::EmptyResult { algorithm: PSIG });
        }

        let mut indices = self.signature_indices(records, header)?;
        for index in indices.iter_mut() {
            index.retain(|_, ids| self.config.filter.keeps(ids.len(), n));
        }
        let group_stats = per_group_stats(&indices, n);
        for group in &group_stats {
            debug!(
                group = group.group,
                blocks = group.stats.num_of_blocks,
                coverage = group.stats.coverage,
                "Signature group filtered"
            );
        }

        // Later groups win on collision; group prefixes keep keys distinct
        let mut signatures = SignatureIndex::new();
        for index in indices {
            signatures.extend(index);
        }
        if signatures.is_empty() {
            return Err(BlockingError::EmptyResult { algorithm: PSIG });
        }

        let bf = &self.config.blocking_filter;
        let mut reversed_index = ReversedIndex::new();
        for (signature, ids) in &signatures {
            let key = BlockKey::BloomSet(flip_bloom_filter(signature, bf.bf_len, bf.num_hash_funcs));
            reversed_index
                .entry(key)
                .or_default()
                .extend(ids.iter().cloned());
        }

        let (candidate_filter, index_map) =
            generate_bloom_filter_with_index_map(signatures.keys(), bf.bf_len, bf.num_hash_funcs);
        let shared_bits = index_map.values().filter(|sigs| sigs.len() > 1).count();
        debug!(
            signatures = signatures.len(),
            bits_set = candidate_filter.bits_set(),
            shared_bits,
            "Candidate blocking filter built"
        );

        let stats = reversed_index_stats(&reversed_index, n);
        stats.log_summary(PSIG);

        Ok(ReversedIndexResult {
            reversed_index,
            stats,
            group_stats,
            candidate_filter: Some(candidate_filter),
        })
    }
}
