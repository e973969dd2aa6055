//! Lambda-fold: LSH-based redundant blocking
//!
//! Every record is encoded as a bloom filter (2-grams of its blocking
//! features, or a CLK supplied in the data). For each of `Lambda` tables,
//! `K` bit positions are sampled and records agreeing on all sampled bits
//! share a block. Matching records only need to collide in one table.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use tracing::debug;

use super::bloom_filter::{generate_bloom_filter, BloomFilter};
use super::config::{LambdaFoldConfig, LAMBDA_FOLD};
use super::index::{BlockingIndex, ReversedIndexResult};
use super::signature::FeatureResolver;
use super::stats::reversed_index_stats;
use super::types::{BlockKey, Record, RecordId, ReversedIndex};
use crate::error::{BlockingError, ConfigError, DataError};

/// Length of the character grams folded into a record's bloom filter
const NGRAM_LEN: usize = 2;

/// Lambda-fold index state: a validated configuration
#[derive(Clone, Debug)]
pub struct LambdaFoldIndex {
    config: LambdaFoldConfig,
}

impl LambdaFoldIndex {
    pub fn new(config: LambdaFoldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LambdaFoldConfig {
        &self.config
    }

    /// Bloom filter of a single record
    pub fn record_to_bloom_filter(
        &self,
        row: usize,
        record: &[String],
        columns: &[usize],
    ) -> Result<BloomFilter, DataError> {
        if self.config.input_clks {
            let encoded = self.field(row, record, columns[0])?;
            let filter = BloomFilter::from_base64(encoded)?;
            if filter.size_bits() < self.config.bf_len {
                return Err(DataError::EncodingTooShort {
                    record: row,
                    bits: filter.size_bits(),
                    expected: self.config.bf_len,
                });
            }
            return Ok(filter);
        }

        let mut text = String::new();
        for &col in columns {
            text.push_str(self.field(row, record, col)?);
        }
        let chars: Vec<char> = text.chars().collect();
        let grams = chars
            .windows(NGRAM_LEN)
            .map(|gram| gram.iter().collect::<String>());
        Ok(generate_bloom_filter(
            grams,
            self.config.bf_len,
            self.config.num_hash_funcs,
        ))
    }

    /// Field value, with the null sentinel read as empty
    fn field<'a>(&self, row: usize, record: &'a [String], col: usize) -> Result<&'a str, DataError> {
        let value = record.get(col).ok_or(DataError::FieldOutOfRange {
            record: row,
            index: col,
            width: record.len(),
        })?;
        if *value == self.config.shared.null_sentinel {
            Ok("")
        } else {
            Ok(value.as_str())
        }
    }
}

impl BlockingIndex for LambdaFoldIndex {
    fn algorithm(&self) -> &'static str {
        LAMBDA_FOLD
    }

    fn build(
        &self,
        records: &[Record],
        header: Option<&[String]>,
    ) -> Result<ReversedIndexResult, BlockingError> {
        let n = records.len();
        if n == 0 {
            return Err(BlockingError::EmptyResult {
                algorithm: LAMBDA_FOLD,
            });
        }

        let resolver = FeatureResolver::new(header, records.first().map(Vec::len))?;
        let columns = self
            .config
            .shared
            .blocking_features
            .iter()
            .map(|feature| resolver.resolve(feature))
            .collect::<Result<Vec<_>, _>>()?;

        let mut encoded: Vec<(RecordId, BloomFilter)> = Vec::with_capacity(n);
        for (row, record) in records.iter().enumerate() {
            let id = self.config.shared.record_id(row, record)?;
            encoded.push((id, self.record_to_bloom_filter(row, record, &columns)?));
        }

        let mut rng = StdRng::seed_from_u64(self.config.random_state);
        let mut reversed_index = ReversedIndex::new();
        for table in 0..self.config.lambda {
            let positions = sample(&mut rng, self.config.bf_len, self.config.k).into_vec();
            let before = reversed_index.len();
            for (id, filter) in &encoded {
                let bits: String = positions
                    .iter()
                    .map(|&pos| if filter.get(pos) { '1' } else { '0' })
                    .collect();
                reversed_index
                    .entry(BlockKey::Text(format!("{}_{}", table, bits)))
                    .or_default()
                    .push(id.clone());
            }
            debug!(table, blocks = reversed_index.len() - before, "Lambda table built");
        }

        let stats = reversed_index_stats(&reversed_index, n);
        stats.log_summary(LAMBDA_FOLD);

        Ok(ReversedIndexResult {
            reversed_index,
            stats,
            group_stats: Vec::new(),
            candidate_filter: None,
        })
    }
}
