//! Blocking index abstraction
//!
//! Every algorithm turns one party's records into a [`ReversedIndexResult`].
//! [`IndexState`] is the closed set of algorithms; the merger dispatches on
//! its variant.

use super::bloom_filter::BloomFilter;
use super::config::{BlockingConfig, LAMBDA_FOLD, PSIG};
use super::lambda_fold::LambdaFoldIndex;
use super::psig::PSigIndex;
use super::stats::{BlockStats, GroupStats};
use super::types::{Record, ReversedIndex};
use crate::error::BlockingError;

/// A blocking algorithm, configured and ready to index one dataset
pub trait BlockingIndex {
    /// Wire name of the algorithm
    fn algorithm(&self) -> &'static str;

    /// Build the reversed index of `records`.
    ///
    /// `header` maps feature names to columns when the config addresses
    /// features by name.
    fn build(
        &self,
        records: &[Record],
        header: Option<&[String]>,
    ) -> Result<ReversedIndexResult, BlockingError>;
}

/// Output of one index build
#[derive(Clone, Debug)]
pub struct ReversedIndexResult {
    pub reversed_index: ReversedIndex,
    pub stats: BlockStats,
    /// Per signature group statistics (P-Sig only)
    pub group_stats: Vec<GroupStats>,
    /// Union of the flips of every surviving signature (P-Sig only)
    pub candidate_filter: Option<BloomFilter>,
}

/// Algorithm state owned by a candidate blocking result
#[derive(Clone, Debug)]
pub enum IndexState {
    PSig(PSigIndex),
    LambdaFold(LambdaFoldIndex),
}

impl IndexState {
    pub fn from_config(config: BlockingConfig) -> Result<Self, BlockingError> {
        Ok(match config {
            BlockingConfig::PSig(config) => IndexState::PSig(PSigIndex::new(config)?),
            BlockingConfig::LambdaFold(config) => {
                IndexState::LambdaFold(LambdaFoldIndex::new(config)?)
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            IndexState::PSig(_) => PSIG,
            IndexState::LambdaFold(_) => LAMBDA_FOLD,
        }
    }

    pub fn as_psig(&self) -> Option<&PSigIndex> {
        match self {
            IndexState::PSig(index) => Some(index),
            IndexState::LambdaFold(_) => None,
        }
    }
}

impl BlockingIndex for IndexState {
    fn algorithm(&self) -> &'static str {
        self.name()
    }

    fn build(
        &self,
        records: &[Record],
        header: Option<&[String]>,
    ) -> Result<ReversedIndexResult, BlockingError> {
        match self {
            IndexState::PSig(index) => index.build(records, header),
            IndexState::LambdaFold(index) => index.build(records, header),
        }
    }
}

/// One party's candidate blocks together with the state that produced them
#[derive(Clone, Debug)]
pub struct CandidateBlockingResult {
    pub blocks: ReversedIndex,
    pub stats: BlockStats,
    pub group_stats: Vec<GroupStats>,
    pub candidate_filter: Option<BloomFilter>,
    pub state: IndexState,
}

impl CandidateBlockingResult {
    pub fn algorithm(&self) -> &'static str {
        self.state.name()
    }
}

/// Build the candidate blocks of one party
pub fn generate_candidate_blocks(
    records: &[Record],
    config: &BlockingConfig,
    header: Option<&[String]>,
) -> Result<CandidateBlockingResult, BlockingError> {
    let state = IndexState::from_config(config.clone())?;
    let result = state.build(records, header)?;
    Ok(CandidateBlockingResult {
        blocks: result.reversed_index,
        stats: result.stats,
        group_stats: result.group_stats,
        candidate_filter: result.candidate_filter,
        state,
    })
}
