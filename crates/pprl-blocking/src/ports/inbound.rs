//! Inbound Ports (Driving Ports)
//!
//! These traits define the API a linkage coordinator uses to drive the
//! blocking engine.

use crate::domain::{
    BlockingAssessment, BlockingConfig, CandidateBlockingResult, GroundTruth, Record,
    ReversedIndex,
};
use crate::error::BlockingError;

/// One party's dataset: records plus an optional header row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Column names, required when features are addressed by name
    pub header: Option<Vec<String>>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            header: None,
        }
    }

    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = Some(header.into_iter().map(Into::into).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Primary blocking API (Driving Port)
pub trait BlockingApi: Send + Sync {
    /// Build the candidate blocks of one party
    fn generate_candidate_blocks(
        &self,
        dataset: &Dataset,
        config: &BlockingConfig,
    ) -> Result<CandidateBlockingResult, BlockingError>;

    /// Build the candidate blocks of several parties with the same config.
    ///
    /// Results are returned in input order. Builds are independent and may
    /// run concurrently.
    fn generate_candidate_blocks_parallel(
        &self,
        datasets: &[Dataset],
        config: &BlockingConfig,
    ) -> Result<Vec<CandidateBlockingResult>, BlockingError>;

    /// Keep blocks shared by at least `k` parties
    ///
    /// # Returns
    /// One filtered reversed index per party, in input order
    fn generate_blocks(
        &self,
        results: &[CandidateBlockingResult],
        k: usize,
    ) -> Result<Vec<ReversedIndex>, BlockingError>;

    /// Reduction ratio and pair completeness of two parties' merged blocks
    fn assess_blocks_2party(
        &self,
        indices: &[ReversedIndex],
        truths: &[GroundTruth],
    ) -> Result<BlockingAssessment, BlockingError>;
}
