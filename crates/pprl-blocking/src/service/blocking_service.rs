//! Blocking Service
//!
//! Orchestrates per-party index builds, the multi-party merge and the
//! assessment, recording each through an injected metrics recorder.

use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::domain::{
    self, BlockingAssessment, BlockingConfig, CandidateBlockingResult, GroundTruth,
    ReversedIndex,
};
use crate::error::BlockingError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{BlockingApi, Dataset};

/// Parallel threshold - build parties sequentially below this count
pub const PARALLEL_THRESHOLD: usize = 4;

/// Blocking service implementation
///
/// Implements the `BlockingApi` port. Stateless apart from metrics, so one
/// service can be shared across threads.
pub struct BlockingService {
    metrics: Arc<dyn MetricsRecorder>,
}

impl Default for BlockingService {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockingService {
    /// Create a service that discards metrics
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Create a service reporting to `metrics`
    pub fn with_metrics(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { metrics }
    }

    fn build_one(
        &self,
        dataset: &Dataset,
        config: &BlockingConfig,
    ) -> Result<CandidateBlockingResult, BlockingError> {
        let start = Instant::now();
        let result =
            domain::generate_candidate_blocks(&dataset.records, config, dataset.header.as_deref())?;
        let signatures = result
            .group_stats
            .iter()
            .map(|group| group.stats.num_of_blocks)
            .sum();
        self.metrics
            .record_index_built(dataset.len(), result.blocks.len(), signatures, start.elapsed());
        Ok(result)
    }
}

impl BlockingApi for BlockingService {
    fn generate_candidate_blocks(
        &self,
        dataset: &Dataset,
        config: &BlockingConfig,
    ) -> Result<CandidateBlockingResult, BlockingError> {
        self.build_one(dataset, config)
    }

    fn generate_candidate_blocks_parallel(
        &self,
        datasets: &[Dataset],
        config: &BlockingConfig,
    ) -> Result<Vec<CandidateBlockingResult>, BlockingError> {
        if datasets.len() < PARALLEL_THRESHOLD {
            // Sequential for small batches
            datasets
                .iter()
                .map(|dataset| self.build_one(dataset, config))
                .collect()
        } else {
            debug!(parties = datasets.len(), "Building candidate blocks in parallel");
            datasets
                .par_iter()
                .map(|dataset| self.build_one(dataset, config))
                .collect()
        }
    }

    fn generate_blocks(
        &self,
        results: &[CandidateBlockingResult],
        k: usize,
    ) -> Result<Vec<ReversedIndex>, BlockingError> {
        let merged = domain::generate_blocks(results, k)?;
        let candidates = results.iter().map(|r| r.blocks.len()).sum();
        let kept = merged.iter().map(ReversedIndex::len).sum();
        self.metrics.record_merge(candidates, kept);
        Ok(merged)
    }

    fn assess_blocks_2party(
        &self,
        indices: &[ReversedIndex],
        truths: &[GroundTruth],
    ) -> Result<BlockingAssessment, BlockingError> {
        let assessment = domain::assess_blocks_2party(indices, truths)?;
        self.metrics.record_assessment();
        Ok(assessment)
    }
}
