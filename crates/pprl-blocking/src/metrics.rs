//! Metrics hooks for blocking operations
//!
//! Counters for index builds, merges and assessments, recorded by
//! [`crate::service::BlockingService`] through the [`MetricsRecorder`] trait.
//!
//! ## Usage
//!
//! ```ignore
//! use pprl_blocking::metrics::{Metrics, MetricsRecorder};
//!
//! let metrics = Metrics::new();
//! let start = std::time::Instant::now();
//! let result = generate_candidate_blocks(&records, &config, None)?;
//! metrics.record_index_built(records.len(), result.blocks.len(), 0, start.elapsed());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for blocking operations
///
/// Thread-safe counters, safe to share across parallel party builds.
#[derive(Default)]
pub struct Metrics {
    /// Total candidate indexes built
    pub indexes_built: AtomicU64,
    /// Total records fed into index builds
    pub records_indexed: AtomicU64,
    /// Distinct signatures that survived filtering (P-Sig)
    pub signatures_generated: AtomicU64,
    /// Candidate blocks emitted by index builds
    pub blocks_emitted: AtomicU64,
    /// Multi-party merges performed
    pub merges_performed: AtomicU64,
    /// Candidate blocks removed by merges
    pub blocks_dropped: AtomicU64,
    /// Two-party assessments run
    pub assessments_run: AtomicU64,
    /// Cumulative build time in nanoseconds
    pub build_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one index build
    ///
    /// # Arguments
    /// * `records` - Records of the party
    /// * `blocks` - Candidate blocks produced
    /// * `signatures` - Surviving signatures, 0 for Lambda-fold
    /// * `duration` - Build time
    pub fn record_index_built(&self, records: usize, blocks: usize, signatures: usize, duration: Duration) {
        self.indexes_built.fetch_add(1, Ordering::Relaxed);
        self.records_indexed.fetch_add(records as u64, Ordering::Relaxed);
        self.blocks_emitted.fetch_add(blocks as u64, Ordering::Relaxed);
        self.signatures_generated.fetch_add(signatures as u64, Ordering::Relaxed);
        self.build_time_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record a merge that kept `kept` of `candidates` blocks across all parties
    pub fn record_merge(&self, candidates: usize, kept: usize) {
        self.merges_performed.fetch_add(1, Ordering::Relaxed);
        self.blocks_dropped
            .fetch_add(candidates.saturating_sub(kept) as u64, Ordering::Relaxed);
    }

    pub fn record_assessment(&self) {
        self.assessments_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            indexes_built: self.indexes_built.load(Ordering::Relaxed),
            records_indexed: self.records_indexed.load(Ordering::Relaxed),
            signatures_generated: self.signatures_generated.load(Ordering::Relaxed),
            blocks_emitted: self.blocks_emitted.load(Ordering::Relaxed),
            merges_performed: self.merges_performed.load(Ordering::Relaxed),
            blocks_dropped: self.blocks_dropped.load(Ordering::Relaxed),
            assessments_run: self.assessments_run.load(Ordering::Relaxed),
            avg_build_ns: self.avg_build_time_ns(),
        }
    }

    /// Average build time in nanoseconds
    pub fn avg_build_time_ns(&self) -> u64 {
        let total = self.build_time_ns.load(Ordering::Relaxed);
        let count = self.indexes_built.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Fraction of candidate blocks removed by merges
    pub fn drop_rate(&self) -> f64 {
        let emitted = self.blocks_emitted.load(Ordering::Relaxed);
        let dropped = self.blocks_dropped.load(Ordering::Relaxed);
        if emitted > 0 {
            dropped as f64 / emitted as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.indexes_built.store(0, Ordering::Relaxed);
        self.records_indexed.store(0, Ordering::Relaxed);
        self.signatures_generated.store(0, Ordering::Relaxed);
        self.blocks_emitted.store(0, Ordering::Relaxed);
        self.merges_performed.store(0, Ordering::Relaxed);
        self.blocks_dropped.store(0, Ordering::Relaxed);
        self.assessments_run.store(0, Ordering::Relaxed);
        self.build_time_ns.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub indexes_built: u64,
    pub records_indexed: u64,
    pub signatures_generated: u64,
    pub blocks_emitted: u64,
    pub merges_performed: u64,
    pub blocks_dropped: u64,
    pub assessments_run: u64,
    pub avg_build_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to forward blocking metrics to an external system.
pub trait MetricsRecorder: Send + Sync {
    fn record_index_built(&self, records: usize, blocks: usize, signatures: usize, duration: Duration);

    fn record_merge(&self, candidates: usize, kept: usize);

    fn record_assessment(&self);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_index_built(&self, _: usize, _: usize, _: usize, _: Duration) {}
    fn record_merge(&self, _: usize, _: usize) {}
    fn record_assessment(&self) {}
}

impl MetricsRecorder for Metrics {
    fn record_index_built(&self, records: usize, blocks: usize, signatures: usize, duration: Duration) {
        Metrics::record_index_built(self, records, blocks, signatures, duration);
    }

    fn record_merge(&self, candidates: usize, kept: usize) {
        Metrics::record_merge(self, candidates, kept);
    }

    fn record_assessment(&self) {
        Metrics::record_assessment(self);
    }
}
