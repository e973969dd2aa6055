//! # PPRL Blocking
//!
//! Privacy-preserving record-linkage blocking: group each party's records
//! into blocks so that only records sharing a block are compared, and keep
//! only the blocks enough parties agree on.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure blocking logic, no I/O
//!   - `SignatureGenerator`: Derives signature strings from record features
//!   - `PSigIndex`: Signature blocks keyed by bloom filter bit positions
//!   - `LambdaFoldIndex`: LSH blocks over sampled bloom filter bits
//!   - `generate_blocks`: Multi-party merge with a K-of-N threshold
//!   - `assess_blocks_2party`: Reduction ratio and pair completeness
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `BlockingApi`: Driving port (inbound API)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `BlockingService`: Implements `BlockingApi`, records metrics
//!
//! ## Invariants
//!
//! - **Determinism**: the same records and config always yield the same
//!   blocks, across runs and across parties (Lambda-fold is seeded).
//! - **Agreement**: after merging, every kept block key is held by at least
//!   `K` parties.
//! - **Coverage**: block statistics report coverage within `[0, 1]`.
//!
//! ## Usage Example
//!
//! ```ignore
//! use pprl_blocking::{BlockingConfig, BlockingApi, BlockingService, Dataset};
//!
//! let config = BlockingConfig::from_json(&std::fs::read_to_string("psig.json")?)?;
//! let service = BlockingService::new();
//!
//! let results = service.generate_candidate_blocks_parallel(&[alice, bob], &config)?;
//! let blocks = service.generate_blocks(&results, 2)?;
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use domain::{
    assess_blocks_2party, generate_blocks, generate_candidate_blocks, generate_reverse_blocks,
    generate_signatures, BlockKey, BlockStats, BlockingAssessment, BlockingConfig,
    CandidateBlockingResult, GroundTruth, LambdaFoldConfigBuilder, PSigConfigBuilder, Record,
    RecordId, ReversedIndex,
};
pub use error::{BlockingError, ConfigError, DataError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{BlockingApi, Dataset};
pub use service::BlockingService;
