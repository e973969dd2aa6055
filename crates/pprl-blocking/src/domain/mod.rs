//! Domain Layer - Pure blocking logic
//!
//! This layer contains:
//! - Signature generation and phonetic encoding
//! - Blocking bloom filters and the counting filter used by the merger
//! - Configuration with validation
//! - P-Sig and Lambda-fold indexers
//! - Block statistics
//! - Multi-party block merging
//! - Two-party assessment
//! - String similarity measures
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod blocks;
pub mod bloom_filter;
pub mod config;
pub mod counting_bloom;
pub mod evaluation;
pub mod hash_functions;
pub mod index;
pub mod lambda_fold;
pub mod phonetic;
pub mod psig;
pub mod signature;
pub mod sim_measure;
pub mod stats;
pub mod types;

pub use blocks::{compress_block_key, generate_blocks, generate_reverse_blocks};
pub use bloom_filter::{generate_bloom_filter, BloomFilter};
pub use config::{
    BlockingConfig, BlockingFilterConfig, BlockingSchema, LambdaFoldConfig,
    LambdaFoldConfigBuilder, OccurrenceFilter, PSigConfig, PSigConfigBuilder, SharedConfig,
    LAMBDA_FOLD, PSIG,
};
pub use counting_bloom::CountingBloomFilter;
pub use evaluation::{assess_blocks_2party, BlockingAssessment, GroundTruth};
pub use hash_functions::flip_bloom_filter;
pub use index::{
    generate_candidate_blocks, BlockingIndex, CandidateBlockingResult, IndexState,
    ReversedIndexResult,
};
pub use lambda_fold::LambdaFoldIndex;
pub use phonetic::{double_metaphone, MetaphoneCode};
pub use psig::PSigIndex;
pub use signature::{
    generate_signatures, CharactersAtConfig, FeatureSpec, RawPosition, SignatureGenerator,
    SignatureGroup,
};
pub use sim_measure::{DiceSim, DiceSimConfig, EditSim, EditSimConfig, SimMeasure};
pub use stats::{BlockStats, GroupStats};
pub use types::{
    records_from, BlockKey, BloomSet, FeatureRef, Record, RecordId, ReversedIndex, SignatureIndex,
};
