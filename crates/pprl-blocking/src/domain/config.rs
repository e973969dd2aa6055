//! Blocking configuration and validation
//!
//! The outer wire shape is a [`BlockingSchema`] (`version`, `type`, `config`).
//! [`BlockingSchema::into_config`] dispatches on `type` and returns a typed,
//! validated [`BlockingConfig`].
//!
//! # Example
//!
//! ```ignore
//! use pprl_blocking::domain::BlockingSchema;
//!
//! let config = BlockingSchema::from_json(r#"{
//!     "version": 1,
//!     "type": "p-sig",
//!     "config": {
//!         "blocking-features": [1],
//!         "filter": {"type": "ratio", "max": 0.5, "min": 0.0},
//!         "blocking-filter": {"type": "bloom filter", "number-hash-functions": 4, "bf-len": 2048},
//!         "signatureSpecs": [[{"type": "feature-value", "feature": 1}]]
//!     }
//! }"#)?
//! .into_config()?;
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::TryFrom;

use super::signature::{check_feature_kinds, CharPosition, FeatureSpec, SignatureGroup};
use super::types::{FeatureRef, RecordId};
use crate::error::{ConfigError, DataError};

/// Wire name of the P-Sig algorithm
pub const PSIG: &str = "p-sig";
/// Wire name of the Lambda-fold algorithm
pub const LAMBDA_FOLD: &str = "lambda-fold";

/// Outer blocking schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockingSchema {
    pub version: u32,
    #[serde(rename = "type", default)]
    pub blocking_type: Option<String>,
    #[serde(default)]
    pub config: Option<Value>,
}

impl BlockingSchema {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Resolve the algorithm and parse its validated config
    pub fn into_config(self) -> Result<BlockingConfig, ConfigError> {
        let blocking_type = self.blocking_type.ok_or(ConfigError::MissingField("type"))?;
        match blocking_type.as_str() {
            PSIG => {
                let raw = self.config.ok_or(ConfigError::MissingField("config"))?;
                let config: PSigConfig = serde_json::from_value(raw)?;
                config.validate()?;
                Ok(BlockingConfig::PSig(config))
            }
            LAMBDA_FOLD => {
                let raw = self.config.ok_or(ConfigError::MissingField("config"))?;
                let config: LambdaFoldConfig = serde_json::from_value(raw)?;
                config.validate()?;
                Ok(BlockingConfig::LambdaFold(config))
            }
            other => Err(ConfigError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Validated configuration of one blocking algorithm
#[derive(Clone, Debug, PartialEq)]
pub enum BlockingConfig {
    PSig(PSigConfig),
    LambdaFold(LambdaFoldConfig),
}

impl BlockingConfig {
    /// Parse and validate a full blocking schema
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        BlockingSchema::from_json(json)?.into_config()
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        BlockingSchema::from_value(value)?.into_config()
    }

    /// Wire name of the algorithm
    pub fn algorithm(&self) -> &'static str {
        match self {
            BlockingConfig::PSig(_) => PSIG,
            BlockingConfig::LambdaFold(_) => LAMBDA_FOLD,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            BlockingConfig::PSig(config) => config.validate(),
            BlockingConfig::LambdaFold(config) => config.validate(),
        }
    }

    pub fn shared(&self) -> &SharedConfig {
        match self {
            BlockingConfig::PSig(config) => &config.shared,
            BlockingConfig::LambdaFold(config) => &config.shared,
        }
    }
}

impl From<PSigConfig> for BlockingConfig {
    fn from(config: PSigConfig) -> Self {
        BlockingConfig::PSig(config)
    }
}

impl From<LambdaFoldConfig> for BlockingConfig {
    fn from(config: LambdaFoldConfig) -> Self {
        BlockingConfig::LambdaFold(config)
    }
}

/// Settings common to every algorithm
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedConfig {
    #[serde(rename = "blocking-features", alias = "blocking_features", default)]
    pub blocking_features: Vec<FeatureRef>,
    /// Column holding the record id; positional ids when absent
    #[serde(rename = "record-id-col", default)]
    pub record_id_col: Option<usize>,
    /// Field value that marks a missing field
    #[serde(rename = "null-sentinel", default)]
    pub null_sentinel: String,
}

impl SharedConfig {
    /// Identifier of the record at `row`
    pub fn record_id(&self, row: usize, record: &[String]) -> Result<RecordId, DataError> {
        match self.record_id_col {
            None => Ok(RecordId::Index(row)),
            Some(col) => record
                .get(col)
                .map(|label| RecordId::Label(label.clone()))
                .ok_or(DataError::FieldOutOfRange {
                    record: row,
                    index: col,
                    width: record.len(),
                }),
        }
    }
}

// ============================================================================
// P-Sig
// ============================================================================

/// Signature occurrence filter; both bounds are exclusive
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OccurrenceFilter {
    /// Bounds relative to the dataset size: `n * min < |v| < n * max`
    Ratio {
        #[serde(default)]
        min: f64,
        max: f64,
    },
    /// Absolute bounds: `min < |v| < max`
    Count { min: usize, max: usize },
}

impl Default for OccurrenceFilter {
    fn default() -> Self {
        OccurrenceFilter::Ratio { min: 0.0, max: 1.0 }
    }
}

impl OccurrenceFilter {
    /// Whether a signature seen in `occurrences` of `n` records is kept
    pub fn keeps(&self, occurrences: usize, n: usize) -> bool {
        match *self {
            OccurrenceFilter::Ratio { min, max } => {
                let occurrences = occurrences as f64;
                let n = n as f64;
                n * min < occurrences && occurrences < n * max
            }
            OccurrenceFilter::Count { min, max } => min < occurrences && occurrences < max,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            OccurrenceFilter::Ratio { min, max } => {
                if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) {
                    return Err(ConfigError::InvalidParameter(format!(
                        "ratio filter bounds must be within [0, 1], got min={} max={}",
                        min, max
                    )));
                }
                if min >= max {
                    return Err(ConfigError::InvalidParameter(format!(
                        "ratio filter min ({}) must be below max ({})",
                        min, max
                    )));
                }
            }
            OccurrenceFilter::Count { min, max } => {
                if min >= max {
                    return Err(ConfigError::InvalidParameter(format!(
                        "count filter min ({}) must be below max ({})",
                        min, max
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Kind of blocking filter; only bloom filters exist
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockingFilterType {
    #[default]
    #[serde(rename = "bloom filter")]
    BloomFilter,
}

/// Bloom filter used to turn surviving signatures into block keys
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingFilterConfig {
    #[serde(rename = "type", default)]
    pub filter_type: BlockingFilterType,
    #[serde(rename = "number-hash-functions")]
    pub num_hash_funcs: usize,
    #[serde(rename = "bf-len")]
    pub bf_len: usize,
    /// Replace merged keys by a 5-byte digest
    #[serde(rename = "compress-block-key", default)]
    pub compress_block_key: bool,
}

impl Default for BlockingFilterConfig {
    fn default() -> Self {
        Self {
            filter_type: BlockingFilterType::BloomFilter,
            num_hash_funcs: 4,
            bf_len: 2048,
            compress_block_key: false,
        }
    }
}

impl BlockingFilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bf_len == 0 {
            return Err(ConfigError::InvalidParameter(
                "bf-len cannot be 0".to_string(),
            ));
        }
        if self.num_hash_funcs == 0 {
            return Err(ConfigError::InvalidParameter(
                "number-hash-functions cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// P-Sig configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PSigConfig {
    #[serde(flatten)]
    pub shared: SharedConfig,
    pub filter: OccurrenceFilter,
    #[serde(rename = "blocking-filter")]
    pub blocking_filter: BlockingFilterConfig,
    #[serde(rename = "signatureSpecs")]
    pub signatures: Vec<SignatureGroup>,
}

impl PSigConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.validate()?;
        self.blocking_filter.validate()?;

        if self.signatures.is_empty() {
            return Err(ConfigError::MissingField("signatureSpecs"));
        }
        if let Some(i) = self.signatures.iter().position(|group| group.is_empty()) {
            return Err(ConfigError::InvalidParameter(format!(
                "signature group {} has no feature specs",
                i
            )));
        }

        check_feature_kinds(
            self.shared
                .blocking_features
                .iter()
                .chain(self.signatures.iter().flatten().map(FeatureSpec::feature)),
        )?;

        for spec in self.signatures.iter().flatten() {
            if let FeatureSpec::CharactersAt { config, .. } = spec {
                for pos in &config.pos {
                    CharPosition::try_from(pos)?;
                }
            }
        }
        Ok(())
    }
}

/// Builder for [`PSigConfig`] with validation
#[derive(Default)]
pub struct PSigConfigBuilder {
    shared: SharedConfig,
    filter: Option<OccurrenceFilter>,
    blocking_filter: Option<BlockingFilterConfig>,
    signatures: Vec<SignatureGroup>,
}

impl PSigConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocking_features<I, F>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FeatureRef>,
    {
        self.shared.blocking_features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn record_id_col(mut self, col: usize) -> Self {
        self.shared.record_id_col = Some(col);
        self
    }

    pub fn null_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.shared.null_sentinel = sentinel.into();
        self
    }

    /// Keep signatures seen in more than `n * min` and fewer than `n * max` records
    pub fn ratio_filter(mut self, min: f64, max: f64) -> Self {
        self.filter = Some(OccurrenceFilter::Ratio { min, max });
        self
    }

    /// Keep signatures seen in more than `min` and fewer than `max` records
    pub fn count_filter(mut self, min: usize, max: usize) -> Self {
        self.filter = Some(OccurrenceFilter::Count { min, max });
        self
    }

    pub fn bloom_filter(mut self, num_hash_funcs: usize, bf_len: usize) -> Self {
        let compress = self
            .blocking_filter
            .as_ref()
            .map(|f| f.compress_block_key)
            .unwrap_or(false);
        self.blocking_filter = Some(BlockingFilterConfig {
            filter_type: BlockingFilterType::BloomFilter,
            num_hash_funcs,
            bf_len,
            compress_block_key: compress,
        });
        self
    }

    pub fn compress_block_key(mut self, compress: bool) -> Self {
        self.blocking_filter
            .get_or_insert_with(BlockingFilterConfig::default)
            .compress_block_key = compress;
        self
    }

    /// Append one signature group
    pub fn signature(mut self, group: SignatureGroup) -> Self {
        self.signatures.push(group);
        self
    }

    pub fn build(self) -> Result<PSigConfig, ConfigError> {
        let config = PSigConfig {
            shared: self.shared,
            filter: self.filter.unwrap_or_default(),
            blocking_filter: self.blocking_filter.unwrap_or_default(),
            signatures: self.signatures,
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Lambda-fold
// ============================================================================

/// Lambda-fold configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LambdaFoldConfig {
    #[serde(flatten)]
    pub shared: SharedConfig,
    /// Number of independent tables (degree of redundancy)
    #[serde(rename = "Lambda")]
    pub lambda: usize,
    #[serde(rename = "bf-len")]
    pub bf_len: usize,
    #[serde(rename = "num-hash-funcs")]
    pub num_hash_funcs: usize,
    /// Bits sampled per table
    #[serde(rename = "K")]
    pub k: usize,
    /// The blocking feature holds a base64 CLK rather than PII
    #[serde(rename = "input-clks", default)]
    pub input_clks: bool,
    #[serde(default)]
    pub random_state: u64,
}

impl LambdaFoldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shared.blocking_features.is_empty() {
            return Err(ConfigError::MissingField("blocking-features"));
        }
        check_feature_kinds(self.shared.blocking_features.iter())?;

        if self.lambda == 0 {
            return Err(ConfigError::InvalidParameter("Lambda cannot be 0".to_string()));
        }
        if self.bf_len == 0 {
            return Err(ConfigError::InvalidParameter("bf-len cannot be 0".to_string()));
        }
        if self.k == 0 || self.k > self.bf_len {
            return Err(ConfigError::InvalidParameter(format!(
                "K={} must be between 1 and bf-len={}",
                self.k, self.bf_len
            )));
        }
        if self.input_clks {
            if self.shared.blocking_features.len() != 1 {
                return Err(ConfigError::InvalidParameter(format!(
                    "input-clks needs exactly one blocking feature, got {}",
                    self.shared.blocking_features.len()
                )));
            }
        } else if self.num_hash_funcs == 0 {
            return Err(ConfigError::InvalidParameter(
                "num-hash-funcs cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`LambdaFoldConfig`] with validation
pub struct LambdaFoldConfigBuilder {
    shared: SharedConfig,
    lambda: usize,
    bf_len: usize,
    num_hash_funcs: usize,
    k: usize,
    input_clks: bool,
    random_state: u64,
}

impl Default for LambdaFoldConfigBuilder {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            lambda: 5,
            bf_len: 2000,
            num_hash_funcs: 500,
            k: 30,
            input_clks: false,
            random_state: 0,
        }
    }
}

impl LambdaFoldConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocking_features<I, F>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FeatureRef>,
    {
        self.shared.blocking_features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn record_id_col(mut self, col: usize) -> Self {
        self.shared.record_id_col = Some(col);
        self
    }

    pub fn lambda(mut self, lambda: usize) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn bf_len(mut self, bf_len: usize) -> Self {
        self.bf_len = bf_len;
        self
    }

    pub fn num_hash_funcs(mut self, num_hash_funcs: usize) -> Self {
        self.num_hash_funcs = num_hash_funcs;
        self
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn input_clks(mut self, input_clks: bool) -> Self {
        self.input_clks = input_clks;
        self
    }

    pub fn random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn build(self) -> Result<LambdaFoldConfig, ConfigError> {
        let config = LambdaFoldConfig {
            shared: self.shared,
            lambda: self.lambda,
            bf_len: self.bf_len,
            num_hash_funcs: self.num_hash_funcs,
            k: self.k,
            input_clks: self.input_clks,
            random_state: self.random_state,
        };
        config.validate()?;
        Ok(config)
    }
}
