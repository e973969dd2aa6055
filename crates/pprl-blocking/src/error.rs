//! Error types for the blocking engine

use thiserror::Error;

/// Errors that can occur while building, merging or assessing blocks
#[derive(Debug, Error)]
pub enum BlockingError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{algorithm}: all records are filtered out")]
    EmptyResult { algorithm: &'static str },

    #[error("Candidate blocking results use different algorithms: {expected} and {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Input data error: {0}")]
    InputData(#[from] DataError),
}

/// Errors raised while parsing or validating a blocking configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid blocking config: {0}")]
    Parse(String),

    #[error("The algorithm {0} is not supported yet")]
    UnsupportedAlgorithm(String),

    #[error("Argument \"{0}\" is not specified")]
    MissingField(&'static str),

    #[error("Features must be addressed either all by index or all by name")]
    MixedFeatureTypes,

    #[error("Missing information to map from feature name to index")]
    MissingHeader,

    #[error("Header has {header} columns but records have {record}")]
    HeaderWidthMismatch { header: usize, record: usize },

    #[error("Feature {0} is not in the dataset")]
    UnknownFeature(String),

    #[error("Invalid pos argument: {0}")]
    InvalidPosition(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Threshold K={k} must satisfy 2 <= K <= {parties} (number of parties)")]
    InvalidThreshold { k: usize, parties: usize },

    #[error("Inconsistent blocking states: {0}")]
    InconsistentStates(String),
}

/// Errors caused by the records handed to the engine
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Party {party} has no records")]
    EmptyParty { party: usize },

    #[error("Record {record} has {width} fields, feature index {index} is out of range")]
    FieldOutOfRange {
        record: usize,
        index: usize,
        width: usize,
    },

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Encoding of record {record} has {bits} bits, expected at least {expected}")]
    EncodingTooShort {
        record: usize,
        bits: usize,
        expected: usize,
    },

    #[error("Record {0} has no ground truth entity")]
    UnknownRecord(String),

    #[error("Assessment supports exactly two parties, got {0}")]
    NotTwoParty(usize),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for BlockingError {
    fn from(err: serde_json::Error) -> Self {
        BlockingError::Configuration(err.into())
    }
}
