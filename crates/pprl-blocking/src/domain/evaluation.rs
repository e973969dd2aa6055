//! Blocking assessment against ground truth
//!
//! Two parties only. Reduction ratio measures how many record pairs blocking
//! saves; pair completeness measures how many true matches survive.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use super::types::{RecordId, ReversedIndex};
use crate::error::{BlockingError, DataError};

/// Entity id of every record of one party
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroundTruth {
    entities: BTreeMap<RecordId, String>,
}

impl GroundTruth {
    /// Ground truth for positional record ids: `entities[i]` is row `i`
    pub fn positional<I, S>(entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entities: entities
                .into_iter()
                .enumerate()
                .map(|(row, entity)| (RecordId::Index(row), entity.into()))
                .collect(),
        }
    }

    /// Ground truth keyed by explicit record ids
    pub fn labelled<I, R, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, S)>,
        R: Into<RecordId>,
        S: Into<String>,
    {
        Self {
            entities: pairs
                .into_iter()
                .map(|(id, entity)| (id.into(), entity.into()))
                .collect(),
        }
    }

    /// Number of records of the party
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: &RecordId) -> Result<&str, DataError> {
        self.entities
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| DataError::UnknownRecord(id.to_string()))
    }

    fn entity_set(&self) -> HashSet<&str> {
        self.entities.values().map(String::as_str).collect()
    }
}

/// Outcome of a two-party blocking assessment
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlockingAssessment {
    /// `1 - candidate_pairs / total_record_pairs`
    pub reduction_ratio: f64,
    /// Fraction of true matches sharing at least one block
    pub pair_completeness: f64,
    pub candidate_pairs: usize,
    pub true_matches_found: usize,
    pub false_matches_found: usize,
    pub total_true_matches: usize,
    pub total_record_pairs: usize,
}

/// Assess the merged blocks of two parties.
///
/// Candidate pairs are counted once per (entity_a, entity_b) combination,
/// however many blocks the pair shares.
pub fn assess_blocks_2party(
    indices: &[ReversedIndex],
    truths: &[GroundTruth],
) -> Result<BlockingAssessment, BlockingError> {
    let ([index_a, index_b], [truth_a, truth_b]) = (indices, truths) else {
        return Err(DataError::NotTwoParty(indices.len().max(truths.len())).into());
    };
    for (party, truth) in truths.iter().enumerate() {
        if truth.is_empty() {
            return Err(DataError::EmptyParty { party }.into());
        }
    }

    let mut cand_pairs: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut true_matches = 0usize;
    let mut false_matches = 0usize;
    let mut shared_keys = 0usize;

    for (key, recs_a) in index_a {
        let Some(recs_b) = index_b.get(key) else {
            continue;
        };
        shared_keys += 1;
        for rec_a in recs_a {
            let entity_a = truth_a.entity(rec_a)?;
            let seen = cand_pairs.entry(entity_a).or_default();
            for rec_b in recs_b {
                let entity_b = truth_b.entity(rec_b)?;
                if seen.insert(entity_b) {
                    if entity_a == entity_b {
                        true_matches += 1;
                    } else {
                        false_matches += 1;
                    }
                }
            }
        }
    }
    debug!(shared_keys, "Shared blocks assessed");

    let candidate_pairs = true_matches + false_matches;
    let total_record_pairs = truth_a.len() * truth_b.len();
    let total_true_matches = truth_a
        .entity_set()
        .intersection(&truth_b.entity_set())
        .count();

    let reduction_ratio = 1.0 - candidate_pairs as f64 / total_record_pairs as f64;
    let pair_completeness = if total_true_matches == 0 {
        warn!("No true matches between the two parties, pair completeness is 0");
        0.0
    } else {
        true_matches as f64 / total_true_matches as f64
    };
    info!(
        rr = reduction_ratio,
        pc = pair_completeness,
        candidate_pairs,
        "Blocking assessed"
    );

    Ok(BlockingAssessment {
        reduction_ratio,
        pair_completeness,
        candidate_pairs,
        true_matches_found: true_matches,
        false_matches_found: false_matches,
        total_true_matches,
        total_record_pairs,
    })
}
