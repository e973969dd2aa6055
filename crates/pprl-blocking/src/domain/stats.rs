//! Block statistics
//!
//! Pure summaries over reversed indices. Empty indices produce all-zero
//! statistics rather than errors.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use super::types::{RecordId, SignatureIndex};

/// Summary of the block sizes of one reversed index
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlockStats {
    pub num_of_blocks: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub mean_size: f64,
    pub median_size: f64,
    /// Population standard deviation, 0 with at most one block
    pub std_size: f64,
    pub sum_of_blocks: usize,
    /// Mean number of blocks a covered record belongs to
    pub blocks_per_record: f64,
    /// Records that ended up in no block
    pub num_filtered_elements: usize,
    /// Fraction of records in at least one block, within [0, 1]
    pub coverage: f64,
}

/// Statistics of one signature group of a P-Sig build
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupStats {
    pub group: usize,
    #[serde(flatten)]
    pub stats: BlockStats,
}

/// Size statistics of a list of block sizes, without coverage
pub fn block_size_stats(sizes: &[usize]) -> BlockStats {
    if sizes.is_empty() {
        return BlockStats::default();
    }

    let count = sizes.len();
    let sum: usize = sizes.iter().sum();
    let mean = sum as f64 / count as f64;

    let mut sorted = sizes.to_vec();
    sorted.sort_unstable();
    let median = if count % 2 == 1 {
        sorted[count / 2] as f64
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) as f64 / 2.0
    };

    let std = if count <= 1 {
        0.0
    } else {
        let variance = sizes
            .iter()
            .map(|&s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / count as f64;
        variance.sqrt()
    };

    BlockStats {
        num_of_blocks: count,
        min_size: sorted[0],
        max_size: sorted[count - 1],
        mean_size: mean,
        median_size: median,
        std_size: std,
        sum_of_blocks: sum,
        ..Default::default()
    }
}

/// Statistics of a reversed index whose blocks cover `total_records` records
pub fn reversed_index_stats<K>(index: &BTreeMap<K, Vec<RecordId>>, total_records: usize) -> BlockStats {
    let sizes: Vec<usize> = index.values().map(Vec::len).collect();
    let mut stats = block_size_stats(&sizes);

    let mut memberships: HashMap<&RecordId, usize> = HashMap::new();
    for record in index.values().flatten() {
        *memberships.entry(record).or_insert(0) += 1;
    }
    let covered = memberships.len().min(total_records);

    stats.blocks_per_record = if memberships.is_empty() {
        0.0
    } else {
        memberships.values().sum::<usize>() as f64 / memberships.len() as f64
    };
    stats.num_filtered_elements = total_records - covered;
    stats.coverage = if total_records == 0 {
        0.0
    } else {
        covered as f64 / total_records as f64
    };
    stats
}

/// Statistics per signature group
///
/// Every record contributes at most one signature per group, so the sum of
/// block sizes is the number of covered records.
pub fn per_group_stats(indices: &[SignatureIndex], total_records: usize) -> Vec<GroupStats> {
    indices
        .iter()
        .enumerate()
        .map(|(group, index)| {
            let sizes: Vec<usize> = index.values().map(Vec::len).collect();
            let mut stats = block_size_stats(&sizes);
            let covered = stats.sum_of_blocks.min(total_records);
            stats.num_filtered_elements = total_records - covered;
            stats.coverage = if total_records == 0 {
                0.0
            } else {
                covered as f64 / total_records as f64
            };
            stats.blocks_per_record = if covered == 0 { 0.0 } else { 1.0 };
            GroupStats { group, stats }
        })
        .collect()
}

impl BlockStats {
    /// Log the summary of a build, warning when records were stranded
    pub fn log_summary(&self, algorithm: &str) {
        info!(
            algorithm,
            blocks = self.num_of_blocks,
            min_size = self.min_size,
            max_size = self.max_size,
            mean_size = self.mean_size,
            median_size = self.median_size,
            std_size = self.std_size,
            "Reversed index built"
        );
        if self.coverage < 1.0 {
            warn!(
                algorithm,
                coverage = self.coverage,
                stranded = self.num_filtered_elements,
                "Some records are not in any block"
            );
        }
    }
}
