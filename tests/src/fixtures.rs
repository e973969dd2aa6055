//! # Test Fixtures
//!
//! Reference datasets, ready-made configs and a seeded generator of
//! synthetic parties with known ground truth.

use pprl_blocking::domain::{CharactersAtConfig, FeatureRef, FeatureSpec, RawPosition};
use pprl_blocking::{
    BlockingConfig, Dataset, GroundTruth, LambdaFoldConfigBuilder, PSigConfigBuilder,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Once;

static INIT: Once = Once::new();

/// Install a test log subscriber once per test binary; `RUST_LOG` filters it
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const FIRST_NAMES: [&str; 16] = [
    "Joyce", "Fred", "Lindsay", "Max", "Li", "Jone", "Fredrick", "Xu", "Anna", "Anne",
    "Peter", "Pete", "Sarah", "Sara", "Tom", "Thomas",
];

pub const LAST_NAMES: [&str; 12] = [
    "Wang", "Yu", "Lin", "Zhang", "Hsu", "Shan", "Cheung", "Smith", "Schmidt", "Jones",
    "Brown", "Braun",
];

pub const SUBURBS: [&str; 6] = [
    "Ashfield", "Burwood", "Lewishm", "Strathfield", "Chippendale", "Narwee",
];

/// A party's dataset and the entity behind each record
pub struct SyntheticParty {
    pub dataset: Dataset,
    pub truth: GroundTruth,
}

/// Generate `parties` datasets of `size` records each.
///
/// Records are drawn from a shared pool of `entities` people, so parties
/// overlap. Rows are `[record id, first name, last name, suburb]`.
pub fn synthetic_parties(seed: u64, parties: usize, size: usize, entities: usize) -> Vec<SyntheticParty> {
    let mut rng = StdRng::seed_from_u64(seed);
    let people: Vec<[&str; 3]> = (0..entities)
        .map(|_| {
            [
                FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
                LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())],
                SUBURBS[rng.gen_range(0..SUBURBS.len())],
            ]
        })
        .collect();

    (0..parties)
        .map(|party| {
            let mut records = Vec::with_capacity(size);
            let mut truth = Vec::with_capacity(size);
            for row in 0..size {
                let entity = rng.gen_range(0..entities);
                let [first, last, suburb] = people[entity];
                let id = format!("p{}-{}", party, row);
                records.push(vec![id.clone(), first.to_string(), last.to_string(), suburb.to_string()]);
                truth.push((id, format!("e{}", entity)));
            }
            SyntheticParty {
                dataset: Dataset::new(records),
                truth: GroundTruth::labelled(truth),
            }
        })
        .collect()
}

/// P-Sig over full first name and its first two characters
pub fn psig_name_config(k: usize, bf_len: usize, compress: bool) -> BlockingConfig {
    PSigConfigBuilder::new()
        .blocking_features([1usize])
        .record_id_col(0)
        .count_filter(0, 5)
        .bloom_filter(k, bf_len)
        .compress_block_key(compress)
        .signature(vec![FeatureSpec::FeatureValue { feature: FeatureRef::Index(1) }])
        .signature(vec![FeatureSpec::CharactersAt {
            feature: FeatureRef::Index(1),
            config: CharactersAtConfig {
                pos: vec![RawPosition::from("0:2")],
            },
        }])
        .build()
        .expect("valid p-sig config")
        .into()
}

/// Lambda-fold over first and last name
pub fn lambda_name_config() -> BlockingConfig {
    LambdaFoldConfigBuilder::new()
        .blocking_features([1usize, 2])
        .record_id_col(0)
        .lambda(5)
        .bf_len(2000)
        .num_hash_funcs(500)
        .k(30)
        .random_state(0)
        .build()
        .expect("valid lambda-fold config")
        .into()
}

/// P-Sig for larger synthetic parties: first name, and surname code with suburb
pub fn psig_ratio_config() -> BlockingConfig {
    PSigConfigBuilder::new()
        .blocking_features([1usize, 2, 3])
        .record_id_col(0)
        .ratio_filter(0.0, 0.5)
        .bloom_filter(10, 1024)
        .signature(vec![FeatureSpec::FeatureValue { feature: FeatureRef::Index(1) }])
        .signature(vec![
            FeatureSpec::Metaphone { feature: FeatureRef::Index(2) },
            FeatureSpec::FeatureValue { feature: FeatureRef::Index(3) },
        ])
        .build()
        .expect("valid p-sig config")
        .into()
}
