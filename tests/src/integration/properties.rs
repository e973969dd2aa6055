//! # Invariants Over Synthetic Data
//!
//! Seeded synthetic parties drawn from a shared pool of people, checked
//! against the properties every build, merge and assessment must hold.

#[cfg(test)]
mod tests {
    use pprl_blocking::domain::ReversedIndex;
    use pprl_blocking::{BlockingApi, BlockingConfig, BlockingError, BlockingService, GroundTruth};
    use proptest::prelude::*;

    use crate::fixtures::{
        init_tracing, lambda_name_config, psig_ratio_config, synthetic_parties, SyntheticParty,
    };

    fn merge(
        config: &BlockingConfig,
        parties: &[SyntheticParty],
        k: usize,
    ) -> Result<Vec<ReversedIndex>, BlockingError> {
        let service = BlockingService::new();
        let datasets: Vec<_> = parties.iter().map(|p| p.dataset.clone()).collect();
        let results = service
            .generate_candidate_blocks_parallel(&datasets, config)
            .unwrap();
        service.generate_blocks(&results, k)
    }

    #[test]
    fn test_merged_keys_held_by_k_parties() {
        init_tracing();
        let parties = synthetic_parties(7, 5, 60, 40);
        for config in [psig_ratio_config(), lambda_name_config()] {
            for k in 2..=parties.len() {
                let merged = match merge(&config, &parties, k) {
                    Ok(merged) => merged,
                    Err(BlockingError::EmptyResult { .. }) => continue,
                    Err(other) => panic!("unexpected error {}", other),
                };
                assert!(merged.iter().all(|index| !index.is_empty()));
                for index in &merged {
                    for key in index.keys() {
                        let holders = merged.iter().filter(|other| other.contains_key(key)).count();
                        assert!(
                            holders >= k,
                            "{} key {} held by {} parties, K={}",
                            config.algorithm(),
                            key,
                            holders,
                            k
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_builds_are_deterministic() {
        let parties = synthetic_parties(11, 2, 50, 30);
        let service = BlockingService::new();
        for config in [psig_ratio_config(), lambda_name_config()] {
            let first = service
                .generate_candidate_blocks(&parties[0].dataset, &config)
                .unwrap();
            let second = service
                .generate_candidate_blocks(&parties[0].dataset, &config)
                .unwrap();
            assert_eq!(first.blocks, second.blocks, "{} must be deterministic", config.algorithm());
            assert_eq!(first.stats, second.stats);
        }
    }

    #[test]
    fn test_identical_parties_are_complete() {
        let parties = synthetic_parties(3, 1, 40, 25);
        let twin = SyntheticParty {
            dataset: parties[0].dataset.clone(),
            truth: parties[0].truth.clone(),
        };
        let both = [parties.into_iter().next().unwrap(), twin];
        let merged = merge(&lambda_name_config(), &both, 2).unwrap();

        let truths: Vec<GroundTruth> = both.iter().map(|p| p.truth.clone()).collect();
        let assessment = BlockingService::new()
            .assess_blocks_2party(&merged, &truths)
            .unwrap();
        assert_eq!(assessment.pair_completeness, 1.0, "Identical records share every table");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_build_is_non_empty_or_empty_result(seed in 0u64..1000, size in 1usize..30) {
            let parties = synthetic_parties(seed, 1, size, 20);
            let service = BlockingService::new();
            for config in [psig_ratio_config(), lambda_name_config()] {
                match service.generate_candidate_blocks(&parties[0].dataset, &config) {
                    Ok(result) => {
                        prop_assert!(!result.blocks.is_empty());
                        prop_assert!((0.0..=1.0).contains(&result.stats.coverage));
                    }
                    Err(BlockingError::EmptyResult { .. }) => {}
                    Err(other) => prop_assert!(false, "unexpected error {}", other),
                }
            }
        }

        #[test]
        fn prop_assessment_within_bounds(seed in 0u64..1000) {
            let parties = synthetic_parties(seed, 2, 30, 20);
            let merged = merge(&lambda_name_config(), &parties, 2);
            prop_assume!(merged.is_ok());
            let merged = merged.unwrap();
            let truths: Vec<GroundTruth> = parties.iter().map(|p| p.truth.clone()).collect();

            let assessment = BlockingService::new()
                .assess_blocks_2party(&merged, &truths)
                .unwrap();
            prop_assert!((0.0..=1.0).contains(&assessment.reduction_ratio));
            prop_assert!((0.0..=1.0).contains(&assessment.pair_completeness));
            prop_assert!(assessment.true_matches_found <= assessment.total_true_matches);
        }
    }
}
