//! # Reference Scenarios
//!
//! Small hand-checked datasets for both algorithms, configured from JSON the
//! way a linkage coordinator receives them.

#[cfg(test)]
mod tests {
    use pprl_blocking::domain::{flip_bloom_filter, BlockKey, ReversedIndex};
    use pprl_blocking::{
        BlockingApi, BlockingConfig, BlockingError, BlockingService, ConfigError, Dataset,
        GroundTruth, RecordId,
    };
    use serde_json::json;

    use crate::fixtures::{init_tracing, lambda_name_config, psig_name_config};

    fn rows(data: &[[&str; 4]]) -> Dataset {
        Dataset::new(pprl_blocking::domain::records_from(data))
    }

    fn ids(labels: &[&str]) -> Vec<RecordId> {
        labels.iter().map(|&l| RecordId::from(l)).collect()
    }

    fn alice() -> Dataset {
        rows(&[
            ["id1", "Joyce", "Wang", "Ashfield"],
            ["id2", "Joyce", "Hsu", "Burwood"],
            ["id3", "Joyce", "Shan", "Lewishm"],
            ["id4", "Fred", "Yu", "Strathfield"],
            ["id5", "Fred", "Zhang", "Chippendale"],
            ["id6", "Lindsay", "Jone", "Narwee"],
        ])
    }

    // =============================================================================
    // SCENARIO A: LAMBDA-FOLD, TWO PARTIES
    // =============================================================================

    #[test]
    fn test_lambda_fold_identical_names_share_every_table() {
        init_tracing();
        let service = BlockingService::new();
        let parties = vec![
            Dataset::new(pprl_blocking::domain::records_from(&[
                ["id1", "Joyce", "Wang"],
                ["id2", "Fred", "Yu"],
            ])),
            Dataset::new(pprl_blocking::domain::records_from(&[
                ["id3", "Joyce", "Wang"],
                ["id4", "Lindsay", "Lin"],
            ])),
        ];

        let results = service
            .generate_candidate_blocks_parallel(&parties, &lambda_name_config())
            .unwrap();
        let merged = service.generate_blocks(&results, 2).unwrap();

        assert_eq!(merged[0].len(), 5, "One block per table");
        assert_eq!(merged[1].len(), 5);
        assert!(merged[0].values().all(|block| block == &ids(&["id1"])));
        assert!(merged[1].values().all(|block| block == &ids(&["id3"])));
    }

    #[test]
    fn test_lambda_fold_from_json() {
        let config = BlockingConfig::from_value(json!({
            "version": 1,
            "type": "lambda-fold",
            "config": {
                "blocking-features": [1, 2],
                "Lambda": 5,
                "bf-len": 2000,
                "num-hash-funcs": 500,
                "K": 30,
                "input-clks": false,
                "random_state": 0,
                "record-id-col": 0
            }
        }))
        .unwrap();
        assert_eq!(config, lambda_name_config());
    }

    // =============================================================================
    // SCENARIO B: P-SIG FEATURE-VALUE SIGNATURES
    // =============================================================================

    #[test]
    fn test_psig_feature_value_block() {
        init_tracing();
        let config = BlockingConfig::from_json(
            r#"{
                "version": 1,
                "type": "p-sig",
                "config": {
                    "blocking-features": [1],
                    "record-id-col": 0,
                    "filter": {"type": "ratio", "max": 0.5, "min": 0.0},
                    "blocking-filter": {
                        "type": "bloom filter",
                        "number-hash-functions": 4,
                        "bf-len": 2048
                    },
                    "signatureSpecs": [[{"type": "feature-value", "feature": 1}]]
                }
            }"#,
        )
        .unwrap();

        let result = BlockingService::new()
            .generate_candidate_blocks(&alice(), &config)
            .unwrap();

        let fred = BlockKey::from(flip_bloom_filter("0_Fred", 2048, 4));
        assert_eq!(fred.to_string(), "(553, 1208, 1291, 1946)");
        assert_eq!(result.blocks[&fred], ids(&["id4", "id5"]));
        assert_eq!(result.stats.num_of_blocks, 2);
        assert_eq!(result.stats.num_filtered_elements, 3, "The three Joyces are dropped");
    }

    #[test]
    fn test_psig_named_features_need_header() {
        let config = BlockingConfig::from_value(json!({
            "version": 1,
            "type": "p-sig",
            "config": {
                "blocking-features": ["given"],
                "record-id-col": 0,
                "filter": {"type": "count", "min": 0, "max": 3},
                "blocking-filter": {"type": "bloom filter", "number-hash-functions": 4, "bf-len": 2048},
                "signatureSpecs": [
                    [{"type": "feature-value", "feature": "given"}],
                    [{"type": "metaphone", "feature": "surname"}]
                ]
            }
        }))
        .unwrap();
        let service = BlockingService::new();

        let missing = service.generate_candidate_blocks(&alice(), &config);
        assert!(matches!(
            missing,
            Err(BlockingError::Configuration(ConfigError::MissingHeader))
        ));

        let with_header = alice().with_header(["id", "given", "surname", "suburb"]);
        let result = service.generate_candidate_blocks(&with_header, &config).unwrap();
        let fred = BlockKey::from(flip_bloom_filter("0_Fred", 2048, 4));
        assert_eq!(result.blocks[&fred], ids(&["id4", "id5"]));
        assert_eq!(result.group_stats.len(), 2);
    }

    // =============================================================================
    // SCENARIO C: RATIO FILTER BOUNDARY
    // =============================================================================

    #[test]
    fn test_ratio_filter_drops_singletons_and_frequent_values() {
        // 6 records, keep 1.2 < |v| < 3.0
        let config = BlockingConfig::from_value(json!({
            "version": 1,
            "type": "p-sig",
            "config": {
                "record-id-col": 0,
                "filter": {"type": "ratio", "max": 0.5, "min": 0.2},
                "blocking-filter": {"type": "bloom filter", "number-hash-functions": 4, "bf-len": 2048},
                "signatureSpecs": [[{"type": "feature-value", "feature": 1}]]
            }
        }))
        .unwrap();

        let result = BlockingService::new()
            .generate_candidate_blocks(&alice(), &config)
            .unwrap();

        let mut expected = ReversedIndex::new();
        expected.insert(
            BlockKey::from(flip_bloom_filter("0_Fred", 2048, 4)),
            ids(&["id4", "id5"]),
        );
        assert_eq!(result.blocks, expected, "Only the value held by 2 records survives");
    }

    // =============================================================================
    // SCENARIO D: EVALUATION
    // =============================================================================

    fn bob(with_match: bool) -> Vec<[&'static str; 4]> {
        let mut data = vec![
            ["id8", "Fredrick", "Zhang", "Chippendale"],
            ["id9", "Li", "Jone", "Narwee"],
        ];
        if with_match {
            data.insert(0, ["id4", "Fred", "Yu", "Strathfield"]);
        }
        data
    }

    fn assess(bob_rows: &[[&str; 4]]) -> pprl_blocking::BlockingAssessment {
        let service = BlockingService::new();
        let config = psig_name_config(20, 2048, false);
        let parties = vec![alice(), rows(bob_rows)];
        let results = service
            .generate_candidate_blocks_parallel(&parties, &config)
            .unwrap();
        let merged = service.generate_blocks(&results, 2).unwrap();

        let truths: Vec<GroundTruth> = parties
            .iter()
            .map(|p| GroundTruth::labelled(p.records.iter().map(|r| (r[0].clone(), r[0].clone()))))
            .collect();
        service.assess_blocks_2party(&merged, &truths).unwrap()
    }

    #[test]
    fn test_evaluation_with_surviving_match() {
        init_tracing();
        let assessment = assess(&bob(true));
        assert_eq!(assessment.candidate_pairs, 5);
        assert!((assessment.reduction_ratio - (1.0 - 5.0 / 18.0)).abs() < 1e-12);
        assert_eq!(assessment.pair_completeness, 1.0);
    }

    #[test]
    fn test_evaluation_without_match() {
        let assessment = assess(&bob(false));
        assert_eq!(assessment.pair_completeness, 0.0);
        assert!((0.0..=1.0).contains(&assessment.reduction_ratio));
    }

    #[test]
    fn test_compressed_keys_do_not_change_evaluation() {
        let service = BlockingService::new();
        let parties = vec![alice(), rows(&bob(true))];
        let plain = service
            .generate_candidate_blocks_parallel(&parties, &psig_name_config(20, 2048, false))
            .unwrap();
        let compressed = service
            .generate_candidate_blocks_parallel(&parties, &psig_name_config(20, 2048, true))
            .unwrap();

        let plain = service.generate_blocks(&plain, 2).unwrap();
        let compressed = service.generate_blocks(&compressed, 2).unwrap();

        for (p, c) in plain.iter().zip(&compressed) {
            assert_eq!(p.len(), c.len());
            let mut p_blocks: Vec<_> = p.values().collect();
            let mut c_blocks: Vec<_> = c.values().collect();
            p_blocks.sort();
            c_blocks.sort();
            assert_eq!(p_blocks, c_blocks);
            assert!(c.keys().all(|k| matches!(k, BlockKey::Digest(_))));
        }
    }
}
