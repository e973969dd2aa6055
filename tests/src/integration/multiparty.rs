//! # Multi-Party Merging
//!
//! Four parties blocked with P-Sig, merged under different agreement
//! thresholds.

#[cfg(test)]
mod tests {
    use pprl_blocking::domain::{flip_bloom_filter, records_from, BlockKey, ReversedIndex};
    use pprl_blocking::service::PARALLEL_THRESHOLD;
    use pprl_blocking::{
        generate_reverse_blocks, BlockingApi, BlockingError, BlockingService, CandidateBlockingResult,
        ConfigError, Dataset, Metrics, RecordId,
    };
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use crate::fixtures::{init_tracing, lambda_name_config, psig_name_config};

    fn parties() -> Vec<Dataset> {
        vec![
            Dataset::new(records_from(&[
                ["m1-1", "Joyce", "Wang", "Ashfield"],
                ["m1-2", "Fred", "Yu", "Strathfield"],
                ["m1-3", "Max", "Zhang", "Chippendale"],
            ])),
            Dataset::new(records_from(&[
                ["m2-1", "Fred", "Yu", "Strathfield"],
                ["m2-2", "Jone", "Zhang", "Chippendale"],
                ["m2-3", "Li", "Jone", "Narwee"],
            ])),
            Dataset::new(records_from(&[
                ["m3-1", "Joyce", "Hsu", "Burwood"],
                ["m3-2", "Max", "Shan", "Lewishm"],
            ])),
            Dataset::new(records_from(&[
                ["m4-1", "Lindsay", "Jone", "Narwee"],
                ["m4-2", "Fredrick", "Cheung", "Narwee"],
            ])),
        ]
    }

    fn key(signature: &str) -> BlockKey {
        BlockKey::from(flip_bloom_filter(signature, 2048, 20))
    }

    fn build(service: &BlockingService) -> Vec<CandidateBlockingResult> {
        let datasets = parties();
        assert!(datasets.len() >= PARALLEL_THRESHOLD, "Exercise the parallel path");
        service
            .generate_candidate_blocks_parallel(&datasets, &psig_name_config(20, 2048, false))
            .unwrap()
    }

    #[test]
    fn test_three_of_four_parties() {
        init_tracing();
        let metrics = Arc::new(Metrics::new());
        let service = BlockingService::with_metrics(metrics.clone());
        let merged = service.generate_blocks(&build(&service), 3).unwrap();

        let block = |k: &str, id: &str| (key(k), vec![RecordId::from(id)]);
        let expected: Vec<ReversedIndex> = vec![
            [block("1_Fr", "m1-2"), block("1_Jo", "m1-1")].into_iter().collect(),
            [block("1_Fr", "m2-1"), block("1_Jo", "m2-2")].into_iter().collect(),
            [block("1_Jo", "m3-1")].into_iter().collect(),
            [block("1_Fr", "m4-2")].into_iter().collect(),
        ];
        assert_eq!(merged, expected);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.indexes_built, 4);
        assert_eq!(snapshot.records_indexed, 10);
        assert_eq!(snapshot.merges_performed, 1);
    }

    #[test]
    fn test_no_block_shared_by_all_parties() {
        let service = BlockingService::new();
        let result = service.generate_blocks(&build(&service), 4);
        assert!(
            matches!(result, Err(BlockingError::EmptyResult { algorithm: "p-sig" })),
            "No key is held by all four parties"
        );
    }

    #[test]
    fn test_lower_threshold_keeps_more_blocks() {
        let service = BlockingService::new();
        let results = build(&service);
        let two = service.generate_blocks(&results, 2).unwrap();
        let three = service.generate_blocks(&results, 3).unwrap();

        for (loose, strict) in two.iter().zip(&three) {
            assert!(strict.keys().all(|k| loose.contains_key(k)));
        }
        // m1: Joyce, Fred, Max by value and by prefix
        assert_eq!(two[0].len(), 6);
        // m2: Fred by value, Fr, Jo, Li by prefix
        assert_eq!(two[1].len(), 4);
    }

    #[test]
    fn test_threshold_above_party_count() {
        let service = BlockingService::new();
        let result = service.generate_blocks(&build(&service), 5);
        assert!(matches!(
            result,
            Err(BlockingError::Configuration(ConfigError::InvalidThreshold { k: 5, parties: 4 }))
        ));
    }

    #[test]
    fn test_mixed_algorithms_rejected() {
        let service = BlockingService::new();
        let datasets = parties();
        let mut results = build(&service);
        let lambda = service
            .generate_candidate_blocks(&datasets[0], &lambda_name_config())
            .unwrap();
        results.push(lambda);

        assert!(matches!(
            service.generate_blocks(&results, 2),
            Err(BlockingError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_reverse_blocks_of_merged_output() {
        let service = BlockingService::new();
        let merged = service.generate_blocks(&build(&service), 2).unwrap();
        let reversed = generate_reverse_blocks(&merged);

        assert_eq!(reversed.len(), 4);
        let m1_fred = &reversed[0][&RecordId::from("m1-2")];
        assert_eq!(m1_fred, &BTreeSet::from([key("0_Fred"), key("1_Fr")]));
        assert_eq!(
            reversed[1][&RecordId::from("m2-2")],
            BTreeSet::from([key("1_Jo")]),
            "Jone only shares its prefix"
        );
    }
}
