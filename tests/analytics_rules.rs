use std::collections::BTreeMap;

use regional_marketplace_api::rules::{
    distribution::tally,
    trending::{DEFAULT_LIMIT, Scored, rank, trending_score},
};

#[test]
fn trending_score_uses_fixed_weights() {
    let score = trending_score(3, 2, 50);
    assert!((score - 14.0).abs() < 1e-9);
    assert_eq!(trending_score(0, 0, 0), 0.0);
}

#[test]
fn higher_score_ranks_first() {
    // 3*2 + 2*1.5 + 50*0.1 = 14.0 against 2*2 + 6*1.5 + 9*0.1 = 13.9
    let scored = vec![
        Scored::new("runner-up", 2, 6, 9),
        Scored::new("leader", 3, 2, 50),
    ];
    let ranked = rank(scored, DEFAULT_LIMIT);
    assert_eq!(ranked[0].item, "leader");
    assert!((ranked[0].score - 14.0).abs() < 1e-9);
    assert!((ranked[1].score - 13.9).abs() < 1e-9);
    assert_eq!(ranked[0].favorites_count, 3);
    assert_eq!(ranked[0].reviews_count, 2);
}

#[test]
fn ties_keep_input_order() {
    let scored = vec![
        Scored::new("first", 1, 0, 0),
        Scored::new("second", 1, 0, 0),
        Scored::new("third", 0, 1, 0),
    ];
    let ranked: Vec<_> = rank(scored, 10).into_iter().map(|s| s.item).collect();
    assert_eq!(ranked, vec!["first", "second", "third"]);
}

#[test]
fn rank_truncates_to_limit() {
    let scored = (0..15).map(|i| Scored::new(i, i as u64, 0, 0)).collect();
    let ranked = rank(scored, DEFAULT_LIMIT);
    assert_eq!(ranked.len(), 10);
    assert_eq!(ranked[0].item, 14);
    assert!(rank(Vec::<Scored<u8>>::new(), 10).is_empty());
}

#[test]
fn category_distribution_counts_each_value() {
    let counts = tally(vec!["A".to_string(), "A".to_string(), "B".to_string()]);
    let expected: BTreeMap<String, u64> =
        [("A".to_string(), 2), ("B".to_string(), 1)].into_iter().collect();
    assert_eq!(counts, expected);
}

#[test]
fn empty_distribution_is_empty() {
    let counts = tally(Vec::<String>::new());
    assert!(counts.is_empty());
}
