use serde_json::json;

use arbor_scoring::protocol::resolve_band;
use arbor_scoring::{ScoringError, ScoringRules};

#[test]
fn uniform_rules_parse_and_resolve_at_any_age() {
    let rules = ScoringRules::from_value(&json!({"buckets": {"YES": 0, "NO": 4}}))
        .expect("valid uniform rules");

    for age in [0, 24, 60, 120] {
        let band = resolve_band(&rules, age).expect("uniform rules always resolve");
        assert_eq!(band.score_for("NO"), Some(4));
        assert_eq!(band.max_score(), 4);
    }
}

#[test]
fn age_banded_rules_parse_and_resolve_per_band() {
    let rules = ScoringRules::from_value(&json!({"age_bands": [
        {"min_months": 0, "max_months": 24, "buckets": {"YES": 1, "NO": 0}},
        {"min_months": 25, "max_months": 60, "buckets": {"YES": 4, "NO": 0}}
    ]}))
    .expect("valid age-banded rules");

    assert_eq!(
        resolve_band(&rules, 12).and_then(|b| b.score_for("YES")),
        Some(1)
    );
    assert_eq!(
        resolve_band(&rules, 40).and_then(|b| b.score_for("YES")),
        Some(4)
    );
    assert!(resolve_band(&rules, 61).is_none());
}

#[test]
fn overlapping_bands_prefer_the_lower_inclusive_match() {
    let rules = ScoringRules::from_value(&json!({"age_bands": [
        {"min_months": 0, "max_months": 30, "buckets": {"YES": 1}},
        {"min_months": 20, "max_months": 40, "buckets": {"YES": 3}}
    ]}))
    .expect("valid rules");

    // Inside the overlap with no lower-bound match: declaration order wins.
    assert_eq!(
        resolve_band(&rules, 25).and_then(|b| b.score_for("YES")),
        Some(1)
    );
    // Exactly on the second band's lower bound: that band wins.
    assert_eq!(
        resolve_band(&rules, 20).and_then(|b| b.score_for("YES")),
        Some(3)
    );
}

#[test]
fn empty_bucket_mapping_is_rejected() {
    let err = ScoringRules::from_value(&json!({"buckets": {}})).unwrap_err();
    assert!(matches!(err, ScoringError::InvalidRules { .. }));
}

#[test]
fn inverted_age_band_is_rejected() {
    let err = ScoringRules::from_value(&json!({"age_bands": [
        {"min_months": 36, "max_months": 24, "buckets": {"YES": 1}}
    ]}))
    .unwrap_err();
    assert!(matches!(err, ScoringError::InvalidRules { .. }));
}

#[test]
fn unknown_shapes_are_rejected() {
    for value in [
        json!({"scoring_pattern": "Common protocol"}),
        json!("YES"),
        json!(4),
        json!({"age_bands": []}),
    ] {
        let err = ScoringRules::from_value(&value).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidRules { .. }));
    }
}
