use regional_marketplace_api::rules::ratings::{
    RatingSummary, average_rating, review_count, round2, summarize,
};

#[test]
fn no_reviews_yields_zero() {
    let reviews: Vec<(i32, bool)> = Vec::new();
    assert_eq!(summarize(&reviews), RatingSummary::default());
    assert_eq!(average_rating(&reviews), 0.0);
    assert_eq!(review_count(&reviews), 0);
}

#[test]
fn only_flagged_reviews_yields_zero() {
    let reviews = [(5, true), (1, true)];
    assert_eq!(average_rating(&reviews), 0.0);
    assert_eq!(review_count(&reviews), 0);
}

#[test]
fn flagged_reviews_are_excluded_from_the_mean() {
    let reviews = [(5, false), (4, false), (1, true)];
    let summary = summarize(&reviews);
    assert_eq!(summary.review_count, 2);
    assert!((summary.average_rating - 4.5).abs() < f64::EPSILON);
}

#[test]
fn unflagging_brings_a_review_back() {
    let flagged = [(4, false), (1, true)];
    let unflagged = [(4, false), (1, false)];
    assert!((average_rating(&flagged) - 4.0).abs() < f64::EPSILON);
    assert!((average_rating(&unflagged) - 2.5).abs() < f64::EPSILON);
}

#[test]
fn rounding_keeps_two_decimals() {
    let reviews = [(5, false), (4, false), (4, false)];
    assert_eq!(round2(average_rating(&reviews)), 4.33);
    assert_eq!(round2(2.0), 2.0);
}
