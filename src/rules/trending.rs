//! Popularity ranking.
//!
//! The score is a fixed weighted sum of favorites, reviews and views. It has
//! no decay or recency term and is not a learned model; the weights are kept
//! as-is so rankings stay comparable with earlier data.

use std::cmp::Ordering;

pub const FAVORITE_WEIGHT: f64 = 2.0;
pub const REVIEW_WEIGHT: f64 = 1.5;
pub const VIEW_WEIGHT: f64 = 0.1;
pub const DEFAULT_LIMIT: usize = 10;

pub fn trending_score(favorites_count: u64, reviews_count: u64, view_count: i64) -> f64 {
    favorites_count as f64 * FAVORITE_WEIGHT
        + reviews_count as f64 * REVIEW_WEIGHT
        + view_count as f64 * VIEW_WEIGHT
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub item: T,
    pub score: f64,
    pub favorites_count: u64,
    pub reviews_count: u64,
}

impl<T> Scored<T> {
    pub fn new(item: T, favorites_count: u64, reviews_count: u64, view_count: i64) -> Self {
        Self {
            item,
            score: trending_score(favorites_count, reviews_count, view_count),
            favorites_count,
            reviews_count,
        }
    }
}

/// Sorts by score, highest first, and keeps the top `limit`.
/// Equal scores keep their input order.
pub fn rank<T>(mut scored: Vec<Scored<T>>, limit: usize) -> Vec<Scored<T>> {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored
}
