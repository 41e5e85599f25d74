use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::reviews::Model as ReviewModel;

/// Anything that carries a star rating and a moderation flag.
pub trait Rated {
    fn rating(&self) -> i32;
    fn is_flagged(&self) -> bool;
}

impl Rated for ReviewModel {
    fn rating(&self) -> i32 {
        self.rating
    }

    fn is_flagged(&self) -> bool {
        self.is_flagged
    }
}

/// `(rating, is_flagged)`, the shape returned by narrow column selects.
impl Rated for (i32, bool) {
    fn rating(&self) -> i32 {
        self.0
    }

    fn is_flagged(&self) -> bool {
        self.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub review_count: u64,
}

/// Aggregates only unflagged reviews. An empty set yields `0.0` / `0`.
pub fn summarize<'a, R, I>(reviews: I) -> RatingSummary
where
    R: Rated + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let (sum, count) = reviews
        .into_iter()
        .filter(|r| !r.is_flagged())
        .fold((0_i64, 0_u64), |(sum, count), r| {
            (sum + i64::from(r.rating()), count + 1)
        });

    if count == 0 {
        return RatingSummary::default();
    }

    RatingSummary {
        average_rating: sum as f64 / count as f64,
        review_count: count,
    }
}

pub fn average_rating<'a, R, I>(reviews: I) -> f64
where
    R: Rated + 'a,
    I: IntoIterator<Item = &'a R>,
{
    summarize(reviews).average_rating
}

pub fn review_count<'a, R, I>(reviews: I) -> u64
where
    R: Rated + 'a,
    I: IntoIterator<Item = &'a R>,
{
    summarize(reviews).review_count
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
