use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProducerStats {
    pub producer_id: Uuid,
    pub total_products: u64,
    pub total_views: i64,
    pub total_favorites: u64,
    pub total_reviews: u64,
    pub average_rating: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverview {
    pub total_users: u64,
    pub total_products: u64,
    pub total_reviews: u64,
    pub total_favorites: u64,
    pub total_searches: u64,
    pub role_distribution: BTreeMap<String, u64>,
    pub category_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendingProduct {
    pub product: Product,
    pub trending_score: f64,
    pub favorites_count: u64,
    pub reviews_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendingList {
    pub items: Vec<TrendingProduct>,
    pub count: usize,
}
