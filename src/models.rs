use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        ai_predictions::Model as AiPredictionModel,
        favorites::Model as FavoriteModel,
        moderation_logs::Model as ModerationLogModel,
        order_items::Model as OrderItemModel,
        orders::Model as OrderModel,
        products::Model as ProductModel,
        reviews::Model as ReviewModel,
        sea_orm_active_enums::{OrderStatus, Role},
        users::Model as UserModel,
    },
    rules::ratings::RatingSummary,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            role: model.role,
            phone: model.phone,
            address: model.address,
            city: model.city,
            region: model.region,
            country: model.country,
            latitude: model.latitude,
            longitude: model.longitude,
            is_active: model.is_active,
            is_verified: model.is_verified,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Public subset of a producer embedded in product listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProducerSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl From<&UserModel> for ProducerSummary {
    fn from(model: &UserModel) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            first_name: model.first_name.clone(),
            last_name: model.last_name.clone(),
            city: model.city.clone(),
            region: model.region.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub producer_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub unit: String,
    pub stock_quantity: i32,
    pub min_order_quantity: i32,
    pub max_order_quantity: Option<i32>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub is_organic: bool,
    pub is_available: bool,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<ProducerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
}

impl Product {
    pub fn with_producer(mut self, producer: Option<ProducerSummary>) -> Self {
        self.producer = producer;
        self
    }

    pub fn with_ratings(mut self, summary: RatingSummary) -> Self {
        self.average_rating = Some(summary.average_rating);
        self.review_count = Some(summary.review_count);
        self
    }
}

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            producer_id: model.producer_id,
            name: model.name,
            description: model.description,
            category: model.category,
            subcategory: model.subcategory,
            price: model.price,
            currency: model.currency,
            unit: model.unit,
            stock_quantity: model.stock_quantity,
            min_order_quantity: model.min_order_quantity,
            max_order_quantity: model.max_order_quantity,
            images: string_list(model.images),
            tags: string_list(model.tags),
            is_organic: model.is_organic,
            is_available: model.is_available,
            harvest_date: model.harvest_date,
            expiry_date: model.expiry_date,
            view_count: model.view_count,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            producer: None,
            average_rating: None,
            review_count: None,
        }
    }
}

fn string_list(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified_purchase: bool,
    pub is_flagged: bool,
    pub flag_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewModel> for Review {
    fn from(model: ReviewModel) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            rating: model.rating,
            title: model.title,
            comment: model.comment,
            is_verified_purchase: model.is_verified_purchase,
            is_flagged: model.is_flagged,
            flag_reason: model.flag_reason,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Favorite {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<FavoriteModel> for Favorite {
    fn from(model: FavoriteModel) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub producer_id: Uuid,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderModel> for Order {
    fn from(model: OrderModel) -> Self {
        Self {
            id: model.id,
            consumer_id: model.consumer_id,
            producer_id: model.producer_id,
            total_amount: model.total_amount,
            currency: model.currency,
            status: model.status,
            shipping_address: model.shipping_address,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            total_price: model.total_price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct SearchEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub search_query: String,
    pub filters: serde_json::Value,
    pub results_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct ProductView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AiPrediction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Option<Uuid>,
    pub prediction_type: String,
    pub prediction_data: serde_json::Value,
    pub confidence_score: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<AiPredictionModel> for AiPrediction {
    fn from(model: AiPredictionModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            prediction_type: model.prediction_type,
            prediction_data: model.prediction_data,
            confidence_score: model.confidence_score,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModerationLog {
    pub id: Uuid,
    pub moderator_id: Uuid,
    pub target_type: String,
    pub target_id: Uuid,
    pub action: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ModerationLogModel> for ModerationLog {
    fn from(model: ModerationLogModel) -> Self {
        Self {
            id: model.id,
            moderator_id: model.moderator_id,
            target_type: model.target_type,
            target_id: model.target_id,
            action: model.action,
            reason: model.reason,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
