use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Product;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 50))]
    pub subcategory: Option<String>,
    pub price: Decimal,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    pub stock_quantity: Option<i32>,
    pub min_order_quantity: Option<i32>,
    pub max_order_quantity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_organic: Option<bool>,
    pub is_available: Option<bool>,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 50))]
    pub subcategory: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    pub stock_quantity: Option<i32>,
    pub min_order_quantity: Option<i32>,
    pub max_order_quantity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_organic: Option<bool>,
    pub is_available: Option<bool>,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderableQuery {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderableResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    pub orderable: bool,
    pub reason: Option<String>,
}
