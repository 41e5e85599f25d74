use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::AiPrediction;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePredictionRequest {
    pub product_id: Option<Uuid>,
    #[validate(length(min = 1, max = 50))]
    pub prediction_type: String,
    pub prediction_data: serde_json::Value,
    pub confidence_score: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionList {
    pub items: Vec<AiPrediction>,
}
