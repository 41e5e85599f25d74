use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::SearchEntry;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordSearchRequest {
    #[validate(length(min = 1, max = 255))]
    pub query: String,
    pub filters: Option<serde_json::Value>,
    #[validate(range(min = 0))]
    pub results_count: Option<i32>,
}

/// Request metadata captured alongside a product view.
#[derive(Debug, Default, Clone)]
pub struct ViewContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchHistoryList {
    pub items: Vec<SearchEntry>,
}
