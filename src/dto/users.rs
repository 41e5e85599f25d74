use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ModerationLog;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModerationLogList {
    pub items: Vec<ModerationLog>,
}
