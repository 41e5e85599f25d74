use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::users::{ModerationLogList, UpdateUserStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::ModerationLogQuery,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/status", patch(update_user_status))
        .route("/moderation-logs", get(list_moderation_logs))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/status",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Account suspended or reactivated", body = ApiResponse<User>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserStatusRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::update_user_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/moderation-logs",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("target_type" = Option<String>, Query, description = "user, product or review")
    ),
    responses(
        (status = 200, description = "Moderation history, newest first", body = ApiResponse<ModerationLogList>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_moderation_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ModerationLogQuery>,
) -> AppResult<Json<ApiResponse<ModerationLogList>>> {
    let resp = admin_service::list_moderation_logs(&state, &user, query).await?;
    Ok(Json(resp))
}
