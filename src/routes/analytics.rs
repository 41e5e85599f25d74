use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::analytics::{AdminOverview, ProducerStats, TrendingList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::TrendingQuery,
    services::analytics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/producer/{id}/stats", get(producer_stats))
        .route("/admin/overview", get(admin_overview))
        .route("/products/trending", get(trending_products))
}

#[utoipa::path(
    get,
    path = "/api/analytics/producer/{id}/stats",
    params(("id" = Uuid, Path, description = "Producer ID")),
    responses(
        (status = 200, description = "Producer statistics", body = ApiResponse<ProducerStats>),
        (status = 403, description = "Not this producer"),
        (status = 404, description = "Producer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn producer_stats(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProducerStats>>> {
    let resp = analytics_service::producer_stats(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/analytics/admin/overview",
    responses(
        (status = 200, description = "Platform totals and distributions", body = ApiResponse<AdminOverview>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn admin_overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AdminOverview>>> {
    let resp = analytics_service::admin_overview(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/analytics/products/trending",
    params(("limit" = Option<usize>, Query, description = "How many products, default 10")),
    responses(
        (status = 200, description = "Products ranked by trending score", body = ApiResponse<TrendingList>)
    ),
    tag = "Analytics"
)]
pub async fn trending_products(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> AppResult<Json<ApiResponse<TrendingList>>> {
    let resp = analytics_service::trending(&state, query.limit).await?;
    Ok(Json(resp))
}
