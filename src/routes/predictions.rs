use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::predictions::{CreatePredictionRequest, PredictionList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::AiPrediction,
    response::ApiResponse,
    routes::params::Pagination,
    services::prediction_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predictions", get(list_predictions).post(create_prediction))
        .route("/predictions/products/{id}", get(product_predictions))
}

#[utoipa::path(
    post,
    path = "/api/ai/predictions",
    request_body = CreatePredictionRequest,
    responses(
        (status = 201, description = "Prediction stored", body = ApiResponse<AiPrediction>),
        (status = 400, description = "Confidence outside 0..1"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Predictions"
)]
pub async fn create_prediction(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePredictionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AiPrediction>>)> {
    let resp = prediction_service::create_prediction(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/ai/predictions",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "The caller's predictions", body = ApiResponse<PredictionList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Predictions"
)]
pub async fn list_predictions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PredictionList>>> {
    let resp = prediction_service::list_predictions(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/ai/predictions/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "Predictions for a product", body = ApiResponse<PredictionList>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Predictions"
)]
pub async fn product_predictions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PredictionList>>> {
    let resp = prediction_service::product_predictions(&state, &user, id, pagination).await?;
    Ok(Json(resp))
}
