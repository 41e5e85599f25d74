use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::events::{RecordSearchRequest, SearchHistoryList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::SearchEntry,
    response::ApiResponse,
    routes::params::Pagination,
    services::event_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_search))
        .route("/history", get(search_history))
}

#[utoipa::path(
    post,
    path = "/api/search",
    request_body = RecordSearchRequest,
    responses(
        (status = 201, description = "Search recorded", body = ApiResponse<SearchEntry>),
        (status = 400, description = "Empty query")
    ),
    tag = "Events"
)]
pub async fn record_search(
    State(state): State<AppState>,
    searcher: Option<AuthUser>,
    Json(payload): Json<RecordSearchRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SearchEntry>>)> {
    let resp = event_service::record_search(&state, searcher.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/search/history",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "The caller's recent searches", body = ApiResponse<SearchHistoryList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn search_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<SearchHistoryList>>> {
    let resp = event_service::search_history(&state, &user, pagination).await?;
    Ok(Json(resp))
}
