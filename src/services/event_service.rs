use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::events::{RecordSearchRequest, SearchHistoryList, ViewContext},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ProductView, SearchEntry},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Appends a view row and bumps the product's counter in one transaction.
pub async fn record_view(
    state: &AppState,
    viewer: Option<&AuthUser>,
    product_id: Uuid,
    context: ViewContext,
) -> AppResult<ApiResponse<ProductView>> {
    let mut tx = state.pool.begin().await?;

    let bumped = sqlx::query("UPDATE products SET view_count = view_count + 1 WHERE id = $1")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    if bumped.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    let view = sqlx::query_as::<_, ProductView>(
        r#"
        INSERT INTO product_views (id, product_id, user_id, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, product_id, user_id, ip_address, user_agent, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(viewer.map(|u| u.user_id))
    .bind(context.ip_address)
    .bind(context.user_agent)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ApiResponse::success("View recorded", view, Some(Meta::empty())))
}

pub async fn record_search(
    state: &AppState,
    searcher: Option<&AuthUser>,
    payload: RecordSearchRequest,
) -> AppResult<ApiResponse<SearchEntry>> {
    payload.validate()?;

    let filters = payload
        .filters
        .unwrap_or_else(|| serde_json::json!({}));

    let entry = sqlx::query_as::<_, SearchEntry>(
        r#"
        INSERT INTO search_history (id, user_id, search_query, filters, results_count)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, search_query, filters, results_count, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(searcher.map(|u| u.user_id))
    .bind(payload.query.trim())
    .bind(filters)
    .bind(payload.results_count.unwrap_or(0))
    .fetch_one(&state.pool)
    .await?;

    tracing::debug!(search_id = %entry.id, query = %entry.search_query, "search recorded");

    Ok(ApiResponse::success(
        "Search recorded",
        entry,
        Some(Meta::empty()),
    ))
}

pub async fn search_history(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<SearchHistoryList>> {
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, SearchEntry>(
        r#"
        SELECT id, user_id, search_query, filters, results_count, created_at
        FROM search_history
        WHERE user_id = $1
        ORDER BY created_at DESC, id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM search_history WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Search history",
        SearchHistoryList { items },
        Some(meta),
    ))
}
