use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::reviews::{CreateReviewRequest, FlagReviewRequest, ReviewList, UpdateReviewRequest},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems, Relation as OrderItemRel},
        orders::Column as OrderCol,
        products::Entity as Products,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        sea_orm_active_enums::{OrderStatus, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_admin, ensure_capability},
    models::Review,
    moderation::{ModerationTarget, log_moderation},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    rules::ratings::{self, RatingSummary},
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();

    if Products::find_by_id(product_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let finder = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .order_by_desc(ReviewCol::CreatedAt)
        .order_by_asc(ReviewCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    let summary = product_rating(&state.orm, product_id).await?;

    let data = ReviewList {
        items,
        average_rating: ratings::round2(summary.average_rating),
        review_count: summary.review_count,
    };
    Ok(ApiResponse::success(
        "Reviews",
        data,
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    ensure_capability(user, Capability::WriteReviews)?;
    payload.validate()?;

    if Products::find_by_id(product_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let existing = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .filter(ReviewCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You have already reviewed this product".into(),
        ));
    }

    let verified = has_delivered_purchase(&state.orm, user.user_id, product_id).await?;

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        title: Set(payload.title),
        comment: Set(payload.comment),
        is_verified_purchase: Set(verified),
        is_flagged: Set(false),
        flag_reason: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| AppError::conflict_on_unique(err, "You have already reviewed this product"))?;

    tracing::info!(
        review_id = %review.id,
        product_id = %product_id,
        verified,
        "review created"
    );

    Ok(ApiResponse::success(
        "Review created",
        Review::from(review),
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;

    let existing = Reviews::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    if existing.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let mut active: ReviewActive = existing.into();
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    if let Some(title) = payload.title {
        active.title = Set(Some(title));
    }
    if let Some(comment) = payload.comment {
        active.comment = Set(Some(comment));
    }
    active.updated_at = Set(Utc::now().into());

    let review = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        Review::from(review),
        Some(Meta::empty()),
    ))
}

/// Authors delete their own reviews; an admin deleting someone else's is logged.
pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let existing = Reviews::find_by_id(id).one(&txn).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let is_author = existing.user_id == user.user_id;
    if !is_author && user.role != Role::Admin {
        return Err(AppError::Forbidden);
    }

    Reviews::delete_by_id(id).exec(&txn).await?;
    if !is_author {
        log_moderation(&txn, user.user_id, ModerationTarget::Review, id, "delete", None).await?;
    }

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Re-flagging an already flagged review overwrites the reason.
pub async fn flag_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: FlagReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    ensure_admin(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let existing = Reviews::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut active: ReviewActive = existing.into();
    active.is_flagged = Set(true);
    active.flag_reason = Set(Some(payload.reason.clone()));
    active.updated_at = Set(Utc::now().into());
    let review = active.update(&txn).await?;

    log_moderation(
        &txn,
        user.user_id,
        ModerationTarget::Review,
        review.id,
        "flag",
        Some(payload.reason),
    )
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Review flagged",
        Review::from(review),
        Some(Meta::empty()),
    ))
}

pub async fn unflag_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Review>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = Reviews::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut active: ReviewActive = existing.into();
    active.is_flagged = Set(false);
    active.flag_reason = Set(None);
    active.updated_at = Set(Utc::now().into());
    let review = active.update(&txn).await?;

    log_moderation(
        &txn,
        user.user_id,
        ModerationTarget::Review,
        review.id,
        "unflag",
        None,
    )
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Review unflagged",
        Review::from(review),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn product_rating<C>(conn: &C, product_id: Uuid) -> AppResult<RatingSummary>
where
    C: ConnectionTrait,
{
    let rows: Vec<(i32, bool)> = Reviews::find()
        .select_only()
        .column(ReviewCol::Rating)
        .column(ReviewCol::IsFlagged)
        .filter(ReviewCol::ProductId.eq(product_id))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ratings::summarize(&rows))
}

/// Rating summaries keyed by product id. Products without reviews are absent.
pub(crate) async fn rating_summaries<C>(
    conn: &C,
    product_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, RatingSummary>>
where
    C: ConnectionTrait,
{
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, i32, bool)> = Reviews::find()
        .select_only()
        .column(ReviewCol::ProductId)
        .column(ReviewCol::Rating)
        .column(ReviewCol::IsFlagged)
        .filter(ReviewCol::ProductId.is_in(product_ids))
        .into_tuple()
        .all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<(i32, bool)>> = HashMap::new();
    for (product_id, rating, is_flagged) in rows {
        grouped
            .entry(product_id)
            .or_default()
            .push((rating, is_flagged));
    }

    Ok(grouped
        .into_iter()
        .map(|(product_id, rows)| (product_id, ratings::summarize(&rows)))
        .collect())
}

async fn has_delivered_purchase<C>(conn: &C, user_id: Uuid, product_id: Uuid) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let count = OrderItems::find()
        .join(sea_orm::JoinType::InnerJoin, OrderItemRel::Orders.def())
        .filter(OrderItemCol::ProductId.eq(product_id))
        .filter(OrderCol::ConsumerId.eq(user_id))
        .filter(OrderCol::Status.eq(OrderStatus::Delivered))
        .count(conn)
        .await?;
    Ok(count > 0)
}
