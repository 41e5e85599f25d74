use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, TransactionTrait};
use uuid::Uuid;

use crate::{
    entity::{
        ai_predictions::{Column as PredictionCol, Entity as AiPredictions},
        favorites::{Column as FavoriteCol, Entity as Favorites},
        moderation_logs::{Column as ModerationCol, Entity as ModerationLogs},
        product_views::{Column as ViewCol, Entity as ProductViews},
        products::{Column as ProdCol, Entity as Products},
        reviews::{Column as ReviewCol, Entity as Reviews},
        search_history::{Column as SearchCol, Entity as SearchHistory},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_or_admin},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_owner_or_admin(user, id)?;
    let found = Users::find_by_id(id).one(&state.orm).await?;
    let found = match found {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("User", User::from(found), None))
}

/// Removes the account and everything it owns in one transaction.
/// Orders are kept: they reference users by id only.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_owner_or_admin(user, id)?;

    let txn = state.orm.begin().await?;

    if Users::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let product_ids: Vec<Uuid> = Products::find()
        .select_only()
        .column(ProdCol::Id)
        .filter(ProdCol::ProducerId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    Reviews::delete_many()
        .filter(
            Condition::any()
                .add(ReviewCol::UserId.eq(id))
                .add(ReviewCol::ProductId.is_in(product_ids.clone())),
        )
        .exec(&txn)
        .await?;
    Favorites::delete_many()
        .filter(
            Condition::any()
                .add(FavoriteCol::UserId.eq(id))
                .add(FavoriteCol::ProductId.is_in(product_ids.clone())),
        )
        .exec(&txn)
        .await?;
    ProductViews::delete_many()
        .filter(
            Condition::any()
                .add(ViewCol::UserId.eq(id))
                .add(ViewCol::ProductId.is_in(product_ids.clone())),
        )
        .exec(&txn)
        .await?;
    AiPredictions::delete_many()
        .filter(
            Condition::any()
                .add(PredictionCol::UserId.eq(id))
                .add(PredictionCol::ProductId.is_in(product_ids.clone())),
        )
        .exec(&txn)
        .await?;
    SearchHistory::delete_many()
        .filter(SearchCol::UserId.eq(id))
        .exec(&txn)
        .await?;
    ModerationLogs::delete_many()
        .filter(ModerationCol::ModeratorId.eq(id))
        .exec(&txn)
        .await?;
    Products::delete_many()
        .filter(ProdCol::ProducerId.eq(id))
        .exec(&txn)
        .await?;
    Users::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        user_id = %id,
        deleted_by = %user.user_id,
        products = product_ids.len(),
        "user deleted"
    );

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
