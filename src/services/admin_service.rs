use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::{
    dto::users::{ModerationLogList, UpdateUserStatusRequest},
    entity::{
        moderation_logs::{Column as ModerationCol, Entity as ModerationLogs},
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{ModerationLog, User},
    moderation::{ModerationTarget, log_moderation},
    response::{ApiResponse, Meta},
    routes::params::ModerationLogQuery,
    state::AppState,
};

/// Suspends or reactivates an account and records the action.
pub async fn update_user_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserStatusRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::BadRequest(
            "Admins cannot change their own status".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let target = Users::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let target = match target {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let action = if payload.is_active {
        "reactivate"
    } else {
        "suspend"
    };

    let mut active: UserActive = target.into();
    active.is_active = Set(payload.is_active);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    log_moderation(
        &txn,
        user.user_id,
        ModerationTarget::User,
        id,
        action,
        payload.reason,
    )
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "User status updated",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_moderation_logs(
    state: &AppState,
    user: &AuthUser,
    query: ModerationLogQuery,
) -> AppResult<ApiResponse<ModerationLogList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(target_type) = query.target_type.as_ref().filter(|t| !t.is_empty()) {
        condition = condition.add(ModerationCol::TargetType.eq(target_type.clone()));
    }

    let finder = ModerationLogs::find()
        .filter(condition)
        .order_by_desc(ModerationCol::CreatedAt)
        .order_by_asc(ModerationCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ModerationLog::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Moderation logs",
        ModerationLogList { items },
        Some(meta),
    ))
}
