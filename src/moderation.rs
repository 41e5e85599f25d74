use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, Set};
use uuid::Uuid;

use crate::{
    entity::moderation_logs::{ActiveModel, Model as ModerationLogModel},
    error::AppResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationTarget {
    User,
    Product,
    Review,
}

impl ModerationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationTarget::User => "user",
            ModerationTarget::Product => "product",
            ModerationTarget::Review => "review",
        }
    }
}

/// Append a moderation record. Rows are never updated afterwards.
///
/// Takes any connection so callers can write the log inside the same
/// transaction as the action it describes.
pub async fn log_moderation<C>(
    conn: &C,
    moderator_id: Uuid,
    target: ModerationTarget,
    target_id: Uuid,
    action: &str,
    reason: Option<String>,
) -> AppResult<ModerationLogModel>
where
    C: ConnectionTrait,
{
    let log = ActiveModel {
        id: Set(Uuid::new_v4()),
        moderator_id: Set(moderator_id),
        target_type: Set(target.as_str().to_string()),
        target_id: Set(target_id),
        action: Set(action.to_string()),
        reason: Set(reason),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    tracing::info!(
        moderator_id = %moderator_id,
        target_type = target.as_str(),
        target_id = %target_id,
        action,
        "moderation action recorded"
    );

    Ok(log)
}
