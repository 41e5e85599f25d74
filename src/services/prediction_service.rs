use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::predictions::{CreatePredictionRequest, PredictionList},
    entity::{
        ai_predictions::{ActiveModel as PredictionActive, Column as PredictionCol, Entity as AiPredictions},
        products::Entity as Products,
        sea_orm_active_enums::Role,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::AiPrediction,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Stores an externally computed prediction. The payload is kept opaque.
pub async fn create_prediction(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePredictionRequest,
) -> AppResult<ApiResponse<AiPrediction>> {
    payload.validate()?;

    let confidence = payload.confidence_score;
    if confidence < Decimal::ZERO || confidence > Decimal::ONE {
        return Err(AppError::BadRequest(
            "Confidence score must be between 0 and 1".into(),
        ));
    }

    if let Some(product_id) = payload.product_id {
        if Products::find_by_id(product_id)
            .one(&state.orm)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound);
        }
    }

    let prediction = PredictionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(payload.product_id),
        prediction_type: Set(payload.prediction_type),
        prediction_data: Set(payload.prediction_data),
        confidence_score: Set(confidence.round_dp(2)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(
        prediction_id = %prediction.id,
        prediction_type = %prediction.prediction_type,
        "prediction stored"
    );

    Ok(ApiResponse::success(
        "Prediction stored",
        AiPrediction::from(prediction),
        Some(Meta::empty()),
    ))
}

pub async fn list_predictions(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PredictionList>> {
    let condition = Condition::all().add(PredictionCol::UserId.eq(user.user_id));
    page_predictions(state, condition, pagination).await
}

/// Predictions attached to one product. Admins see everyone's; other callers
/// only their own.
pub async fn product_predictions(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<PredictionList>> {
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let mut condition = Condition::all().add(PredictionCol::ProductId.eq(product_id));
    if user.role != Role::Admin {
        condition = condition.add(PredictionCol::UserId.eq(user.user_id));
    }
    page_predictions(state, condition, pagination).await
}

async fn page_predictions(
    state: &AppState,
    condition: Condition,
    pagination: Pagination,
) -> AppResult<ApiResponse<PredictionList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = AiPredictions::find()
        .filter(condition)
        .order_by_desc(PredictionCol::CreatedAt)
        .order_by_asc(PredictionCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(AiPrediction::from)
        .collect();

    Ok(ApiResponse::success(
        "Predictions",
        PredictionList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
