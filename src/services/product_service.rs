use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::products::{
        CategoryList, CreateProductRequest, OrderableResponse, ProductList, UpdateProductRequest,
    },
    entity::{
        ai_predictions::{Column as PredictionCol, Entity as AiPredictions},
        favorites::{Column as FavoriteCol, Entity as Favorites},
        product_views::{Column as ViewCol, Entity as ProductViews},
        products::{ActiveModel, Column, Entity as Products},
        reviews::{Column as ReviewCol, Entity as Reviews},
        sea_orm_active_enums::Role,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_capability, ensure_owner_or_admin},
    models::{ProducerSummary, Product},
    moderation::{ModerationTarget, log_moderation},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    rules::eligibility::{OrderTerms, check_order_quantity},
    services::review_service,
    state::AppState,
};

const DEFAULT_CURRENCY: &str = "MAD";
const DEFAULT_UNIT: &str = "piece";

/// Public catalog: available products only, each with its producer summary.
pub async fn query_catalog(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = filter_condition(&query).add(Column::IsAvailable.eq(true));
    if let Some(producer_id) = query.producer_id {
        condition = condition.add(Column::ProducerId.eq(producer_id));
    }

    let finder = apply_sort(Products::find().filter(condition), &query);
    let total = finder.clone().count(&state.orm).await? as i64;

    tracing::debug!(page, per_page = limit, total, "catalog query");

    let items = finder
        .find_also_related(Users)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, producer)| {
            Product::from(product).with_producer(producer.as_ref().map(ProducerSummary::from))
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

/// The calling producer's own listings, available or not, with rating aggregates.
pub async fn my_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_capability(user, Capability::ManageProducts)?;
    let (page, limit, offset) = query.pagination().normalize();

    let condition = filter_condition(&query).add(Column::ProducerId.eq(user.user_id));
    let finder = apply_sort(Products::find().filter(condition), &query);
    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids = products.iter().map(|p| p.id).collect();
    let summaries = review_service::rating_summaries(&state.orm, ids).await?;

    let items = products
        .into_iter()
        .map(|product| {
            let summary = summaries.get(&product.id).copied().unwrap_or_default();
            Product::from(product).with_ratings(summary)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "My products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?;
    let (product, producer) = match result {
        Some(row) => row,
        None => return Err(AppError::NotFound),
    };

    let summary = review_service::product_rating(&state.orm, product.id).await?;
    let product = Product::from(product)
        .with_producer(producer.as_ref().map(ProducerSummary::from))
        .with_ratings(summary);

    Ok(ApiResponse::success("Product", product, None))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let categories: Vec<String> = Products::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .order_by_asc(Column::Category)
        .into_tuple()
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { categories },
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_capability(user, Capability::ManageProducts)?;
    payload.validate()?;

    let stock_quantity = payload.stock_quantity.unwrap_or(0);
    let min_order_quantity = payload.min_order_quantity.unwrap_or(1);
    check_listing(
        payload.price,
        stock_quantity,
        min_order_quantity,
        payload.max_order_quantity,
    )?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        producer_id: Set(user.user_id),
        name: Set(payload.name),
        description: Set(payload.description),
        category: Set(payload.category),
        subcategory: Set(payload.subcategory),
        price: Set(payload.price),
        currency: Set(payload
            .currency
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
        unit: Set(payload.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string())),
        stock_quantity: Set(stock_quantity),
        min_order_quantity: Set(min_order_quantity),
        max_order_quantity: Set(payload.max_order_quantity),
        images: Set(serde_json::json!(payload.images.unwrap_or_default())),
        tags: Set(serde_json::json!(dedup_tags(
            payload.tags.unwrap_or_default()
        ))),
        is_organic: Set(payload.is_organic.unwrap_or(false)),
        is_available: Set(payload.is_available.unwrap_or(true)),
        harvest_date: Set(payload.harvest_date),
        expiry_date: Set(payload.expiry_date),
        view_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    tracing::info!(product_id = %product.id, producer_id = %product.producer_id, "product created");

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;

    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    ensure_owner_or_admin(user, existing.producer_id)?;

    check_listing(
        payload.price.unwrap_or(existing.price),
        payload.stock_quantity.unwrap_or(existing.stock_quantity),
        payload
            .min_order_quantity
            .unwrap_or(existing.min_order_quantity),
        payload.max_order_quantity.or(existing.max_order_quantity),
    )?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(subcategory) = payload.subcategory {
        active.subcategory = Set(Some(subcategory));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(currency) = payload.currency {
        active.currency = Set(currency.to_uppercase());
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(unit);
    }
    if let Some(stock) = payload.stock_quantity {
        active.stock_quantity = Set(stock);
    }
    if let Some(min) = payload.min_order_quantity {
        active.min_order_quantity = Set(min);
    }
    if let Some(max) = payload.max_order_quantity {
        active.max_order_quantity = Set(Some(max));
    }
    if let Some(images) = payload.images {
        active.images = Set(serde_json::json!(images));
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(serde_json::json!(dedup_tags(tags)));
    }
    if let Some(is_organic) = payload.is_organic {
        active.is_organic = Set(is_organic);
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }
    if let Some(harvest_date) = payload.harvest_date {
        active.harvest_date = Set(Some(harvest_date));
    }
    if let Some(expiry_date) = payload.expiry_date {
        active.expiry_date = Set(Some(expiry_date));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    tracing::info!(product_id = %product.id, "product updated");

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Deletes the product with its reviews, favorites, views and predictions.
/// Order items keep the product id.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let existing = Products::find_by_id(id).one(&txn).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    ensure_owner_or_admin(user, existing.producer_id)?;

    Reviews::delete_many()
        .filter(ReviewCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    Favorites::delete_many()
        .filter(FavoriteCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    ProductViews::delete_many()
        .filter(ViewCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    AiPredictions::delete_many()
        .filter(PredictionCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    Products::delete_by_id(id).exec(&txn).await?;

    if user.role == Role::Admin && user.user_id != existing.producer_id {
        log_moderation(&txn, user.user_id, ModerationTarget::Product, id, "remove", None).await?;
    }

    txn.commit().await?;

    tracing::info!(product_id = %id, deleted_by = %user.user_id, "product deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn check_orderable(
    state: &AppState,
    id: Uuid,
    quantity: i32,
) -> AppResult<ApiResponse<OrderableResponse>> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let reason = check_order_quantity(&OrderTerms::from(&product), quantity)
        .err()
        .map(|e| e.to_string());

    Ok(ApiResponse::success(
        "Orderable",
        OrderableResponse {
            product_id: product.id,
            quantity,
            orderable: reason.is_none(),
            reason,
        },
        None,
    ))
}

/// Trims tags, drops empties and repeats, keeps first-seen order.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Escapes LIKE metacharacters so the text matches literally under the
/// default `\` escape.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn check_listing(
    price: Decimal,
    stock_quantity: i32,
    min_order_quantity: i32,
    max_order_quantity: Option<i32>,
) -> AppResult<()> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("Price must not be negative".into()));
    }
    if stock_quantity < 0 {
        return Err(AppError::BadRequest(
            "Stock quantity must not be negative".into(),
        ));
    }
    if min_order_quantity < 1 {
        return Err(AppError::BadRequest(
            "Minimum order quantity must be at least 1".into(),
        ));
    }
    if let Some(max) = max_order_quantity {
        if max < min_order_quantity {
            return Err(AppError::BadRequest(
                "Maximum order quantity must not be below the minimum".into(),
            ));
        }
    }
    Ok(())
}

fn filter_condition(query: &ProductQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Products, Column::Name)).ilike(pattern.clone()))
                .add(Expr::col((Products, Column::Description)).ilike(pattern)),
        );
    }

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    condition
}

fn apply_sort(finder: Select<Products>, query: &ProductQuery) -> Select<Products> {
    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };
    let finder = match query.sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder.order_by_asc(Column::Id)
}
