use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    dto::analytics::{AdminOverview, ProducerStats, TrendingList, TrendingProduct},
    entity::{
        favorites::{Column as FavoriteCol, Entity as Favorites},
        products::{Column as ProdCol, Entity as Products},
        reviews::{Column as ReviewCol, Entity as Reviews},
        sea_orm_active_enums::Role,
        search_history::Entity as SearchHistory,
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_capability, ensure_owner_or_admin},
    models::Product,
    response::{ApiResponse, Meta},
    rules::{
        distribution::tally,
        ratings::{self, round2},
        trending::{self, Scored},
    },
    state::AppState,
};

const MAX_TRENDING: usize = 100;

pub async fn producer_stats(
    state: &AppState,
    user: &AuthUser,
    producer_id: Uuid,
) -> AppResult<ApiResponse<ProducerStats>> {
    ensure_capability(user, Capability::ViewProducerAnalytics)?;
    ensure_owner_or_admin(user, producer_id)?;

    if Users::find_by_id(producer_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let products: Vec<(Uuid, i64)> = Products::find()
        .select_only()
        .column(ProdCol::Id)
        .column(ProdCol::ViewCount)
        .filter(ProdCol::ProducerId.eq(producer_id))
        .into_tuple()
        .all(&state.orm)
        .await?;

    let total_products = products.len() as u64;
    let total_views: i64 = products.iter().map(|(_, views)| views).sum();
    let ids: Vec<Uuid> = products.into_iter().map(|(id, _)| id).collect();

    // every review counts toward the total; flagged ones stay out of the average
    let (total_favorites, total_reviews, summary) = if ids.is_empty() {
        (0, 0, ratings::RatingSummary::default())
    } else {
        let favorites = Favorites::find()
            .filter(FavoriteCol::ProductId.is_in(ids.clone()))
            .count(&state.orm)
            .await?;
        let reviews: Vec<(i32, bool)> = Reviews::find()
            .select_only()
            .column(ReviewCol::Rating)
            .column(ReviewCol::IsFlagged)
            .filter(ReviewCol::ProductId.is_in(ids))
            .into_tuple()
            .all(&state.orm)
            .await?;
        (favorites, reviews.len() as u64, ratings::summarize(&reviews))
    };

    let stats = ProducerStats {
        producer_id,
        total_products,
        total_views,
        total_favorites,
        total_reviews,
        average_rating: round2(summary.average_rating),
    };
    Ok(ApiResponse::success("Producer stats", stats, None))
}

pub async fn admin_overview(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AdminOverview>> {
    ensure_capability(user, Capability::ViewPlatformAnalytics)?;

    let roles: Vec<Role> = Users::find()
        .select_only()
        .column(UserCol::Role)
        .into_tuple()
        .all(&state.orm)
        .await?;
    let categories: Vec<String> = Products::find()
        .select_only()
        .column(ProdCol::Category)
        .into_tuple()
        .all(&state.orm)
        .await?;

    let overview = AdminOverview {
        total_users: roles.len() as u64,
        total_products: categories.len() as u64,
        total_reviews: Reviews::find().count(&state.orm).await?,
        total_favorites: Favorites::find().count(&state.orm).await?,
        total_searches: SearchHistory::find().count(&state.orm).await?,
        role_distribution: tally(roles.iter().map(|r| r.as_str().to_string())),
        category_distribution: tally(categories),
    };
    Ok(ApiResponse::success("Admin overview", overview, None))
}

/// Most popular products by the fixed trending score. Counts are raw:
/// flagged reviews still count toward popularity.
pub async fn trending(
    state: &AppState,
    limit: Option<usize>,
) -> AppResult<ApiResponse<TrendingList>> {
    let limit = limit.unwrap_or(trending::DEFAULT_LIMIT).min(MAX_TRENDING);

    let products = Products::find()
        .order_by_asc(ProdCol::CreatedAt)
        .order_by_asc(ProdCol::Id)
        .all(&state.orm)
        .await?;

    let favorites = count_by_product(
        &state.orm,
        Favorites::find(),
        FavoriteCol::ProductId,
        FavoriteCol::Id,
    )
    .await?;
    let reviews =
        count_by_product(&state.orm, Reviews::find(), ReviewCol::ProductId, ReviewCol::Id).await?;

    let scored = products
        .into_iter()
        .map(|product| {
            let favorites_count = favorites.get(&product.id).copied().unwrap_or(0);
            let reviews_count = reviews.get(&product.id).copied().unwrap_or(0);
            let view_count = product.view_count;
            Scored::new(product, favorites_count, reviews_count, view_count)
        })
        .collect();

    let items: Vec<TrendingProduct> = trending::rank(scored, limit)
        .into_iter()
        .map(|s| TrendingProduct {
            product: Product::from(s.item),
            trending_score: s.score,
            favorites_count: s.favorites_count,
            reviews_count: s.reviews_count,
        })
        .collect();

    let count = items.len();
    Ok(ApiResponse::success(
        "Trending products",
        TrendingList { items, count },
        Some(Meta::empty()),
    ))
}

async fn count_by_product<C, E, Col>(
    conn: &C,
    select: sea_orm::Select<E>,
    product_col: Col,
    id_col: Col,
) -> AppResult<HashMap<Uuid, u64>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    Col: ColumnTrait + Copy + 'static,
{
    let rows: Vec<(Uuid, i64)> = select
        .select_only()
        .column(product_col)
        .column_as(Expr::col(id_col).count(), "count")
        .group_by(product_col)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, count.max(0) as u64))
        .collect())
}
