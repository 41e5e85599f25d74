use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        analytics::{AdminOverview, ProducerStats, TrendingList, TrendingProduct},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        events::{RecordSearchRequest, SearchHistoryList},
        favorites::{AddFavoriteRequest, FavoriteProductList},
        orders::{OrderLineRequest, OrderList, OrderWithItems, PlaceOrderRequest, UpdateOrderStatusRequest},
        predictions::{CreatePredictionRequest, PredictionList},
        products::{
            CategoryList, CreateProductRequest, OrderableResponse, ProductList,
            UpdateProductRequest,
        },
        reviews::{CreateReviewRequest, FlagReviewRequest, ReviewList, UpdateReviewRequest},
        users::{ModerationLogList, UpdateUserStatusRequest},
    },
    entity::sea_orm_active_enums::{OrderStatus, Role},
    models::{
        AiPrediction, Favorite, ModerationLog, Order, OrderItem, ProducerSummary, Product,
        ProductView, Review, SearchEntry, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, analytics, auth, favorites, health, orders, params, predictions, products,
        reviews, search, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        users::get_user,
        users::delete_user,
        products::list_products,
        products::my_products,
        products::list_categories,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::check_orderable,
        products::record_view,
        products::list_reviews,
        products::create_review,
        reviews::update_review,
        reviews::delete_review,
        reviews::flag_review,
        reviews::unflag_review,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::update_order_status,
        search::record_search,
        search::search_history,
        predictions::create_prediction,
        predictions::list_predictions,
        predictions::product_predictions,
        analytics::producer_stats,
        analytics::admin_overview,
        analytics::trending_products,
        admin::update_user_status,
        admin::list_moderation_logs
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            User,
            ProducerSummary,
            Product,
            Review,
            Favorite,
            Order,
            OrderItem,
            SearchEntry,
            ProductView,
            AiPrediction,
            ModerationLog,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CategoryList,
            OrderableResponse,
            CreateReviewRequest,
            UpdateReviewRequest,
            FlagReviewRequest,
            ReviewList,
            AddFavoriteRequest,
            FavoriteProductList,
            PlaceOrderRequest,
            OrderLineRequest,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithItems,
            RecordSearchRequest,
            SearchHistoryList,
            CreatePredictionRequest,
            PredictionList,
            ProducerStats,
            AdminOverview,
            TrendingProduct,
            TrendingList,
            UpdateUserStatusRequest,
            ModerationLogList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<TrendingList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and the current account"),
        (name = "Users", description = "Account lookup and deletion"),
        (name = "Products", description = "Catalog and listings"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Moderation", description = "Review flagging"),
        (name = "Favorites", description = "Favorite products"),
        (name = "Orders", description = "Order placement and status"),
        (name = "Events", description = "Search and view ingestion"),
        (name = "Predictions", description = "Stored AI predictions"),
        (name = "Analytics", description = "Producer, platform and trending statistics"),
        (name = "Admin", description = "Account status and moderation history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
