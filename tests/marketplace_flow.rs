use regional_marketplace_api::{
    db::{create_pool, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        events::{RecordSearchRequest, ViewContext},
        favorites::AddFavoriteRequest,
        orders::{OrderLineRequest, PlaceOrderRequest, UpdateOrderStatusRequest},
        products::CreateProductRequest,
        reviews::{CreateReviewRequest, FlagReviewRequest},
        users::UpdateUserStatusRequest,
    },
    entity::sea_orm_active_enums::{OrderStatus, Role},
    error::AppError,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{ModerationLogQuery, OrderListQuery, Pagination, ProductQuery},
    services::{
        admin_service, analytics_service, auth_service, event_service, favorite_service,
        order_service, product_service, review_service, user_service,
    },
    state::AppState,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

fn data<T>(response: ApiResponse<T>) -> T {
    response.data.expect("response data")
}

async fn setup(url: &str) -> AppState {
    let pool = create_pool(url, 5).await.expect("connect");
    let state = AppState::new(pool);
    run_migrations(&state.pool).await.expect("migrations");
    sqlx::query(
        "TRUNCATE moderation_logs, ai_predictions, product_views, search_history, \
         order_items, orders, favorites, reviews, products, users CASCADE",
    )
    .execute(&state.pool)
    .await
    .expect("truncate");
    state
}

async fn register(state: &AppState, username: &str, role: Role) -> AuthUser {
    let payload = RegisterRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "password123".to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        role,
        phone: None,
        address: None,
        city: Some("Marrakech".to_string()),
        region: Some("Marrakech-Safi".to_string()),
        country: None,
        latitude: None,
        longitude: None,
    };
    let user = data(
        auth_service::register_user(state, payload)
            .await
            .expect("register"),
    );
    assert_eq!(user.country, "Morocco");
    AuthUser {
        user_id: user.id,
        role: user.role,
    }
}

async fn promote_to_admin(state: &AppState, user: AuthUser) -> AuthUser {
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(user.user_id)
        .execute(&state.pool)
        .await
        .expect("promote");
    AuthUser {
        user_id: user.user_id,
        role: Role::Admin,
    }
}

fn listing(name: &str, category: &str, price: Decimal) -> CreateProductRequest {
    CreateProductRequest {
        name: name.to_string(),
        description: format!("{name} from the Atlas"),
        category: category.to_string(),
        subcategory: None,
        price,
        currency: None,
        unit: Some("kg".to_string()),
        stock_quantity: Some(10),
        min_order_quantity: Some(1),
        max_order_quantity: Some(5),
        images: None,
        tags: Some(vec!["local".to_string(), " local ".to_string()]),
        is_organic: Some(true),
        is_available: None,
        harvest_date: None,
        expiry_date: None,
    }
}

#[tokio::test]
async fn marketplace_end_to_end() {
    let Some(url) = database_url() else {
        eprintln!("skipping: TEST_DATABASE_URL or DATABASE_URL not set");
        return;
    };
    unsafe { std::env::set_var("JWT_SECRET", "test-secret") };
    let state = setup(&url).await;

    let producer = register(&state, "fatima", Role::Producer).await;
    let consumer = register(&state, "youssef", Role::Consumer).await;
    let other_consumer = register(&state, "salma", Role::Consumer).await;
    let admin = register(&state, "moderator", Role::Consumer).await;
    let admin = promote_to_admin(&state, admin).await;

    let duplicate = auth_service::register_user(
        &state,
        RegisterRequest {
            username: "someone_else".to_string(),
            email: "FATIMA@example.com".to_string(),
            password: "password123".to_string(),
            first_name: "Dup".to_string(),
            last_name: "Dup".to_string(),
            role: Role::Consumer,
            phone: None,
            address: None,
            city: None,
            region: None,
            country: None,
            latitude: None,
            longitude: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let login = data(
        auth_service::login_user(
            &state,
            LoginRequest {
                email: "youssef@example.com".to_string(),
                password: "password123".to_string(),
            },
        )
        .await
        .expect("login"),
    );
    assert_eq!(login.user.id, consumer.user_id);
    assert!(!login.token.starts_with("Bearer"));

    let wrong_password = auth_service::login_user(
        &state,
        LoginRequest {
            email: "youssef@example.com".to_string(),
            password: "not-the-password".to_string(),
        },
    )
    .await;
    assert!(matches!(wrong_password, Err(AppError::Unauthorized)));

    // catalog: 23 visible listings plus one hidden
    let mut products = Vec::new();
    for i in 0..23 {
        let category = if i % 2 == 0 { "Oils" } else { "Spices" };
        let created = data(
            product_service::create_product(
                &state,
                &producer,
                listing(&format!("Product {i:02}"), category, Decimal::new(1000 + i, 2)),
            )
            .await
            .expect("create product"),
        );
        products.push(created);
    }
    assert_eq!(products[0].tags, vec!["local".to_string()]);

    let mut hidden = listing("Hidden Oil", "Oils", Decimal::new(500, 2));
    hidden.is_available = Some(false);
    product_service::create_product(&state, &producer, hidden)
        .await
        .expect("create hidden product");

    let consumer_listing =
        product_service::create_product(&state, &consumer, listing("Nope", "Oils", Decimal::ONE))
            .await;
    assert!(matches!(consumer_listing, Err(AppError::Forbidden)));

    let negative = product_service::create_product(
        &state,
        &producer,
        listing("Negative", "Oils", Decimal::new(-1, 0)),
    )
    .await;
    assert!(matches!(negative, Err(AppError::BadRequest(_))));

    let first_page = product_service::query_catalog(&state, ProductQuery::default())
        .await
        .expect("catalog");
    let meta = first_page.meta.clone().expect("meta");
    assert_eq!(meta.total, Some(23));
    assert_eq!(meta.pages, Some(3));
    assert_eq!(meta.per_page, Some(10));
    assert_eq!(data(first_page).items.len(), 10);

    let last_page = product_service::query_catalog(
        &state,
        ProductQuery {
            page: Some(3),
            ..Default::default()
        },
    )
    .await
    .expect("page 3");
    assert_eq!(data(last_page).items.len(), 3);

    let past_end = product_service::query_catalog(
        &state,
        ProductQuery {
            page: Some(4),
            ..Default::default()
        },
    )
    .await
    .expect("page 4");
    let past_end_meta = past_end.meta.clone().expect("meta");
    assert_eq!(past_end_meta.total, Some(23));
    assert_eq!(past_end_meta.pages, Some(3));
    assert_eq!(past_end_meta.page, Some(4));
    assert!(data(past_end).items.is_empty());

    let far_past_end = product_service::query_catalog(
        &state,
        ProductQuery {
            page: Some(i64::MAX),
            ..Default::default()
        },
    )
    .await
    .expect("far past the end");
    assert_eq!(far_past_end.meta.clone().expect("meta").total, Some(23));
    assert!(data(far_past_end).items.is_empty());

    let oils = product_service::query_catalog(
        &state,
        ProductQuery {
            category: Some("Oils".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("category filter");
    assert_eq!(oils.meta.clone().expect("meta").total, Some(12));

    let searched = product_service::query_catalog(
        &state,
        ProductQuery {
            search: Some("product 07".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("search");
    let searched = data(searched);
    assert_eq!(searched.items.len(), 1);
    assert_eq!(searched.items[0].id, products[7].id);

    let categories = data(
        product_service::list_categories(&state)
            .await
            .expect("categories"),
    );
    assert_eq!(categories.categories, vec!["Oils", "Spices"]);

    let too_many = data(
        product_service::check_orderable(&state, products[0].id, 6)
            .await
            .expect("orderable"),
    );
    assert!(!too_many.orderable);
    assert_eq!(
        too_many.reason.as_deref(),
        Some("maximum order quantity is 5")
    );

    // orders
    let over_max = order_service::place_order(
        &state,
        &consumer,
        PlaceOrderRequest {
            items: vec![OrderLineRequest {
                product_id: products[0].id,
                quantity: 6,
            }],
            shipping_address: "12 Rue Bab Agnaou".to_string(),
            notes: None,
        },
    )
    .await;
    assert!(matches!(over_max, Err(AppError::BadRequest(_))));

    // 3 + 3 of one product exceeds its maximum of 5 once the lines are combined
    let repeated_lines = order_service::place_order(
        &state,
        &consumer,
        PlaceOrderRequest {
            items: vec![
                OrderLineRequest {
                    product_id: products[2].id,
                    quantity: 3,
                },
                OrderLineRequest {
                    product_id: products[2].id,
                    quantity: 3,
                },
            ],
            shipping_address: "12 Rue Bab Agnaou".to_string(),
            notes: None,
        },
    )
    .await;
    assert!(matches!(repeated_lines, Err(AppError::BadRequest(_))));

    let producer_order = order_service::place_order(
        &state,
        &producer,
        PlaceOrderRequest {
            items: vec![OrderLineRequest {
                product_id: products[0].id,
                quantity: 1,
            }],
            shipping_address: "Somewhere".to_string(),
            notes: None,
        },
    )
    .await;
    assert!(matches!(producer_order, Err(AppError::Forbidden)));

    let placed = data(
        order_service::place_order(
            &state,
            &consumer,
            PlaceOrderRequest {
                items: vec![
                    OrderLineRequest {
                        product_id: products[0].id,
                        quantity: 2,
                    },
                    OrderLineRequest {
                        product_id: products[1].id,
                        quantity: 1,
                    },
                ],
                shipping_address: "12 Rue Bab Agnaou".to_string(),
                notes: Some("ring twice".to_string()),
            },
        )
        .await
        .expect("place order"),
    );
    let order_id = placed.order.id;
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.producer_id, producer.user_id);
    assert_eq!(placed.order.total_amount, Decimal::new(3001, 2));
    assert_eq!(placed.items.len(), 2);
    assert_eq!(placed.items[0].product_id, products[0].id);

    let by_consumer = order_service::update_order_status(
        &state,
        &consumer,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Confirmed,
        },
    )
    .await;
    assert!(matches!(by_consumer, Err(AppError::Forbidden)));

    let skip_ahead = order_service::update_order_status(
        &state,
        &producer,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
        },
    )
    .await;
    assert!(matches!(skip_ahead, Err(AppError::BadRequest(_))));

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let updated = data(
            order_service::update_order_status(
                &state,
                &producer,
                order_id,
                UpdateOrderStatusRequest { status },
            )
            .await
            .expect("advance order"),
        );
        assert_eq!(updated.order.status, status);
    }

    let cancel_delivered = order_service::update_order_status(
        &state,
        &producer,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Cancelled,
        },
    )
    .await;
    assert!(matches!(cancel_delivered, Err(AppError::BadRequest(_))));

    let hidden_from_other = order_service::get_order(&state, &other_consumer, order_id).await;
    assert!(matches!(hidden_from_other, Err(AppError::NotFound)));

    // reviews
    let verified = data(
        review_service::create_review(
            &state,
            &consumer,
            products[0].id,
            CreateReviewRequest {
                rating: 5,
                title: Some("Excellent".to_string()),
                comment: None,
            },
        )
        .await
        .expect("review"),
    );
    assert!(verified.is_verified_purchase);

    let again = review_service::create_review(
        &state,
        &consumer,
        products[0].id,
        CreateReviewRequest {
            rating: 4,
            title: None,
            comment: None,
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let unverified = data(
        review_service::create_review(
            &state,
            &other_consumer,
            products[0].id,
            CreateReviewRequest {
                rating: 2,
                title: None,
                comment: Some("too bitter".to_string()),
            },
        )
        .await
        .expect("second review"),
    );
    assert!(!unverified.is_verified_purchase);

    let reviews = data(
        review_service::list_reviews(&state, products[0].id, Pagination::default())
            .await
            .expect("reviews"),
    );
    assert_eq!(reviews.review_count, 2);
    assert_eq!(reviews.average_rating, 3.5);

    let flag_by_consumer = review_service::flag_review(
        &state,
        &consumer,
        unverified.id,
        FlagReviewRequest {
            reason: "spam".to_string(),
        },
    )
    .await;
    assert!(matches!(flag_by_consumer, Err(AppError::Forbidden)));

    let flagged = data(
        review_service::flag_review(
            &state,
            &admin,
            unverified.id,
            FlagReviewRequest {
                reason: "spam".to_string(),
            },
        )
        .await
        .expect("flag"),
    );
    assert!(flagged.is_flagged);
    assert_eq!(flagged.flag_reason.as_deref(), Some("spam"));

    let after_flag = data(
        review_service::list_reviews(&state, products[0].id, Pagination::default())
            .await
            .expect("reviews after flag"),
    );
    assert_eq!(after_flag.items.len(), 2);
    assert_eq!(after_flag.review_count, 1);
    assert_eq!(after_flag.average_rating, 5.0);

    let unflagged = data(
        review_service::unflag_review(&state, &admin, unverified.id)
            .await
            .expect("unflag"),
    );
    assert!(!unflagged.is_flagged);
    assert!(unflagged.flag_reason.is_none());

    let rated = data(
        product_service::get_product(&state, products[0].id)
            .await
            .expect("product"),
    );
    assert_eq!(rated.review_count, Some(2));
    assert_eq!(rated.average_rating, Some(3.5));
    assert_eq!(
        rated.producer.as_ref().map(|p| p.id),
        Some(producer.user_id)
    );

    // favorites
    favorite_service::add_favorite(
        &state,
        &consumer,
        AddFavoriteRequest {
            product_id: products[1].id,
        },
    )
    .await
    .expect("favorite");
    let twice = favorite_service::add_favorite(
        &state,
        &consumer,
        AddFavoriteRequest {
            product_id: products[1].id,
        },
    )
    .await;
    assert!(matches!(twice, Err(AppError::Conflict(_))));

    let producer_favorite = favorite_service::add_favorite(
        &state,
        &producer,
        AddFavoriteRequest {
            product_id: products[1].id,
        },
    )
    .await;
    assert!(matches!(producer_favorite, Err(AppError::Forbidden)));

    let favorites = data(
        favorite_service::list_favorites(&state, &consumer, Pagination::default())
            .await
            .expect("favorites"),
    );
    assert_eq!(favorites.items.len(), 1);
    assert_eq!(favorites.items[0].id, products[1].id);

    let missing = favorite_service::remove_favorite(&state, &consumer, products[2].id).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // events
    for _ in 0..2 {
        event_service::record_view(
            &state,
            None,
            products[1].id,
            ViewContext {
                ip_address: Some("203.0.113.7".to_string()),
                user_agent: Some("curl/8".to_string()),
            },
        )
        .await
        .expect("view");
    }
    let unknown_view =
        event_service::record_view(&state, None, Uuid::new_v4(), ViewContext::default()).await;
    assert!(matches!(unknown_view, Err(AppError::NotFound)));

    event_service::record_search(
        &state,
        Some(&consumer),
        RecordSearchRequest {
            query: "argan".to_string(),
            filters: None,
            results_count: Some(3),
        },
    )
    .await
    .expect("search");
    let history = data(
        event_service::search_history(&state, &consumer, Pagination::default())
            .await
            .expect("history"),
    );
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].search_query, "argan");

    // analytics
    let trending = data(
        analytics_service::trending(&state, Some(3))
            .await
            .expect("trending"),
    );
    assert_eq!(trending.count, 3);
    // two reviews score 3.0; one favorite and two views score 2.2
    assert_eq!(trending.items[0].product.id, products[0].id);
    assert_eq!(trending.items[0].reviews_count, 2);
    assert_eq!(trending.items[1].product.id, products[1].id);
    assert_eq!(trending.items[1].favorites_count, 1);
    assert!((trending.items[1].trending_score - 2.2).abs() < 1e-9);

    let stats = data(
        analytics_service::producer_stats(&state, &producer, producer.user_id)
            .await
            .expect("producer stats"),
    );
    assert_eq!(stats.total_products, 24);
    assert_eq!(stats.total_views, 2);
    assert_eq!(stats.total_favorites, 1);
    assert_eq!(stats.total_reviews, 2);
    assert_eq!(stats.average_rating, 3.5);

    // a flagged review still counts toward the total but not the average
    review_service::flag_review(
        &state,
        &admin,
        unverified.id,
        FlagReviewRequest {
            reason: "off topic".to_string(),
        },
    )
    .await
    .expect("flag again");
    let flagged_stats = data(
        analytics_service::producer_stats(&state, &producer, producer.user_id)
            .await
            .expect("producer stats with a flagged review"),
    );
    assert_eq!(flagged_stats.total_reviews, 2);
    assert_eq!(flagged_stats.average_rating, 5.0);

    let consumer_stats =
        analytics_service::producer_stats(&state, &consumer, producer.user_id).await;
    assert!(matches!(consumer_stats, Err(AppError::Forbidden)));

    let overview = data(
        analytics_service::admin_overview(&state, &admin)
            .await
            .expect("overview"),
    );
    assert_eq!(overview.total_users, 4);
    assert_eq!(overview.total_products, 24);
    assert_eq!(overview.total_reviews, 2);
    assert_eq!(overview.total_favorites, 1);
    assert_eq!(overview.total_searches, 1);
    assert_eq!(overview.role_distribution.get("consumer"), Some(&2));
    assert_eq!(overview.role_distribution.get("producer"), Some(&1));
    assert_eq!(overview.role_distribution.get("admin"), Some(&1));
    assert_eq!(overview.category_distribution.get("Oils"), Some(&13));
    assert_eq!(overview.category_distribution.get("Spices"), Some(&11));

    // administration
    let suspended = data(
        admin_service::update_user_status(
            &state,
            &admin,
            other_consumer.user_id,
            UpdateUserStatusRequest {
                is_active: false,
                reason: Some("abuse".to_string()),
            },
        )
        .await
        .expect("suspend"),
    );
    assert!(!suspended.is_active);

    let suspended_login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "salma@example.com".to_string(),
            password: "password123".to_string(),
        },
    )
    .await;
    assert!(matches!(suspended_login, Err(AppError::Unauthorized)));

    let self_suspend = admin_service::update_user_status(
        &state,
        &admin,
        admin.user_id,
        UpdateUserStatusRequest {
            is_active: false,
            reason: None,
        },
    )
    .await;
    assert!(matches!(self_suspend, Err(AppError::BadRequest(_))));

    let logs = admin_service::list_moderation_logs(&state, &admin, ModerationLogQuery::default())
        .await
        .expect("moderation logs");
    assert_eq!(logs.meta.clone().expect("meta").total, Some(4));
    let actions: Vec<String> = data(logs).items.into_iter().map(|l| l.action).collect();
    assert!(actions.contains(&"flag".to_string()));
    assert!(actions.contains(&"unflag".to_string()));
    assert!(actions.contains(&"suspend".to_string()));

    let review_logs = admin_service::list_moderation_logs(
        &state,
        &admin,
        ModerationLogQuery {
            target_type: Some("review".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("review logs");
    assert_eq!(review_logs.meta.clone().expect("meta").total, Some(3));

    // account deletion keeps order history
    let not_yours = user_service::delete_user(&state, &consumer, producer.user_id).await;
    assert!(matches!(not_yours, Err(AppError::Forbidden)));

    user_service::delete_user(&state, &admin, producer.user_id)
        .await
        .expect("delete producer");

    let gone = product_service::get_product(&state, products[0].id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    let empty_catalog = product_service::query_catalog(&state, ProductQuery::default())
        .await
        .expect("catalog after delete");
    assert_eq!(empty_catalog.meta.clone().expect("meta").total, Some(0));

    let orders = order_service::list_orders(&state, &consumer, OrderListQuery::default())
        .await
        .expect("orders after delete");
    assert_eq!(orders.meta.clone().expect("meta").total, Some(1));
    assert_eq!(data(orders).items[0].id, order_id);

    let remaining_favorites = data(
        favorite_service::list_favorites(&state, &consumer, Pagination::default())
            .await
            .expect("favorites after delete"),
    );
    assert!(remaining_favorites.items.is_empty());

    // search text is matched literally, wildcards included
    let spice_seller = register(&state, "hassan", Role::Producer).await;
    let literal = data(
        product_service::create_product(
            &state,
            &spice_seller,
            listing("Mix_50% blend", "Spices", Decimal::new(2000, 2)),
        )
        .await
        .expect("create literal product"),
    );
    let lookalike = data(
        product_service::create_product(
            &state,
            &spice_seller,
            listing("Mixa50x blend", "Spices", Decimal::new(2000, 2)),
        )
        .await
        .expect("create lookalike product"),
    );

    let wildcard_text = data(
        product_service::query_catalog(
            &state,
            ProductQuery {
                search: Some("x_50%".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("literal search"),
    );
    assert_eq!(wildcard_text.items.len(), 1);
    assert_eq!(wildcard_text.items[0].id, literal.id);

    let percent = data(
        product_service::query_catalog(
            &state,
            ProductQuery {
                search: Some("xa50%".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("percent search"),
    );
    assert!(percent.items.is_empty());

    let plain = data(
        product_service::query_catalog(
            &state,
            ProductQuery {
                search: Some("MIXA50".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("plain search"),
    );
    assert_eq!(plain.items.len(), 1);
    assert_eq!(plain.items[0].id, lookalike.id);
}
