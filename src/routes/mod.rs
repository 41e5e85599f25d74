use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod orders;
pub mod params;
pub mod predictions;
pub mod products;
pub mod reviews;
pub mod search;
pub mod users;

// State is attached by the caller.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/reviews", reviews::router())
        .nest("/favorites", favorites::router())
        .nest("/orders", orders::router())
        .nest("/search", search::router())
        .nest("/ai", predictions::router())
        .nest("/analytics", analytics::router())
        .nest("/admin", admin::router())
}
