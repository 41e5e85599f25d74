pub mod admin_service;
pub mod analytics_service;
pub mod auth_service;
pub mod event_service;
pub mod favorite_service;
pub mod order_service;
pub mod prediction_service;
pub mod product_service;
pub mod review_service;
pub mod user_service;
