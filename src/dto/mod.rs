pub mod analytics;
pub mod auth;
pub mod events;
pub mod favorites;
pub mod orders;
pub mod predictions;
pub mod products;
pub mod reviews;
pub mod users;
