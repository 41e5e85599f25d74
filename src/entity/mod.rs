pub mod ai_predictions;
pub mod favorites;
pub mod moderation_logs;
pub mod order_items;
pub mod orders;
pub mod product_views;
pub mod products;
pub mod reviews;
pub mod sea_orm_active_enums;
pub mod search_history;
pub mod users;

pub use ai_predictions::Entity as AiPredictions;
pub use favorites::Entity as Favorites;
pub use moderation_logs::Entity as ModerationLogs;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_views::Entity as ProductViews;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use search_history::Entity as SearchHistory;
pub use users::Entity as Users;
