pub mod analytics_event;
pub mod menu_category;
pub mod menu_item;
pub mod menu_translation;
pub mod restaurant;
pub mod restaurant_event;
pub mod review;
pub mod user_account;
pub mod user_agent;

pub use analytics_event::Entity as AnalyticsEventEntity;
pub use menu_category::Entity as MenuCategoryEntity;
pub use menu_item::Entity as MenuItemEntity;
pub use menu_translation::Entity as MenuTranslationEntity;
pub use restaurant::Entity as RestaurantEntity;
pub use restaurant_event::Entity as RestaurantEventEntity;
pub use review::Entity as ReviewEntity;
pub use user_account::Entity as UserAccountEntity;
pub use user_agent::Entity as UserAgentEntity;
