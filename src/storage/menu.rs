//! Menu and account queries
//!
//! Read paths for the public menu payload plus the few writes the
//! registration flow needs.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::errors::Result;
use migration::entities::{
    menu_category, menu_item, menu_translation, restaurant, restaurant_event, user_account,
};

impl super::SeaOrmStorage {
    pub async fn find_restaurant_by_slug(&self, slug: &str) -> Result<Option<restaurant::Model>> {
        restaurant::Entity::find()
            .filter(restaurant::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn find_restaurant_by_id(&self, id: &str) -> Result<Option<restaurant::Model>> {
        restaurant::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count = restaurant::Entity::find()
            .filter(restaurant::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Active categories ordered for display
    pub async fn list_active_categories(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<menu_category::Model>> {
        menu_category::Entity::find()
            .filter(menu_category::Column::RestaurantId.eq(restaurant_id))
            .filter(menu_category::Column::IsActive.eq(true))
            .order_by_asc(menu_category::Column::SortOrder)
            .order_by_asc(menu_category::Column::Name)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Active items ordered for display
    pub async fn list_active_items(&self, restaurant_id: &str) -> Result<Vec<menu_item::Model>> {
        menu_item::Entity::find()
            .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
            .filter(menu_item::Column::IsActive.eq(true))
            .order_by_asc(menu_item::Column::SortOrder)
            .order_by_asc(menu_item::Column::Name)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// All translations for one restaurant and locale
    pub async fn list_translations(
        &self,
        restaurant_id: &str,
        locale: &str,
    ) -> Result<Vec<menu_translation::Model>> {
        menu_translation::Entity::find()
            .filter(menu_translation::Column::RestaurantId.eq(restaurant_id))
            .filter(menu_translation::Column::Locale.eq(locale))
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Active announcements, soonest first
    pub async fn list_active_events(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<restaurant_event::Model>> {
        restaurant_event::Entity::find()
            .filter(restaurant_event::Column::RestaurantId.eq(restaurant_id))
            .filter(restaurant_event::Column::IsActive.eq(true))
            .order_by_asc(restaurant_event::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    // ============ Accounts ============

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<user_account::Model>> {
        user_account::Entity::find()
            .filter(user_account::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = user_account::Entity::find()
            .filter(user_account::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert_account(&self, model: user_account::ActiveModel) -> Result<()> {
        model.insert(&self.db).await?;
        Ok(())
    }

    pub async fn insert_restaurant(&self, model: restaurant::ActiveModel) -> Result<()> {
        model.insert(&self.db).await?;
        self.invalidate_menu_cache();
        Ok(())
    }
}
