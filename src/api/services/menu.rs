//! Public menu payload
//!
//! GET /api/menu/public?slug=&lang=. The assembled payload is cached per
//! slug/lang pair with a short TTL because every QR scan lands here.

use std::collections::HashMap;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use serde::Serialize;
use tracing::{debug, error};

use crate::api::constants::DEFAULT_LANG;
use crate::api::error_code::ErrorCode;
use crate::api::helpers::error_response;
use crate::api::messages::{self, Lang};
use crate::api::types::PublicMenuQuery;
use crate::storage::SeaOrmStorage;
use crate::utils::sanitize::slugify;
use crate::utils::validators::is_valid_slug;

#[derive(Debug, Serialize)]
struct MenuRestaurant {
    id: String,
    name: String,
    slug: String,
    default_lang: String,
}

#[derive(Debug, Serialize)]
struct MenuItemPayload {
    id: String,
    name: String,
    description: Option<String>,
    price: i64,
    currency: String,
}

#[derive(Debug, Serialize)]
struct MenuCategoryPayload {
    id: String,
    name: String,
    sort_order: i32,
    items: Vec<MenuItemPayload>,
}

#[derive(Debug, Serialize)]
struct MenuEventPayload {
    id: String,
    title: String,
    description: Option<String>,
    starts_at: chrono::DateTime<chrono::Utc>,
    ends_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize)]
struct PublicMenuPayload {
    restaurant: MenuRestaurant,
    settings: serde_json::Value,
    categories: Vec<MenuCategoryPayload>,
    /// "entity_type:entity_id:field" -> translated value
    translations: HashMap<String, String>,
    events: Vec<MenuEventPayload>,
}

pub async fn public_menu(
    req: HttpRequest,
    query: web::Query<PublicMenuQuery>,
    storage: web::Data<SeaOrmStorage>,
) -> ActixResult<impl Responder> {
    let resp_lang = Lang::from_request(&req);
    let query = query.into_inner();

    let Some(raw_slug) = query.slug.filter(|s| !s.is_empty()) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(resp_lang, "slug"),
        ));
    };

    // Normalize before validating so QR codes with stray casing still hit
    let slug = slugify(&raw_slug);
    if !is_valid_slug(&slug) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::invalid_field(resp_lang, "slug"),
        ));
    }

    let menu_lang = query
        .lang
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LANG.to_string());

    let cache_key = format!("{}:{}", slug, menu_lang);
    if let Some(cached) = storage.menu_cache().get(&cache_key) {
        debug!("Menu cache hit for {}", cache_key);
        return Ok(HttpResponse::Ok().json(cached));
    }

    let restaurant = match storage.find_restaurant_by_slug(&slug).await {
        Ok(Some(restaurant)) => restaurant,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                messages::restaurant_not_found(resp_lang),
            ));
        }
        Err(e) => {
            error!("Menu query failed for slug '{}': {}", slug, e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                messages::server_error(resp_lang),
            ));
        }
    };

    let loaded = tokio::try_join!(
        storage.list_active_categories(&restaurant.id),
        storage.list_active_items(&restaurant.id),
        storage.list_translations(&restaurant.id, &menu_lang),
        storage.list_active_events(&restaurant.id),
    );

    let (categories, items, translations, events) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Menu query failed for slug '{}': {}", slug, e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                messages::server_error(resp_lang),
            ));
        }
    };

    // Nest items under their categories, preserving query order
    let mut items_by_category: HashMap<String, Vec<MenuItemPayload>> = HashMap::new();
    for item in items {
        items_by_category
            .entry(item.category_id.clone())
            .or_default()
            .push(MenuItemPayload {
                id: item.id,
                name: item.name,
                description: item.description,
                price: item.price,
                currency: item.currency,
            });
    }

    let categories: Vec<MenuCategoryPayload> = categories
        .into_iter()
        .map(|category| MenuCategoryPayload {
            items: items_by_category.remove(&category.id).unwrap_or_default(),
            id: category.id,
            name: category.name,
            sort_order: category.sort_order,
        })
        .collect();

    let translations: HashMap<String, String> = translations
        .into_iter()
        .map(|t| {
            (
                format!("{}:{}:{}", t.entity_type, t.entity_id, t.field),
                t.value,
            )
        })
        .collect();

    let events: Vec<MenuEventPayload> = events
        .into_iter()
        .map(|event| MenuEventPayload {
            id: event.id,
            title: event.title,
            description: event.description,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
        })
        .collect();

    let settings = restaurant
        .settings
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_else(|| serde_json::json!({}));

    let payload = PublicMenuPayload {
        restaurant: MenuRestaurant {
            id: restaurant.id,
            name: restaurant.name,
            slug: restaurant.slug,
            default_lang: restaurant.default_lang,
        },
        settings,
        categories,
        translations,
        events,
    };

    let value = match serde_json::to_value(&payload) {
        Ok(value) => value,
        Err(e) => {
            error!("Menu payload serialization failed: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                messages::server_error(resp_lang),
            ));
        }
    };

    storage.menu_cache().insert(cache_key, value.clone());

    Ok(HttpResponse::Ok().json(value))
}
