//! Owner login and registration
//!
//! Both endpoints sit behind per-IP fixed-window limits. The login
//! failure message never reveals whether the account exists, and the
//! degraded-mode routing lives entirely inside `DegradableAuth`; these
//! handlers only see the provider interface.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, Responder, Result as ActixResult, web};
use tracing::{error, info, warn};

use crate::api::error_code::ErrorCode;
use crate::api::helpers::{error_from, error_response, rate_limited_response, success_response};
use crate::api::jwt::get_jwt_service;
use crate::api::messages::{self, Lang};
use crate::api::types::{
    AuthSuccessResponse, LoginRequest, RegisterRequest, RestaurantSummary, UserSummary,
};
use crate::errors::QrMenuError;
use crate::ratelimit::{FixedWindowLimiter, LOGIN_POLICY, REGISTER_POLICY, ip_key};
use crate::services::auth_provider::{DegradableAuth, NewAccount};
use crate::storage::SeaOrmStorage;
use crate::utils::ip::extract_client_ip;
use crate::utils::sanitize::{sanitize_name, slugify};
use crate::utils::validators::{is_valid_email, is_valid_slug, validate_password};

pub async fn login(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    auth: web::Data<DegradableAuth>,
    storage: web::Data<SeaOrmStorage>,
    limiter: web::Data<FixedWindowLimiter>,
) -> ActixResult<impl Responder> {
    let lang = Lang::from_request(&req);
    let body = body.into_inner();

    let client_ip = extract_client_ip(&req).unwrap_or_else(|| "unknown".to_string());
    let decision = limiter.check(&ip_key("login", &client_ip), LOGIN_POLICY).await;
    if !decision.allowed {
        warn!("Login rate limit hit for {}", client_ip);
        return Ok(rate_limited_response(lang, decision.retry_after_secs()));
    }

    let Some(email) = body.email.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty())
    else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "email"),
        ));
    };
    let Some(password) = body.password.filter(|p| !p.is_empty()) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "password"),
        ));
    };

    if !is_valid_email(&email) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::invalid_field(lang, "email"),
        ));
    }

    let user = match auth.verify_credentials(&email, &password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Same message for unknown account and wrong password
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::AuthFailed,
                messages::invalid_credentials(lang),
            ));
        }
        Err(e) => return Ok(error_from(&e, lang)),
    };

    let jwt = get_jwt_service();
    let access_token = match jwt.generate_access_token(&user) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate access token: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                messages::server_error(lang),
            ));
        }
    };

    // Restaurant summary is best-effort: a degraded store must not fail
    // an otherwise valid login
    let restaurant = storage
        .find_restaurant_by_id(&user.restaurant_id)
        .await
        .ok()
        .flatten()
        .map(|r| RestaurantSummary {
            id: r.id,
            name: r.name,
            slug: r.slug,
        });

    info!("Login successful for {}", user.email);

    Ok(success_response(AuthSuccessResponse {
        user: UserSummary {
            id: user.id,
            email: user.email,
        },
        restaurant,
        access_token,
        expires_in: jwt.access_token_secs(),
    }))
}

pub async fn register(
    req: HttpRequest,
    body: web::Json<RegisterRequest>,
    auth: web::Data<DegradableAuth>,
    limiter: web::Data<FixedWindowLimiter>,
) -> ActixResult<impl Responder> {
    let lang = Lang::from_request(&req);
    let body = body.into_inner();

    let client_ip = extract_client_ip(&req).unwrap_or_else(|| "unknown".to_string());
    let decision = limiter
        .check(&ip_key("register", &client_ip), REGISTER_POLICY)
        .await;
    if !decision.allowed {
        warn!("Register rate limit hit for {}", client_ip);
        return Ok(rate_limited_response(lang, decision.retry_after_secs()));
    }

    let Some(email) = body.email.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty())
    else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "email"),
        ));
    };
    if !is_valid_email(&email) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::invalid_field(lang, "email"),
        ));
    }

    let Some(password) = body.password.filter(|p| !p.is_empty()) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "password"),
        ));
    };
    let password_check = validate_password(&password);
    if !password_check.valid {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            password_check.message.unwrap_or("invalid password"),
        ));
    }

    let restaurant_name = body
        .restaurant_name
        .map(|n| sanitize_name(&n))
        .filter(|n| !n.is_empty());
    let Some(restaurant_name) = restaurant_name else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "restaurantName"),
        ));
    };

    let Some(raw_slug) = body.slug.filter(|s| !s.is_empty()) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "slug"),
        ));
    };
    // Normalize whatever the owner typed into canonical slug form
    let slug = slugify(&raw_slug);
    if !is_valid_slug(&slug) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::invalid_field(lang, "slug"),
        ));
    }

    let provisioned = match auth
        .register(NewAccount {
            email,
            password,
            restaurant_name,
            slug,
        })
        .await
    {
        Ok(provisioned) => provisioned,
        Err(e @ QrMenuError::Validation(_)) => {
            // Duplicate email/slug surfaces as a named validation error
            return Ok(error_from(&e, lang));
        }
        Err(e) => {
            warn!("Registration failed: {}", e);
            return Ok(error_from(&e, lang));
        }
    };

    let jwt = get_jwt_service();
    let access_token = match jwt.generate_access_token(&provisioned.user) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate access token: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                messages::server_error(lang),
            ));
        }
    };

    info!(
        "Registered {} with restaurant '{}'",
        provisioned.user.email, provisioned.restaurant_slug
    );

    Ok(success_response(AuthSuccessResponse {
        user: UserSummary {
            id: provisioned.user.id.clone(),
            email: provisioned.user.email.clone(),
        },
        restaurant: Some(RestaurantSummary {
            id: provisioned.user.restaurant_id.clone(),
            name: provisioned.restaurant_name,
            slug: provisioned.restaurant_slug,
        }),
        access_token,
        expires_in: jwt.access_token_secs(),
    }))
}
