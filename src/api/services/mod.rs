//! HTTP handlers and route tables

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod menu;
pub mod reviews;
pub mod track;

pub use health::AppStartTime;

use actix_web::{Scope, web};

/// All /api routes
pub fn api_routes() -> Scope {
    web::scope("/api")
        .route("/analytics/track", web::post().to(track::track_event))
        .route("/reviews/public", web::post().to(reviews::submit_review))
        .route("/menu/public", web::get().to(menu::public_menu))
        .service(
            web::scope("/auth")
                .route("/login", web::post().to(auth::login))
                .route("/register", web::post().to(auth::register)),
        )
        .route("/dashboard/metrics", web::get().to(dashboard::metrics))
}

/// Health probe routes
pub fn health_routes() -> Scope {
    web::scope("/health").route("", web::get().to(health::health_check))
}
