//! HTTP surface: types, handlers and middleware

pub mod constants;
pub mod error_code;
pub mod helpers;
pub mod jwt;
pub mod messages;
pub mod middleware;
pub mod services;
pub mod types;
