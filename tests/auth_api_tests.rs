//! Auth and dashboard endpoint tests
//!
//! Registration provisions an account plus restaurant; login returns a
//! bearer token the dashboard endpoint accepts. Failure messages stay
//! vague about whether an account exists.

use std::sync::{Arc, Once};
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::json;
use tempfile::TempDir;

use qrmenu::api::middleware::SecurityHeaders;
use qrmenu::api::services::api_routes;
use qrmenu::config::init_config;
use qrmenu::ratelimit::{FixedWindowLimiter, MemoryStore};
use qrmenu::services::auth_provider::{DegradableAuth, MemoryAuthProvider, SeaOrmAuthProvider};
use qrmenu::services::metrics_service::MetricsService;
use qrmenu::services::session::SessionCorrelator;
use qrmenu::services::user_agent::{UaFlushScheduler, UserAgentStore};
use qrmenu::storage::SeaOrmStorage;

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

struct TestContext {
    storage: Arc<SeaOrmStorage>,
    limiter: FixedWindowLimiter,
    correlator: SessionCorrelator,
    ua_store: Arc<UserAgentStore>,
    ua_flusher: Arc<UaFlushScheduler>,
    metrics_service: Arc<MetricsService>,
    auth: Arc<DegradableAuth>,
    _td: TempDir,
}

async fn create_context() -> TestContext {
    init_static_config();

    let td = TempDir::new().unwrap();
    let p = td.path().join("auth_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let storage = Arc::new(SeaOrmStorage::new(&u).await.unwrap());

    let ua_store = Arc::new(UserAgentStore::new());
    let ua_flusher = Arc::new(UaFlushScheduler::new(
        ua_store.clone(),
        storage.get_db().clone(),
        Duration::from_millis(50),
    ));

    let auth_config = qrmenu::config::AuthConfig::default();
    let auth = Arc::new(DegradableAuth::new(
        Arc::new(SeaOrmAuthProvider::new(storage.clone())),
        Arc::new(MemoryAuthProvider::new()),
        &auth_config,
    ));

    TestContext {
        limiter: FixedWindowLimiter::new(Arc::new(MemoryStore::new(Duration::from_secs(3600)))),
        correlator: SessionCorrelator::new(24, false),
        metrics_service: Arc::new(MetricsService::new(storage.clone())),
        ua_store,
        ua_flusher,
        auth,
        storage,
        _td: td,
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .wrap(SecurityHeaders)
                .app_data(web::Data::from($ctx.storage.clone()))
                .app_data(web::Data::new($ctx.limiter.clone()))
                .app_data(web::Data::new($ctx.correlator.clone()))
                .app_data(web::Data::from($ctx.ua_store.clone()))
                .app_data(web::Data::from($ctx.ua_flusher.clone()))
                .app_data(web::Data::from($ctx.metrics_service.clone()))
                .app_data(web::Data::from($ctx.auth.clone()))
                .service(api_routes()),
        )
        .await
    };
}

const PEER: &str = "203.0.113.60:443";

fn post(uri: &str, body: serde_json::Value) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .peer_addr(PEER.parse().unwrap())
        .set_json(body)
}

fn register_body() -> serde_json::Value {
    json!({
        "email": "owner@example.com",
        "password": "Gecerli1Sifre",
        "restaurantName": "Kozbeyli Konağı",
        "slug": "kozbeyli-konagi"
    })
}

// =============================================================================
// Registration
// =============================================================================

#[actix_web::test]
async fn test_register_provisions_account_and_restaurant() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    let resp = test::call_service(&app, post("/api/auth/register", register_body()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], json!(0));
    assert_eq!(body["data"]["user"]["email"], json!("owner@example.com"));
    assert_eq!(body["data"]["restaurant"]["slug"], json!("kozbeyli-konagi"));
    assert!(!body["data"]["access_token"].as_str().unwrap().is_empty());

    let stored = ctx
        .storage
        .find_restaurant_by_slug("kozbeyli-konagi")
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[actix_web::test]
async fn test_register_validates_inputs() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    // Weak password: first unmet rule named in the message
    let mut weak = register_body();
    weak["password"] = json!("kisa");
    let resp = test::call_service(&app, post("/api/auth/register", weak).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Bad email
    let mut bad_email = register_body();
    bad_email["email"] = json!("not-an-email");
    let resp = test::call_service(&app, post("/api/auth/register", bad_email).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Missing slug
    let mut no_slug = register_body();
    no_slug.as_object_mut().unwrap().remove("slug");
    let resp = test::call_service(&app, post("/api/auth/register", no_slug).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_register_normalizes_slug() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    let mut body = register_body();
    body["slug"] = json!("Kozbeyli Konağı");
    let resp = test::call_service(&app, post("/api/auth/register", body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["restaurant"]["slug"], json!("kozbeyli-konagi"));
}

#[actix_web::test]
async fn test_register_rejects_duplicate_slug_and_email() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    let resp = test::call_service(&app, post("/api/auth/register", register_body()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Same email
    let resp = test::call_service(&app, post("/api/auth/register", register_body()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Different email, same slug
    let mut same_slug = register_body();
    same_slug["email"] = json!("other@example.com");
    let resp = test::call_service(&app, post("/api/auth/register", same_slug).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Login
// =============================================================================

#[actix_web::test]
async fn test_login_round_trip() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    test::call_service(&app, post("/api/auth/register", register_body()).to_request()).await;

    let resp = test::call_service(
        &app,
        post(
            "/api/auth/login",
            json!({"email": "owner@example.com", "password": "Gecerli1Sifre"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["email"], json!("owner@example.com"));
    assert_eq!(body["data"]["restaurant"]["slug"], json!("kozbeyli-konagi"));
    assert!(body["data"]["expires_in"].as_u64().unwrap() > 0);
}

#[actix_web::test]
async fn test_login_failures_are_vague_and_identical() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    test::call_service(&app, post("/api/auth/register", register_body()).to_request()).await;

    // Wrong password for an existing account
    let wrong_password = test::call_service(
        &app,
        post(
            "/api/auth/login",
            json!({"email": "owner@example.com", "password": "Yanlis1Sifre"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: serde_json::Value = test::read_body_json(wrong_password).await;

    // Unknown account entirely
    let unknown = test::call_service(
        &app,
        post(
            "/api/auth/login",
            json!({"email": "nobody@example.com", "password": "Yanlis1Sifre"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown: serde_json::Value = test::read_body_json(unknown).await;

    // Identical body: no account-enumeration signal
    assert_eq!(wrong_password["message"], unknown["message"]);
}

#[actix_web::test]
async fn test_login_requires_fields() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        post("/api/auth/login", json!({"email": "owner@example.com"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        post("/api/auth/login", json!({"password": "Gecerli1Sifre"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Dashboard metrics
// =============================================================================

#[actix_web::test]
async fn test_dashboard_requires_bearer_token() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/dashboard/metrics").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/dashboard/metrics")
            .insert_header(("Authorization", "Bearer not-a-real-token"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_dashboard_metrics_with_valid_token() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    let resp = test::call_service(&app, post("/api/auth/register", register_body()).to_request()).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/dashboard/metrics?start_date=2025-06-01&end_date=2025-06-30")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], json!(0));
    assert_eq!(body["data"]["total_events"], json!(0));
    assert_eq!(body["data"]["busy_hours"].as_array().unwrap().len(), 24);
    assert_eq!(body["data"]["busy_days"].as_array().unwrap().len(), 7);
}

#[actix_web::test]
async fn test_dashboard_rejects_malformed_date_range() {
    let ctx = create_context().await;
    let app = init_app!(ctx);

    let resp = test::call_service(&app, post("/api/auth/register", register_body()).to_request()).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/dashboard/metrics?start_date=bugun&end_date=yarin")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
