mod common;

use axum::{Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use redirect_resolver::api::handlers::health_handler;
use redirect_resolver::domain::entities::RedirectKind;
use serde_json::Value;
use sqlx::PgPool;

fn make_server(state: redirect_resolver::AppState) -> TestServer {
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let ctx = common::create_test_context();
    let server = make_server(ctx.state.clone());

    let response = server.get("/api/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["hit_queue"]["status"], "ok");
    assert_eq!(json["checks"]["redirect_cache"]["status"], "ok");
    assert_eq!(json["checks"]["redirect_cache"]["message"], "Not loaded");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = common::create_test_context();
    let server = make_server(ctx.state.clone());

    let json = server.get("/api/health").await.json::<Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("checks").is_some());
    assert!(json["checks"].get("database").is_some());
    assert!(json["checks"].get("hit_queue").is_some());
    assert!(json["checks"].get("redirect_cache").is_some());
}

#[tokio::test]
async fn test_health_reports_loaded_rules() {
    let ctx = common::create_test_context();
    ctx.repository
        .insert("/a", "/b", RedirectKind::MovedPermanently, true);
    ctx.repository.insert("/c", "", RedirectKind::Gone, true);
    ctx.state.resolver.resolve("/a").await;
    let server = make_server(ctx.state.clone());

    let json = server.get("/api/health").await.json::<Value>();

    assert_eq!(
        json["checks"]["redirect_cache"]["message"],
        "2 rules, age 0s, fresh"
    );
}

#[tokio::test]
async fn test_health_degraded_when_database_down() {
    let ctx = common::create_test_context();
    ctx.repository.set_failing(true);
    let server = make_server(ctx.state.clone());

    let response = server.get("/api/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "error");
}

#[tokio::test]
async fn test_health_degraded_when_hit_queue_closed() {
    let common::TestContext { state, hits, .. } = common::create_test_context();
    drop(hits);
    let server = make_server(state);

    let response = server.get("/api/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>()["checks"]["hit_queue"]["status"],
        "error"
    );
}

#[sqlx::test]
async fn test_health_against_postgres(pool: PgPool) {
    let (state, _rx) = common::create_pg_state(pool);
    let server = make_server(state);

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["checks"]["database"]["message"],
        "Connected"
    );
}
