mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use redirect_resolver::api::handlers::redirect_check_handler;
use redirect_resolver::domain::entities::RedirectKind;
use redirect_resolver::domain::hit_worker::run_hit_worker;
use redirect_resolver::domain::repositories::RedirectRepository;
use redirect_resolver::infrastructure::persistence::PgRedirectRepository;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

fn make_server(state: redirect_resolver::AppState) -> TestServer {
    let app = Router::new()
        .route("/api/redirect-check", get(redirect_check_handler))
        .with_state(state);
    TestServer::new(app).unwrap()
}

async fn check(server: &TestServer, path: &str) -> Value {
    let response = server
        .get("/api/redirect-check")
        .add_query_param("path", path)
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

// ─── MATCHES ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_returns_matching_rule() {
    let ctx = common::create_test_context();
    let id = ctx
        .repository
        .insert("/old", "/new", RedirectKind::MovedPermanently, true);
    let server = make_server(ctx.state.clone());

    let json = check(&server, "/old").await;

    let redirect = &json["redirect"];
    assert_eq!(redirect["id"], id);
    assert_eq!(redirect["source"], "/old");
    assert_eq!(redirect["destination"], "/new");
    assert_eq!(redirect["type"], 301);
    assert_eq!(redirect["isActive"], true);
    assert!(redirect.get("hits").is_some());
    assert!(redirect.get("createdAt").is_some());
    assert!(redirect.get("updatedAt").is_some());
}

#[tokio::test]
async fn test_check_returns_terminal_rules() {
    let ctx = common::create_test_context();
    ctx.repository.insert("/gone", "", RedirectKind::Gone, true);
    let server = make_server(ctx.state.clone());

    let json = check(&server, "/gone").await;

    assert_eq!(json["redirect"]["type"], 410);
    assert_eq!(json["redirect"]["destination"], "");
}

#[tokio::test]
async fn test_check_tries_trailing_slash_variant() {
    let ctx = common::create_test_context();
    ctx.repository
        .insert("/old", "/new", RedirectKind::MovedPermanently, true);
    let server = make_server(ctx.state.clone());

    let json = check(&server, "/old/").await;

    assert_eq!(json["redirect"]["source"], "/old");
}

#[tokio::test]
async fn test_check_normalizes_leading_slashes() {
    let ctx = common::create_test_context();
    ctx.repository
        .insert("/old", "/new", RedirectKind::MovedPermanently, true);
    let server = make_server(ctx.state.clone());

    assert_eq!(check(&server, "old").await["redirect"]["source"], "/old");
    assert_eq!(check(&server, "//old").await["redirect"]["source"], "/old");
}

#[tokio::test]
async fn test_check_ignores_query_and_fragment() {
    let ctx = common::create_test_context();
    ctx.repository
        .insert("/old", "/new", RedirectKind::MovedPermanently, true);
    let server = make_server(ctx.state.clone());

    assert_eq!(check(&server, "/old?ref=1").await["redirect"]["source"], "/old");
    assert_eq!(check(&server, "/old#top").await["redirect"]["source"], "/old");
}

// ─── NO MATCH ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_unmatched_is_null() {
    let ctx = common::create_test_context();
    let server = make_server(ctx.state.clone());

    let json = check(&server, "/nothing").await;

    assert!(json["redirect"].is_null());
    assert!(json.get("redirect").is_some());
}

#[tokio::test]
async fn test_check_missing_path_is_null() {
    let ctx = common::create_test_context();
    let server = make_server(ctx.state.clone());

    let response = server.get("/api/redirect-check").await;

    response.assert_status_ok();
    assert!(response.json::<Value>()["redirect"].is_null());
}

#[tokio::test]
async fn test_check_blank_path_is_null() {
    let ctx = common::create_test_context();
    ctx.repository.insert("/", "/home", RedirectKind::Found, true);
    let server = make_server(ctx.state.clone());

    assert!(check(&server, "   ").await["redirect"].is_null());
    assert!(check(&server, "?q=1").await["redirect"].is_null());
}

#[tokio::test]
async fn test_check_inactive_rule_is_null() {
    let ctx = common::create_test_context();
    ctx.repository
        .insert("/old", "/new", RedirectKind::MovedPermanently, false);
    let server = make_server(ctx.state.clone());

    assert!(check(&server, "/old").await["redirect"].is_null());
}

#[tokio::test]
async fn test_check_hides_self_loop() {
    let ctx = common::create_test_context();
    ctx.repository
        .insert("/loop/", "/loop", RedirectKind::Found, true);
    let server = make_server(ctx.state.clone());

    assert!(check(&server, "/loop").await["redirect"].is_null());
}

#[tokio::test]
async fn test_check_fails_open() {
    let ctx = common::create_test_context();
    ctx.repository
        .insert("/old", "/new", RedirectKind::MovedPermanently, true);
    ctx.repository.set_failing(true);
    let server = make_server(ctx.state.clone());

    assert!(check(&server, "/old").await["redirect"].is_null());
}

// ─── HITS ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_records_hit_only_on_match() {
    let mut ctx = common::create_test_context();
    let id = ctx
        .repository
        .insert("/old", "/new", RedirectKind::MovedPermanently, true);
    let server = make_server(ctx.state.clone());

    check(&server, "/old").await;
    check(&server, "/missing").await;

    let events = ctx.drain_hits();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].redirect_id, id);
    assert_eq!(events[0].source, "/old");
}

#[sqlx::test]
async fn test_check_against_postgres_counts_hits(pool: PgPool) {
    let id = common::create_test_redirect(&pool, "/old-page", "/new-page", 308).await;

    let (state, rx) = common::create_pg_state(pool.clone());
    let repository: Arc<dyn RedirectRepository> =
        Arc::new(PgRedirectRepository::new(Arc::new(pool.clone())));
    tokio::spawn(run_hit_worker(rx, repository, 2));

    let server = make_server(state);

    let json = check(&server, "/old-page").await;
    assert_eq!(json["redirect"]["id"], id);
    assert_eq!(json["redirect"]["type"], 308);

    for _ in 0..50 {
        if common::get_hits(&pool, id).await == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(common::get_hits(&pool, id).await, 1);
}
