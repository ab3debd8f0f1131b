mod common;

use serde_json::Value;
use sqlx::SqlitePool;

#[sqlx::test]
async fn test_health_endpoint_success(pool: SqlitePool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = common::test_server(state);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["click_queue"]["status"], "ok");
    assert_eq!(body["checks"]["cache"]["message"], "Caching disabled");
}

#[sqlx::test]
async fn test_health_reports_closed_queue(pool: SqlitePool) {
    let (state, rx) = common::create_test_state(pool);
    drop(rx);
    let server = common::test_server(state);

    let response = server.get("/health").await;

    response.assert_status_service_unavailable();
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["click_queue"]["status"], "error");
}

#[sqlx::test]
async fn test_banner_without_frontend(pool: SqlitePool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = common::test_server(state);

    for path in ["/", "/api"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["name"], "tinylink");
    }
}

#[sqlx::test]
async fn test_unknown_api_path_is_json_404(pool: SqlitePool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = common::test_server(state);

    let response = server.get("/api/does/not/exist").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["code"], "not_found");

    server.get("/qr/abc123").await.assert_status_not_found();
    server.get("/logo.png").await.assert_status_not_found();
}
