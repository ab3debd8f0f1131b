mod common;

use axum::http::StatusCode;
use serde_json::Value;
use sqlx::SqlitePool;

const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[sqlx::test]
async fn test_link_analytics_without_clicks(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let token = common::create_token(&pool, user_id, "owner-token").await;
    let link = common::create_link(&pool, user_id, "quiet1", "https://example.com").await;

    let (state, _rx) = common::create_test_state(pool);
    let server = common::test_server(state);

    let response = server
        .get(&format!("/api/analytics/links/{}", link.id))
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["summary"]["total_clicks"], 0);
    assert_eq!(body["summary"]["unique_clicks"], 0);
    assert!(body["summary"]["peak_hour"].is_null());
    assert!(body["time_series"].as_array().unwrap().is_empty());
    assert!(body["devices"].as_array().unwrap().is_empty());
    assert!(body["referrers"].as_array().unwrap().is_empty());
}

#[sqlx::test]
async fn test_link_analytics_after_redirects(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let token = common::create_token(&pool, user_id, "owner-token").await;
    let link = common::create_link(&pool, user_id, "busy01", "https://example.com").await;

    let (state, mut rx) = common::create_test_state(pool.clone());
    let server = common::test_server(state);

    for agent in [SAFARI_IPHONE, SAFARI_IPHONE, CHROME_WINDOWS] {
        server
            .get("/busy01")
            .add_header("User-Agent", agent)
            .add_header("Referer", "https://www.google.com/search?q=x")
            .await
            .assert_status(StatusCode::FOUND);
    }
    common::drain_clicks(&pool, &mut rx).await;

    let response = server
        .get(&format!("/api/analytics/links/{}", link.id))
        .add_query_param("period", "day")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["summary"]["total_clicks"], 3);
    // Same peer address on the same day.
    assert_eq!(body["summary"]["unique_clicks"], 1);

    assert_eq!(body["devices"][0]["type"], "mobile");
    assert_eq!(body["devices"][0]["clicks"], 2);
    assert_eq!(body["devices"][0]["percentage"], 0.6667);
    assert_eq!(body["devices"][1]["type"], "desktop");
    assert_eq!(body["devices"][1]["percentage"], 0.3333);
    assert_eq!(body["referrers"][0]["source"], "www.google.com");
    assert_eq!(body["referrers"][0]["clicks"], 3);
    assert_eq!(body["referrers"][0]["percentage"], 1.0);
    assert_eq!(body["geographic"][0]["country"], "unknown");
    assert!(body["browsers"][0]["browser"].is_string());
    assert!(body["operating_systems"][0]["os"].is_string());
    assert!(body["devices"][0].get("category").is_none());
}

#[sqlx::test]
async fn test_link_analytics_foreign_link(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let token = common::create_token(&pool, user_id, "owner-token").await;
    let other = common::create_user(&pool, "other@example.com").await;
    let link = common::create_link(&pool, other, "theirs", "https://example.com").await;

    let (state, _rx) = common::create_test_state(pool);
    let server = common::test_server(state);

    server
        .get(&format!("/api/analytics/links/{}", link.id))
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();
}

#[sqlx::test]
async fn test_dashboard_totals(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let token = common::create_token(&pool, user_id, "owner-token").await;
    common::create_link(&pool, user_id, "dash01", "https://example.com/1").await;
    common::create_disabled_link(&pool, user_id, "dash02", "https://example.com/2").await;

    let (state, mut rx) = common::create_test_state(pool.clone());
    let server = common::test_server(state);

    server.get("/dash01").await.assert_status(StatusCode::FOUND);
    server.get("/dash01").await.assert_status(StatusCode::FOUND);
    common::drain_clicks(&pool, &mut rx).await;

    let response = server
        .get("/api/analytics/dashboard")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["period"], "week");
    assert_eq!(body["total_links"], 2);
    assert_eq!(body["active_links"], 1);
    assert_eq!(body["total_clicks"], 2);
    assert_eq!(body["today_clicks"], 2);
    assert_eq!(body["period_clicks"], 2);
    assert_eq!(body["recent_links"].as_array().unwrap().len(), 2);
    assert!(!body["click_trends"].as_array().unwrap().is_empty());
}

#[sqlx::test]
async fn test_export_csv(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let token = common::create_token(&pool, user_id, "owner-token").await;
    let link = common::create_link(&pool, user_id, "exp001", "https://example.com").await;

    let (state, mut rx) = common::create_test_state(pool.clone());
    let server = common::test_server(state);

    server
        .get("/exp001")
        .add_header("User-Agent", CHROME_WINDOWS)
        .await
        .assert_status(StatusCode::FOUND);
    common::drain_clicks(&pool, &mut rx).await;

    let response = server
        .get(&format!("/api/analytics/export/{}", link.id))
        .add_query_param("format", "csv")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "text/csv; charset=utf-8");
    assert_eq!(
        response.header("content-disposition"),
        format!("attachment; filename=\"analytics_{}_week.csv\"", link.id).as_str()
    );

    let text = response.text();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("clicked_at,ip_hash,country,device_type,browser,os,referrer")
    );
    let row = lines.next().unwrap();
    assert!(row.contains(",unknown,desktop,Chrome,"));
    assert!(lines.next().is_none());
}

#[sqlx::test]
async fn test_export_json(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let token = common::create_token(&pool, user_id, "owner-token").await;
    let link = common::create_link(&pool, user_id, "exp002", "https://example.com").await;

    let (state, _rx) = common::create_test_state(pool);
    let server = common::test_server(state);

    let response = server
        .get(&format!("/api/analytics/export/{}", link.id))
        .add_query_param("format", "json")
        .add_query_param("period", "month")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/json");
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());
}

#[sqlx::test]
async fn test_export_unknown_format(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let token = common::create_token(&pool, user_id, "owner-token").await;
    let link = common::create_link(&pool, user_id, "exp003", "https://example.com").await;

    let (state, _rx) = common::create_test_state(pool);
    let server = common::test_server(state);

    server
        .get(&format!("/api/analytics/export/{}", link.id))
        .add_query_param("format", "xml")
        .authorization_bearer(&token)
        .await
        .assert_status_bad_request();
}
