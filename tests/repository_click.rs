mod common;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tinylink::domain::entities::{DeviceType, NewClick};
use tinylink::domain::repositories::ClickRepository;
use tinylink::error::AppError;
use tinylink::infrastructure::persistence::SqliteClickRepository;

fn click(link_id: i64, ip_hash: &str, minutes_ago: i64) -> NewClick {
    NewClick {
        link_id,
        ip_hash: ip_hash.to_string(),
        user_agent: "Mozilla/5.0".to_string(),
        device_type: DeviceType::Desktop,
        browser: "Chrome".to_string(),
        os: "Linux".to_string(),
        country: None,
        referrer: Some("https://example.org/".to_string()),
        clicked_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

#[sqlx::test]
async fn test_record_click(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let link = common::create_link(&pool, user_id, "rec001", "https://example.com").await;
    let repo = SqliteClickRepository::new(Arc::new(pool));

    let log = repo.record_click(click(link.id, "h1", 0)).await.unwrap();

    assert_eq!(log.link_id, link.id);
    assert_eq!(log.device_type, "desktop");
    assert_eq!(log.browser, "Chrome");
    assert!(log.country.is_none());
    assert_eq!(log.referrer.as_deref(), Some("https://example.org/"));
}

#[sqlx::test]
async fn test_record_click_for_missing_link(pool: SqlitePool) {
    let repo = SqliteClickRepository::new(Arc::new(pool));

    let result = repo.record_click(click(404, "h1", 0)).await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[sqlx::test]
async fn test_clicks_for_link_since_filters_window(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let link = common::create_link(&pool, user_id, "win001", "https://example.com").await;
    let repo = SqliteClickRepository::new(Arc::new(pool));

    repo.record_click(click(link.id, "old", 60 * 24 * 10)).await.unwrap();
    repo.record_click(click(link.id, "h2", 30)).await.unwrap();
    repo.record_click(click(link.id, "h1", 60)).await.unwrap();

    let clicks = repo
        .clicks_for_link_since(link.id, Utc::now() - Duration::days(7))
        .await
        .unwrap();

    assert_eq!(clicks.len(), 2);
    // Oldest first.
    assert_eq!(clicks[0].ip_hash, "h1");
    assert_eq!(clicks[1].ip_hash, "h2");
}

#[sqlx::test]
async fn test_user_scoped_counts(pool: SqlitePool) {
    let owner = common::create_user(&pool, "owner@example.com").await;
    let other = common::create_user(&pool, "other@example.com").await;
    let mine = common::create_link(&pool, owner, "cnt001", "https://example.com").await;
    let theirs = common::create_link(&pool, other, "cnt002", "https://example.com").await;
    let repo = SqliteClickRepository::new(Arc::new(pool));

    repo.record_click(click(mine.id, "a", 1)).await.unwrap();
    repo.record_click(click(mine.id, "b", 2)).await.unwrap();
    repo.record_click(click(theirs.id, "c", 1)).await.unwrap();

    let since = Utc::now() - Duration::days(1);
    assert_eq!(repo.count_for_user_since(owner, since).await.unwrap(), 2);

    let daily = repo.daily_counts_for_user_since(owner, since).await.unwrap();
    let total: i64 = daily.iter().map(|(_, n)| n).sum();
    assert_eq!(total, 2);
    assert!(daily.iter().all(|(day, _)| day.len() == 10));
}
