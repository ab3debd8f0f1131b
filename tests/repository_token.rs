mod common;

use sqlx::SqlitePool;
use std::sync::Arc;
use tinylink::domain::repositories::TokenRepository;
use tinylink::error::AppError;
use tinylink::infrastructure::persistence::SqliteTokenRepository;

#[sqlx::test]
async fn test_create_token(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let repo = SqliteTokenRepository::new(Arc::new(pool));

    let token = repo.create_token(user_id, "test-token", "hash123").await.unwrap();

    assert_eq!(token.name, "test-token");
    assert_eq!(token.token_hash, "hash123");
    assert_eq!(token.user_id, user_id);
    assert!(token.revoked_at.is_none());
    assert!(token.last_used_at.is_none());
}

#[sqlx::test]
async fn test_validate_token_resolves_owner(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let repo = SqliteTokenRepository::new(Arc::new(pool));
    repo.create_token(user_id, "valid-token", "validhash").await.unwrap();

    assert_eq!(repo.validate_token("validhash").await.unwrap(), Some(user_id));
    assert_eq!(repo.validate_token("nonexistent").await.unwrap(), None);
}

#[sqlx::test]
async fn test_validate_token_revoked(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let repo = SqliteTokenRepository::new(Arc::new(pool));
    let token = repo
        .create_token(user_id, "revoked-token", "revokedhash")
        .await
        .unwrap();

    repo.revoke_token(token.id).await.unwrap();

    assert_eq!(repo.validate_token("revokedhash").await.unwrap(), None);
    let stored = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(stored.revoked_at.is_some());
}

#[sqlx::test]
async fn test_revoke_missing_token(pool: SqlitePool) {
    let repo = SqliteTokenRepository::new(Arc::new(pool));

    let result = repo.revoke_token(42).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_update_last_used(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let repo = SqliteTokenRepository::new(Arc::new(pool));
    let token = repo.create_token(user_id, "used", "usedhash").await.unwrap();

    repo.update_last_used("usedhash").await.unwrap();

    let stored = repo.find_by_name("used").await.unwrap().unwrap();
    assert_eq!(stored.id, token.id);
    assert!(stored.last_used_at.is_some());
}

#[sqlx::test]
async fn test_list_tokens(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let repo = SqliteTokenRepository::new(Arc::new(pool));
    repo.create_token(user_id, "first", "hash-1").await.unwrap();
    repo.create_token(user_id, "second", "hash-2").await.unwrap();

    let tokens = repo.list_tokens().await.unwrap();

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].name, "second");
}

#[sqlx::test]
async fn test_duplicate_hash_conflicts(pool: SqlitePool) {
    let user_id = common::create_user(&pool, "owner@example.com").await;
    let repo = SqliteTokenRepository::new(Arc::new(pool));
    repo.create_token(user_id, "a", "samehash").await.unwrap();

    let result = repo.create_token(user_id, "b", "samehash").await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}
