//! SQLite repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`SqliteLinkRepository`] - Link storage, listing and counters
//! - [`SqliteClickRepository`] - Click log appends and analytics reads
//! - [`SqliteTokenRepository`] - API token storage and validation
//! - [`SqliteUserRepository`] - Link owners
//!
//! Timestamps are always bound from Rust as UTC, so their stored text form is
//! uniform and compares correctly in SQL.

pub mod sqlite_click_repository;
pub mod sqlite_link_repository;
pub mod sqlite_token_repository;
pub mod sqlite_user_repository;

pub use sqlite_click_repository::SqliteClickRepository;
pub use sqlite_link_repository::SqliteLinkRepository;
pub use sqlite_token_repository::SqliteTokenRepository;
pub use sqlite_user_repository::SqliteUserRepository;
