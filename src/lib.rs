//! # tinylink
//!
//! A URL shortener with click analytics built with Axum and SQLite.
//!
//! ## Architecture
//!
//! The crate is split into layers:
//!
//! - **Domain Layer** ([`domain`]) - Entities, repository traits, click pipeline and aggregation
//! - **Application Layer** ([`application`]) - Link, analytics and auth services
//! - **Infrastructure Layer** ([`infrastructure`]) - SQLite repositories and the resolver cache
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//! - **Web Layer** ([`web`]) - Serving the single-page frontend build
//!
//! ## Features
//!
//! - Random or custom short codes with reserved-word protection
//! - Expiring and disableable links (410 Gone)
//! - Asynchronous click tracking through a bounded queue
//! - Per-link and dashboard analytics with CSV/JSON export
//! - Optional Redis cache for fast redirects
//! - Bearer token authentication and rate limiting
//!
//! ## Quick Start
//!
//! ```bash
//! export TOKEN_SIGNING_SECRET="change-me"
//! export DB_PATH="tinylink.db"              # Optional
//! export REDIS_URL="redis://localhost:6379" # Optional
//!
//! cargo run --bin admin -- user create --email me@example.com
//! cargo run --bin admin -- token create --email me@example.com
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;
pub mod web;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AnalyticsService, AuthService, LinkService};
    pub use crate::domain::entities::{AuthUser, ClickLog, Link, NewLink};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
