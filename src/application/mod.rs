//! Application layer services implementing business logic.
//!
//! Services consume repository traits and expose the operations the HTTP
//! handlers and the background click worker need.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation, management and resolution
//! - [`services::analytics_service::AnalyticsService`] - Per-link reports, dashboard and export
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
