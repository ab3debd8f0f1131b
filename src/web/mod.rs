//! Static frontend layer.
//!
//! The single-page frontend is deployed as a build directory next to the
//! binary. This layer serves its assets and the `index.html` shell, and
//! decides which paths belong to the frontend rather than the redirector.
//!
//! # Modules
//!
//! - [`frontend`] - Route table and static directory settings
//! - [`handlers`] - Shell, asset and catch-all handlers

pub mod frontend;
pub mod handlers;

pub use frontend::FrontendConfig;
