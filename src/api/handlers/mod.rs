//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod analytics;
pub mod banner;
pub mod health;
pub mod links;
pub mod redirect;

pub use analytics::{dashboard_handler, export_handler, link_analytics_handler};
pub use banner::banner_handler;
pub use health::health_handler;
pub use links::{
    batch_create_handler, create_link_handler, delete_link_handler, get_link_handler,
    link_info_handler, list_links_handler, toggle_status_handler, update_link_handler,
};
pub use redirect::{record_click_handler, redirect_handler, redirect_info_handler};
