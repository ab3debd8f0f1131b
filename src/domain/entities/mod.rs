//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL owned by a user
//! - [`ClickLog`] - One resolution event against a link
//! - [`User`] - Owner of links and API tokens
//!
//! Creation and partial-update inputs live next to their entity
//! (`NewLink`, `LinkPatch`, `NewClick`).

pub mod click;
pub mod link;
pub mod user;

pub use click::{ClickLog, DeviceType, NewClick, UNKNOWN};
pub use link::{
    Availability, Link, LinkPage, LinkPatch, LinkQuery, LinkSort, LinkTotals, NewLink,
    ResolvedLink,
};
pub use user::{AuthUser, User};
