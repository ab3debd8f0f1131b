//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces, and the click accounting pipeline,
//! independent of HTTP and storage concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_queue`] - Bounded, non-blocking producer side of the click queue
//! - [`click_worker`] - Asynchronous click processing worker
//! - [`analytics`] - Pure aggregation of click logs into reports
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler resolves a live link and answers with a redirect
//! 2. A [`click_event::ClickEvent`] is offered to the [`click_queue::ClickQueue`]
//! 3. [`click_worker::run_click_worker`] hashes the IP, classifies the User-Agent
//!    and persists the log with retry logic
//! 4. The link's counter is incremented via [`repositories::LinkRepository`]

pub mod analytics;
pub mod click_event;
pub mod click_queue;
pub mod click_worker;
pub mod entities;
pub mod repositories;
