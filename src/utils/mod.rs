//! Utility functions for code generation, URL checks, and request context.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Redirect target validation and referrer hosts
//! - [`client_ip`] - Client address resolution (proxy-aware)
//! - [`ip_hash`] - Daily-rotating IP hashing
//! - [`user_agent`] - Device, browser and OS classification

pub mod client_ip;
pub mod code_generator;
pub mod ip_hash;
pub mod url_validator;
pub mod user_agent;
