//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Database
//!
//! ```bash
//! export DATABASE_URL="sqlite://tinylink.db?mode=rwc"
//! # or just the file path; the URL is built for you
//! export DB_PATH="/var/lib/tinylink/links.db"
//! ```
//!
//! ## Required Variables
//!
//! - `TOKEN_SIGNING_SECRET` - HMAC key used to hash API tokens
//!
//! ## Optional Variables
//!
//! - `BASE_URL` - Public origin used to build short URLs (default: `http://localhost:8000`)
//! - `LISTEN` - Bind address (default: `0.0.0.0:8000`)
//! - `APP_ENV` - `development` or `production` (default: `development`)
//! - `REDIS_URL` / `REDIS_HOST` - Redis connection (enables caching if set)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `CLICK_QUEUE_CAPACITY` - Click event buffer size (default: 10000, min: 100)
//! - `CLICK_WORKER_CONCURRENCY` - Click events processed in parallel (default: 4)
//! - `STATIC_DIR` - Frontend build output served with SPA fallback (default: `public`)
//! - `FRONTEND_ROUTES` / `FRONTEND_PREFIXES` - Comma-separated SPA paths
//! - `CORS_ORIGINS` - Comma-separated allowed origins (default: `http://localhost:3000`)

use anyhow::{Context, Result};
use std::env;

/// Exact paths handled by the single-page frontend rather than the redirector.
pub const DEFAULT_FRONTEND_ROUTES: &[&str] = &[
    "/",
    "/login",
    "/register",
    "/dashboard",
    "/generator",
    "/profile",
    "/links",
];

/// Path prefixes handled by the single-page frontend.
pub const DEFAULT_FRONTEND_PREFIXES: &[&str] = &["/dashboard/", "/links/", "/assets/"];

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub listen_addr: String,
    /// Public origin prepended to short codes, without trailing slash.
    pub base_url: String,
    /// `development` or `production`. Production redacts internal error messages.
    pub app_env: String,
    pub log_level: String,
    pub log_format: String,
    pub click_queue_capacity: usize,
    /// When true, client IPs are read from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
    /// Default TTL (seconds) for cached link lookups in Redis.
    /// Has no effect when Redis is not configured.
    pub cache_ttl_seconds: u64,
    /// Maximum number of click events processed concurrently by the background worker.
    pub click_worker_concurrency: usize,
    /// HMAC signing secret used to hash API tokens before storage.
    pub token_signing_secret: String,
    pub static_dir: String,
    pub frontend_routes: Vec<String>,
    pub frontend_prefixes: Vec<String>,
    pub cors_origins: Vec<String>,

    // ── Pool settings ───────────────────────────────────────────────────────
    /// Maximum number of connections in the pool (`DB_MAX_CONNECTIONS`, default: 10).
    pub db_max_connections: u32,
    /// Timeout for acquiring a connection from the pool in seconds
    /// (`DB_CONNECT_TIMEOUT`, default: 30).
    pub db_connect_timeout: u64,
    /// Idle connection lifetime in seconds (`DB_IDLE_TIMEOUT`, default: 600).
    pub db_idle_timeout: u64,
    /// Maximum connection lifetime in seconds (`DB_MAX_LIFETIME`, default: 1800).
    pub db_max_lifetime: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(v) => v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `TOKEN_SIGNING_SECRET` is missing.
    pub fn from_env() -> Result<Self> {
        let database_url = Self::load_database_url();
        let redis_url = Self::load_redis_url();

        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let token_signing_secret =
            env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

        Ok(Self {
            database_url,
            redis_url,
            listen_addr,
            base_url,
            app_env,
            log_level,
            log_format,
            click_queue_capacity: env_parse("CLICK_QUEUE_CAPACITY", 10_000),
            behind_proxy,
            cache_ttl_seconds: env_parse("CACHE_TTL_SECONDS", 3600),
            click_worker_concurrency: env_parse("CLICK_WORKER_CONCURRENCY", 4),
            token_signing_secret,
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
            frontend_routes: env_list("FRONTEND_ROUTES", DEFAULT_FRONTEND_ROUTES),
            frontend_prefixes: env_list("FRONTEND_PREFIXES", DEFAULT_FRONTEND_PREFIXES),
            cors_origins: env_list("CORS_ORIGINS", &["http://localhost:3000"]),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            db_connect_timeout: env_parse("DB_CONNECT_TIMEOUT", 30),
            db_idle_timeout: env_parse("DB_IDLE_TIMEOUT", 600),
            db_max_lifetime: env_parse("DB_MAX_LIFETIME", 1800),
        })
    }

    /// Loads the database URL.
    ///
    /// Priority:
    /// 1. `DATABASE_URL` environment variable
    /// 2. Built from `DB_PATH` (default `tinylink.db`), created if missing
    fn load_database_url() -> String {
        if let Ok(url) = env::var("DATABASE_URL") {
            return url;
        }

        let path = env::var("DB_PATH").unwrap_or_else(|_| "tinylink.db".to_string());
        format!("sqlite://{}?mode=rwc", path)
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let password = env::var("REDIS_PASSWORD").ok();
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.click_queue_capacity < 100 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY must be at least 100, got {}",
                self.click_queue_capacity
            );
        }

        if self.click_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.click_queue_capacity
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if self.app_env != "development" && self.app_env != "production" {
            anyhow::bail!(
                "APP_ENV must be 'development' or 'production', got '{}'",
                self.app_env
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!(
                "DATABASE_URL must start with 'sqlite:', got '{}'",
                self.database_url
            );
        }

        url::Url::parse(&self.base_url)
            .with_context(|| format!("BASE_URL is not a valid URL: '{}'", self.base_url))?;

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                redis_url
            );
        }

        if self.cache_ttl_seconds == 0 {
            anyhow::bail!("CACHE_TTL_SECONDS must be greater than 0");
        }

        if self.click_worker_concurrency == 0 || self.click_worker_concurrency > 256 {
            anyhow::bail!(
                "CLICK_WORKER_CONCURRENCY must be between 1 and 256, got {}",
                self.click_worker_concurrency
            );
        }

        // Credentialed CORS cannot be combined with a wildcard origin.
        if self.cors_origins.iter().any(|o| o == "*") {
            anyhow::bail!(
                "CORS_ORIGINS must list explicit origins, '*' is not allowed with credentials"
            );
        }

        if self.token_signing_secret.is_empty() {
            anyhow::bail!("TOKEN_SIGNING_SECRET must not be empty");
        }

        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.db_connect_timeout == 0 {
            anyhow::bail!("DB_CONNECT_TIMEOUT must be greater than 0");
        }

        Ok(())
    }

    /// Returns whether the service runs in production mode.
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Environment: {}", self.app_env);
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Database: {}", mask_connection_string(&self.database_url));

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Redis: {} (enabled)", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Redis: disabled");
        }

        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Click queue capacity: {}", self.click_queue_capacity);
        tracing::info!("  Static dir: {}", self.static_dir);
    }
}

/// Masks sensitive information in connection strings for logging.
///
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
pub fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn valid_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            redis_url: None,
            listen_addr: "0.0.0.0:8000".to_string(),
            base_url: "http://localhost:8000".to_string(),
            app_env: "development".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            click_queue_capacity: 10_000,
            behind_proxy: false,
            cache_ttl_seconds: 3600,
            click_worker_concurrency: 4,
            token_signing_secret: "test-secret".to_string(),
            static_dir: "public".to_string(),
            frontend_routes: vec!["/".to_string()],
            frontend_prefixes: vec![],
            cors_origins: vec![],
            db_max_connections: 10,
            db_connect_timeout: 30,
            db_idle_timeout: 600,
            db_max_lifetime: 1800,
        }
    }

    #[test]
    fn test_mask_connection_string() {
        assert_eq!(
            mask_connection_string("redis://:password@localhost:6379/0"),
            "redis://:***@localhost:6379/0"
        );

        assert_eq!(
            mask_connection_string("sqlite://tinylink.db?mode=rwc"),
            "sqlite://tinylink.db?mode=rwc"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.click_queue_capacity = 50;
        assert!(config.validate().is_err());
        config.click_queue_capacity = 10_000;

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());
        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.listen_addr = "8000".to_string();
        assert!(config.validate().is_err());
        config.listen_addr = "0.0.0.0:8000".to_string();

        config.database_url = "postgres://localhost/test".to_string();
        assert!(config.validate().is_err());
        config.database_url = "sqlite::memory:".to_string();

        config.app_env = "staging".to_string();
        assert!(config.validate().is_err());
        config.app_env = "production".to_string();
        assert!(config.validate().is_ok());
        assert!(config.is_production());

        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_worker_concurrency_bounds() {
        let mut config = valid_config();

        config.click_worker_concurrency = 0;
        assert!(config.validate().is_err());

        config.click_worker_concurrency = 257;
        assert!(config.validate().is_err());

        config.click_worker_concurrency = 256;
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_database_url_from_path() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::remove_var("DATABASE_URL");
            env::set_var("DB_PATH", "/tmp/links.db");
        }

        let url = Config::load_database_url();
        assert_eq!(url, "sqlite:///tmp/links.db?mode=rwc");

        unsafe {
            env::remove_var("DB_PATH");
        }
    }

    #[test]
    #[serial]
    fn test_database_url_priority() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("DATABASE_URL", "sqlite://from-url.db");
            env::set_var("DB_PATH", "from-path.db");
        }

        let url = Config::load_database_url();
        assert_eq!(url, "sqlite://from-url.db");

        unsafe {
            env::remove_var("DATABASE_URL");
            env::remove_var("DB_PATH");
        }
    }

    #[test]
    #[serial]
    fn test_load_redis_url_from_components() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::remove_var("REDIS_URL");
            env::set_var("REDIS_HOST", "redis-host");
            env::set_var("REDIS_PORT", "6380");
            env::set_var("REDIS_DB", "1");
        }

        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://redis-host:6380/1");

        unsafe {
            env::set_var("REDIS_PASSWORD", "secret");
        }
        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://:secret@redis-host:6380/1");

        unsafe {
            env::set_var("REDIS_PASSWORD", "");
        }
        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://redis-host:6380/1");

        unsafe {
            env::remove_var("REDIS_HOST");
            env::remove_var("REDIS_PORT");
            env::remove_var("REDIS_DB");
            env::remove_var("REDIS_PASSWORD");
        }
    }

    #[test]
    #[serial]
    fn test_frontend_routes_from_env() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("FRONTEND_ROUTES", "/, /app , ,/settings");
        }

        let routes = env_list("FRONTEND_ROUTES", DEFAULT_FRONTEND_ROUTES);
        assert_eq!(routes, vec!["/", "/app", "/settings"]);

        unsafe {
            env::remove_var("FRONTEND_ROUTES");
        }

        let routes = env_list("FRONTEND_ROUTES", DEFAULT_FRONTEND_ROUTES);
        assert_eq!(routes.len(), DEFAULT_FRONTEND_ROUTES.len());
    }

    #[test]
    #[serial]
    fn test_wildcard_cors_origin_is_rejected() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("TOKEN_SIGNING_SECRET", "secret");
            env::set_var("CORS_ORIGINS", "https://app.example.com, *");
        }

        let config = Config::from_env().unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("CORS_ORIGINS"));

        unsafe {
            env::set_var("CORS_ORIGINS", "https://app.example.com");
        }
        assert!(Config::from_env().unwrap().validate().is_ok());

        unsafe {
            env::remove_var("CORS_ORIGINS");
            env::remove_var("TOKEN_SIGNING_SECRET");
        }
    }
}
