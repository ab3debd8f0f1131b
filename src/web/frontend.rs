//! Frontend route table and static directory settings.

use std::path::{Path, PathBuf};

use crate::config::Config;

/// Where the frontend build lives and which paths it owns.
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    static_dir: PathBuf,
    routes: Vec<String>,
    prefixes: Vec<String>,
    has_shell: bool,
}

impl FrontendConfig {
    /// Builds the route table. Whether `index.html` exists is checked once here.
    pub fn new(static_dir: impl Into<PathBuf>, routes: Vec<String>, prefixes: Vec<String>) -> Self {
        let static_dir = static_dir.into();
        let has_shell = static_dir.join("index.html").is_file();

        Self {
            static_dir,
            routes,
            prefixes,
            has_shell,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.static_dir,
            config.frontend_routes.clone(),
            config.frontend_prefixes.clone(),
        )
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }

    /// True when a frontend build with an `index.html` shell is deployed.
    pub fn has_shell(&self) -> bool {
        self.has_shell
    }

    /// Exact route or prefix match against the frontend's paths.
    pub fn is_frontend_route(&self, path: &str) -> bool {
        self.routes.iter().any(|r| r == path)
            || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// First path segments owned by the frontend. Custom short codes may not
    /// use them.
    pub fn reserved_segments(&self) -> Vec<String> {
        let mut segments: Vec<String> = self
            .routes
            .iter()
            .chain(self.prefixes.iter())
            .filter_map(|p| p.trim_matches('/').split('/').next())
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        segments.sort();
        segments.dedup();
        segments
    }
}
