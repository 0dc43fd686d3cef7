// Configuration types module
// Defines all configuration-related data structures

use crate::http::CachePolicy;
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub static_files: StaticFilesConfig,
    pub cache: CacheConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub access_log: bool,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

/// Static file serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticFilesConfig {
    pub root: String,
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

/// Cache headers applied to served files
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// `max-age` in seconds; zero or less disables caching
    pub max_age: i64,
    pub private: bool,
    /// `s-maxage` in seconds for shared caches
    #[serde(default)]
    pub cdn_max_age: Option<i64>,
    /// Emit `W/"..."` tags
    pub weak_etags: bool,
    /// Allow weak comparison for `If-None-Match` on GET/HEAD
    pub weak_comparison: bool,
}

impl CacheConfig {
    pub const fn policy(&self) -> CachePolicy {
        if self.max_age <= 0 {
            return CachePolicy::NoCache;
        }
        CachePolicy::Cache {
            max_age: self.max_age,
            private: self.private,
            cdn_max_age: self.cdn_max_age,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: 3600,
            private: false,
            cdn_max_age: None,
            weak_etags: false,
            weak_comparison: true,
        }
    }
}
