// Configuration module entry point
// Layered configuration: optional file, environment, built-in defaults

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    CacheConfig, Config, LoggingConfig, PerformanceConfig, ServerConfig, StaticFilesConfig,
};

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from `config.toml` (or any supported extension)
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Environment variables use the `REVALIDATE` prefix and `__` as the
    /// section separator, e.g. `REVALIDATE_CACHE__MAX_AGE=60`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("static_files.root", "public")?
            .set_default("cache.max_age", 3600)?
            .set_default("cache.private", false)?
            .set_default("cache.weak_etags", false)?
            .set_default("cache.weak_comparison", true)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("REVALIDATE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely/not/a/config/file").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.static_files.root, "public");
        assert_eq!(cfg.cache.max_age, 3600);
        assert!(cfg.cache.weak_comparison);
        assert_eq!(cfg.performance.max_connections, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("app.toml")).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[cache]\nmax_age = 0\ncdn_max_age = 30\n"
        )
        .unwrap();

        let path = dir.path().join("app");
        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.cache.max_age, 0);
        assert_eq!(cfg.cache.cdn_max_age, Some(30));
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("definitely/not/a/config/file").unwrap();
        assert_eq!(cfg.socket_addr().unwrap().port(), 8080);
    }
}
