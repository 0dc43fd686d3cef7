//! Logger module
//!
//! Structured logging through `tracing`:
//! - Subscriber initialisation from configuration
//! - Server lifecycle logging
//! - Access logging
//! - Error and warning logging

use crate::config::{Config, LoggingConfig};
use hyper::{Method, StatusCode, Uri};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once
/// at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Server started, listening on http://{addr}");
    tracing::info!(
        root = %config.static_files.root,
        max_age = config.cache.max_age,
        weak_etags = config.cache.weak_etags,
        "Serving static files"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Max connections: {max}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_connection_timeout(timeout: Duration) {
    tracing::warn!("Connection timeout after {} seconds", timeout.as_secs());
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// One access log line per request
pub fn log_access(method: &Method, uri: &Uri, status: StatusCode, elapsed: Duration) {
    tracing::info!(
        target: "access",
        %method,
        %uri,
        status = status.as_u16(),
        elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        "request"
    );
}
