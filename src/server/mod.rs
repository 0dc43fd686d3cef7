// Server module entry point
// Listener creation, accept loop and per-connection serving

pub mod connection;
pub mod listener;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::create_reusable_listener;

/// Accept connections until Ctrl+C
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!(
                    active = state.active_connections(),
                    "Shutdown requested, no longer accepting connections"
                );
                return Ok(());
            }
        }
    }
}
