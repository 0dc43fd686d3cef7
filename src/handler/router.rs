//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to
//! the static file handler, and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let response = match parts.method {
        Method::GET | Method::HEAD => static_files::serve(&parts, &state.config).await,
        Method::OPTIONS => http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", parts.method));
            http::build_405_response()
        }
    };

    if state.config.logging.access_log {
        logger::log_access(&parts.method, &parts.uri, response.status(), started.elapsed());
    }

    Ok(response)
}
