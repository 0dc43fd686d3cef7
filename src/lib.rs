//! Conditional HTTP caching for hyper services.
//!
//! The core is [`http::conditional::evaluate`]: given the request's
//! `If-Match`, `If-None-Match`, `If-Modified-Since` and `If-Unmodified-Since`
//! headers and the current representation's validators, it decides between
//! `304 Not Modified`, `412 Precondition Failed` and a normal response.
//! [`http::CacheHeaders`] wraps it in a per-request façade that also writes
//! `ETag`, `Last-Modified`, `Cache-Control`, `Expires` and `Pragma`.
//!
//! # Examples
//!
//! ```
//! use hyper::{Request, StatusCode};
//! use revalidate::http::{CacheHeaders, ResponseHead};
//!
//! let req = Request::get("/report")
//!     .header("if-none-match", "\"v42\"")
//!     .body(())
//!     .unwrap();
//! let mut head = ResponseHead::new();
//!
//! let mut cache = CacheHeaders::new(&req, &mut head);
//! cache.etag(Some("v42"), false, true).unwrap();
//! assert!(cache.validate(true));
//! assert_eq!(head.status(), StatusCode::NOT_MODIFIED);
//! ```

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
