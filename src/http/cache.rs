//! HTTP cache control module
//!
//! Per-request façade over the response cache headers (`ETag`,
//! `Last-Modified`, `Cache-Control`, `Expires`, `Pragma`) and the
//! conditional request validation.

use super::accessor::{RequestAccessor, ResponseAccessor};
use super::conditional::{evaluate, ConditionalHeaders, Decision, ValidationState};
use super::date::format_http_date;
use super::etag::{EntityTag, EntityTagError};
use chrono::{DateTime, Duration, Utc};
use hyper::header::{
    HeaderName, HeaderValue, CACHE_CONTROL, ETAG, EXPIRES, LAST_MODIFIED, PRAGMA,
};
use hyper::Method;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// `Expires` value used to defeat caches
const EXPIRES_IN_THE_PAST: &str = "Tue, 03 Jul 2001 06:00:00 GMT";
const NO_CACHE_CONTROL: &str = "no-cache, no-store, max-age=0, must-revalidate, proxy-revalidate";

/// Generate an opaque `ETag` value from content using fast hashing
///
/// # Returns
/// Unquoted hex string, e.g., `abc123def`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("{v:x}")
}

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Cacheable for `max_age` seconds, optionally with a shared-cache override
    Cache {
        max_age: i64,
        private: bool,
        cdn_max_age: Option<i64>,
    },
    /// Never cache
    NoCache,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn cache_control_value(self) -> String {
        match self {
            Self::Cache { max_age, .. } if max_age <= 0 => NO_CACHE_CONTROL.to_string(),
            Self::Cache {
                max_age,
                private,
                cdn_max_age,
            } => {
                let scope = if private { "private" } else { "public" };
                let mut value = format!("{scope}, max-age={max_age}");
                if let Some(cdn) = cdn_max_age {
                    value.push_str(&format!(", s-maxage={}", cdn.max(0)));
                }
                value
            }
            Self::NoCache => NO_CACHE_CONTROL.to_string(),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Cache {
            max_age: 3600, // 1 hour
            private: false,
            cdn_max_age: None,
        }
    }
}

/// Cache headers of one request/response exchange
///
/// Must not outlive the request it was built for.
pub struct CacheHeaders<'r, R: ResponseAccessor> {
    method: Method,
    conditions: ConditionalHeaders,
    state: ValidationState,
    response: &'r mut R,
    clock: fn() -> DateTime<Utc>,
}

impl<'r, R: ResponseAccessor> CacheHeaders<'r, R> {
    pub fn new(request: &impl RequestAccessor, response: &'r mut R) -> Self {
        Self {
            method: request.method().clone(),
            conditions: ConditionalHeaders::from_headers(request.headers()),
            state: ValidationState::new(),
            response,
            clock: Utc::now,
        }
    }

    /// Replace the clock used to compute `Expires`
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub const fn state(&self) -> &ValidationState {
        &self.state
    }

    pub const fn conditions(&self) -> &ConditionalHeaders {
        &self.conditions
    }

    /// Set the current `ETag`, or clear it with `None`
    ///
    /// `weak_comparison` lets `If-None-Match` match weak tags; it is forced
    /// off with a warning unless the request is GET or HEAD.
    pub fn etag(
        &mut self,
        tag: Option<&str>,
        is_weak: bool,
        weak_comparison: bool,
    ) -> Result<&mut Self, EntityTagError> {
        let etag = tag.map(|t| EntityTag::new(t, is_weak)).transpose()?;

        match &etag {
            Some(e) => self.set_header(ETAG, &e.header_value()),
            None => self.response.remove_header(&ETAG),
        }

        if let Some(downgrade) = self.state.set_etag(etag, weak_comparison, &self.method) {
            tracing::warn!(method = %downgrade.method, "{downgrade}");
        }

        Ok(self)
    }

    /// Set the last modification instant, or clear it with `None`
    pub fn last_modified(&mut self, date: Option<DateTime<Utc>>) -> &mut Self {
        self.state.set_last_modified(date);

        match self.state.last_modified() {
            Some(d) => self.set_header(LAST_MODIFIED, &format_http_date(d)),
            None => self.response.remove_header(&LAST_MODIFIED),
        }

        self
    }

    /// Make the response cacheable for `seconds`; `seconds <= 0` means no cache
    pub fn cache(&mut self, seconds: i64, private: bool, cdn_seconds: Option<i64>) -> &mut Self {
        self.apply_policy(CachePolicy::Cache {
            max_age: seconds,
            private,
            cdn_max_age: cdn_seconds,
        })
    }

    /// Prevent any caching and drop the validators
    pub fn no_cache(&mut self) -> &mut Self {
        self.response.remove_header(&ETAG);
        self.response.remove_header(&LAST_MODIFIED);

        self.response
            .set_header(PRAGMA, HeaderValue::from_static("no-cache"));
        self.response
            .set_header(EXPIRES, HeaderValue::from_static(EXPIRES_IN_THE_PAST));
        self.response
            .set_header(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE_CONTROL));
        self
    }

    pub fn apply_policy(&mut self, policy: CachePolicy) -> &mut Self {
        let max_age = match policy {
            CachePolicy::Cache { max_age, .. } if max_age > 0 => max_age,
            _ => return self.no_cache(),
        };

        self.response.remove_header(&PRAGMA);
        self.set_header(CACHE_CONTROL, &policy.cache_control_value());

        match Duration::try_seconds(max_age).and_then(|d| (self.clock)().checked_add_signed(d)) {
            Some(expires) => self.set_header(EXPIRES, &format_http_date(expires)),
            None => self.response.remove_header(&EXPIRES),
        }
        self
    }

    /// Run the precondition checks
    ///
    /// Returns true when the status has been set (304 or 412) and the caller
    /// should stop and send an empty response.
    pub fn validate(&mut self, resource_exists: bool) -> bool {
        self.decide(resource_exists).is_final()
    }

    /// Same as [`validate`](Self::validate) but returns the decision
    pub fn decide(&mut self, resource_exists: bool) -> Decision {
        let decision = evaluate(&self.state, &self.conditions, resource_exists);
        if let Some(status) = decision.status() {
            tracing::debug!(status = status.as_u16(), "Conditional request short-circuited");
            self.response.set_status(status);
        }
        decision
    }

    fn set_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(v) => self.response.set_header(name, v),
            Err(e) => {
                crate::logger::log_error(&format!("Invalid {name} header value {value:?}: {e}"));
            }
        }
    }
}
