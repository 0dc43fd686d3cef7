//! Request/response capabilities handed to the cache headers façade
//!
//! Handlers decide on caching before the body exists, so responses are
//! drafted in a [`ResponseHead`] and turned into a `Response` at the end.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};

/// Read access to the incoming request
pub trait RequestAccessor {
    fn method(&self) -> &Method;
    fn headers(&self) -> &HeaderMap;
}

/// Write access to the outgoing response
pub trait ResponseAccessor {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
    fn remove_header(&mut self, name: &HeaderName);
    fn set_status(&mut self, status: StatusCode);
}

impl<B> RequestAccessor for Request<B> {
    fn method(&self) -> &Method {
        Self::method(self)
    }

    fn headers(&self) -> &HeaderMap {
        Self::headers(self)
    }
}

impl RequestAccessor for hyper::http::request::Parts {
    fn method(&self) -> &Method {
        &self.method
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl<B> ResponseAccessor for Response<B> {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }

    fn remove_header(&mut self, name: &HeaderName) {
        self.headers_mut().remove(name);
    }

    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }
}

/// Status and headers of a response under construction
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, for assertions and logging
    pub fn header_str(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Finish the response with the given body
    pub fn into_response(self, body: Bytes) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }

    /// Finish the response with no body (304, 412, HEAD)
    pub fn into_empty_response(self) -> Response<Full<Bytes>> {
        self.into_response(Bytes::new())
    }
}

impl ResponseAccessor for ResponseHead {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn remove_header(&mut self, name: &HeaderName) {
        self.headers.remove(name);
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }
}
