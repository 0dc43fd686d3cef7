//! HTTP response building module
//!
//! Builders for the plain status responses the server sends directly.

use super::accessor::ResponseHead;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a plain-text response with the given status
pub fn build_text_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from(text)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from(text)))
        })
}

/// Finish a drafted response carrying content
///
/// HEAD responses keep `Content-Length` but drop the body.
pub fn build_content_response(
    mut head: ResponseHead,
    data: Bytes,
    content_type: &'static str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    use super::accessor::ResponseAccessor;

    head.set_header(CONTENT_TYPE, HeaderValue::from_static(content_type));
    head.set_header(CONTENT_LENGTH, HeaderValue::from(data.len()));

    let body = if is_head { Bytes::new() } else { data };
    head.into_response(body)
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::ETAG;

    #[test]
    fn test_405_lists_allowed_methods() {
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers().get(ALLOW).unwrap(), ALLOWED_METHODS);
    }

    #[test]
    fn test_content_response_keeps_drafted_headers() {
        use crate::http::accessor::ResponseAccessor;

        let mut head = ResponseHead::new();
        head.set_header(ETAG, HeaderValue::from_static("\"v\""));

        let resp = build_content_response(head, Bytes::from("hello"), "text/plain", true);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(ETAG).unwrap(), "\"v\"");
        assert_eq!(resp.headers().get(CONTENT_LENGTH).unwrap(), "5");
    }
}
