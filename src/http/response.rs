//! HTTP response module
//!
//! Mutable response handed to handlers, with the `text`/`html`/`json` convenience
//! setters and the default error bodies used by the dispatcher.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::StatusCode;
use serde::Serialize;

use super::{METHOD_NOT_ALLOWED_BODY, NOT_FOUND_BODY};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// Response under construction
///
/// Starts as an empty `200 OK`. The body setters do not exclude each other: whichever
/// is called last decides the body and the `Content-Type`.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Set a plain-text body
    pub fn text(&mut self, body: impl Into<String>) {
        self.set_body(body.into(), HeaderValue::from_static(TEXT_PLAIN));
    }

    /// Set a pre-rendered HTML body
    pub fn html(&mut self, body: impl Into<String>) {
        self.set_body(body.into(), HeaderValue::from_static(TEXT_HTML));
    }

    /// Serialize `value` as the JSON body
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.set_body(body, HeaderValue::from_static(APPLICATION_JSON));
        Ok(())
    }

    /// Set raw body bytes with an explicit content type
    pub fn set_body(&mut self, body: impl Into<Bytes>, content_type: HeaderValue) {
        self.body = body.into();
        self.headers.insert(header::CONTENT_TYPE, content_type);
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, lossy
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn this response into the default `404 Not Found.`
    pub fn not_found(&mut self) {
        self.status = StatusCode::NOT_FOUND;
        self.text(NOT_FOUND_BODY);
    }

    /// Turn this response into the default `405 Method Not Allowed`
    ///
    /// `allow` lists the permitted verbs; an empty slice leaves out the `Allow` header.
    pub fn method_not_allowed(&mut self, allow: &[String]) {
        self.status = StatusCode::METHOD_NOT_ALLOWED;
        self.text(METHOD_NOT_ALLOWED_BODY);
        if allow.is_empty() {
            return;
        }
        let value = allow
            .iter()
            .map(|m| m.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&value) {
            self.headers.insert(header::ALLOW, value);
        }
    }

    /// Build `304 Not Modified` for a cached static file
    pub fn not_modified(etag: &str) -> Self {
        let mut resp = Self::new();
        resp.status = StatusCode::NOT_MODIFIED;
        if let Ok(value) = HeaderValue::from_str(etag) {
            resp.headers.insert(header::ETAG, value);
        }
        resp
    }

    /// Build the response the transport sends for an unhandled handler error
    pub fn internal_error() -> Self {
        let mut resp = Self::new();
        resp.status = StatusCode::INTERNAL_SERVER_ERROR;
        resp.text("Internal Server Error");
        resp
    }

    /// Convert into a hyper response, filling in `Content-Length`
    pub fn into_hyper(self, is_head: bool) -> hyper::Response<Full<Bytes>> {
        let content_length = self.body.len();
        let body = if is_head { Bytes::new() } else { self.body };

        let mut resp = hyper::Response::new(Full::new(body));
        *resp.status_mut() = self.status;
        *resp.headers_mut() = self.headers;
        resp.headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_ok() {
        let resp = Response::new();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.body().is_empty());
        assert_eq!(resp.content_type(), None);
    }

    #[test]
    fn test_last_setter_wins() {
        let mut resp = Response::new();
        resp.html("<p>hi</p>");
        resp.text("plain text");
        assert_eq!(resp.body_text(), "plain text");
        assert_eq!(resp.content_type(), Some(TEXT_PLAIN));

        resp.json(&serde_json::json!({"name": "brainweb"})).unwrap();
        assert_eq!(resp.content_type(), Some(APPLICATION_JSON));
        assert_eq!(resp.body_text(), r#"{"name":"brainweb"}"#);
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let mut resp = Response::new();
        resp.method_not_allowed(&["get".to_string(), "post".to_string()]);
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.body_text(), "Method Not Allowed");
        assert_eq!(resp.headers()["allow"], "GET, POST");
    }

    #[test]
    fn test_into_hyper_head_strips_body() {
        let mut resp = Response::new();
        resp.text("hello");
        let hyper_resp = resp.into_hyper(true);
        assert_eq!(hyper_resp.headers()["content-length"], "5");
    }
}
