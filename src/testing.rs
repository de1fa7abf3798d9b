//! In-process test client
//!
//! Sends requests through [`App::handle`] without a socket, so middleware, the
//! exception handler and static files behave exactly as they do when served.

use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Method, StatusCode, Uri};
use serde::de::DeserializeOwned;

use crate::app::App;
use crate::error::HandlerError;
use crate::http::Request;

#[derive(Debug, Clone, Copy)]
pub struct TestClient<'a> {
    app: &'a App,
}

impl<'a> TestClient<'a> {
    pub const fn new(app: &'a App) -> Self {
        Self { app }
    }

    pub fn get(&self, url: &str) -> Result<TestResponse, HandlerError> {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> Result<TestResponse, HandlerError> {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> Result<TestResponse, HandlerError> {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: &str) -> Result<TestResponse, HandlerError> {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: &str) -> Result<TestResponse, HandlerError> {
        self.request(Method::DELETE, url)
    }

    /// Issue `method` against `url`; absolute URLs and bare paths are both accepted
    ///
    /// The `Err` side only ever carries a handler error.
    ///
    /// # Panics
    ///
    /// Panics if `url` is not a valid URI.
    pub fn request(&self, method: Method, url: &str) -> Result<TestResponse, HandlerError> {
        let uri: Uri = url
            .parse()
            .unwrap_or_else(|e| panic!("invalid test URL {url:?}: {e}"));
        self.request_with(Request::from_uri(method, &uri))
    }

    /// Issue a fully built request (headers, body)
    pub fn request_with(&self, req: Request) -> Result<TestResponse, HandlerError> {
        let resp = self.app.handle(req)?;
        Ok(TestResponse {
            status_code: resp.status(),
            headers: resp.headers().clone(),
            body: resp.body().clone(),
        })
    }
}

/// Response captured by the test client
#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status_code: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body decoded as UTF-8, lossy
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
