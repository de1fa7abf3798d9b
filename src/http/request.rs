//! Inbound request view
//!
//! Transport-neutral request value. The dispatcher only reads the method and path;
//! middleware may read or mutate headers and attach typed data through extensions.

use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::http::Extensions;
use hyper::{Method, Uri, Version};

#[derive(Debug)]
pub struct Request {
    method: Method,
    /// Request path as received, still percent-encoded
    path: String,
    query: Option<String>,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    extensions: Extensions,
}

impl Request {
    /// Create a request from a method and a request target (`/path?query`)
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            method,
            path: path.to_string(),
            query,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            extensions: Extensions::new(),
        }
    }

    /// Create a request from a parsed URI; scheme and authority are ignored
    pub fn from_uri(method: Method, uri: &Uri) -> Self {
        let mut req = Self::new(method, uri.path());
        req.query = uri.query().map(ToString::to_string);
        req
    }

    /// Build a request out of a hyper request whose body was already collected
    pub fn from_parts(parts: hyper::http::request::Parts, body: Bytes) -> Self {
        let mut req = Self::from_uri(parts.method, &parts.uri);
        req.version = parts.version;
        req.headers = parts.headers;
        req.extensions = parts.extensions;
        req.body = body;
        req
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Protocol version; `HTTP/1.1` unless built from a transport request
    pub const fn version(&self) -> Version {
        self.version
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Header value as a string, if present and valid ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Lowercased method name, the form used for allowed-method checks
    pub fn verb(&self) -> String {
        self.method.as_str().to_ascii_lowercase()
    }
}
