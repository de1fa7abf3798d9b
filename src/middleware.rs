//! Middleware chain
//!
//! Each middleware contributes a `before` hook (request phase) and an `after` hook
//! (response phase). Both phases run in registration order around the dispatch.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::error::HandlerResult;
use crate::http::{Request, Response};
use crate::logger::{self, AccessLogEntry};

/// Hook pair wrapped around every routed request
///
/// Instances are shared across concurrently served requests; per-request state
/// belongs in request extensions and counters need atomics or a mutex.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &mut Request) {}

    fn after(&self, _req: &Request, _resp: &mut Response) {}
}

#[derive(Clone, Default)]
pub struct MiddlewareChain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, middleware: impl Middleware + 'static) {
        self.layers.push(Arc::new(middleware));
    }

    /// Add a middleware the caller keeps a handle to (e.g. to read its counters)
    pub fn add_shared(&mut self, middleware: Arc<dyn Middleware>) {
        self.layers.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Run all `before` hooks, `dispatch`, then all `after` hooks
    ///
    /// An error from `dispatch` skips the `after` hooks and is returned as is.
    pub fn process<F>(&self, req: &mut Request, resp: &mut Response, dispatch: F) -> HandlerResult
    where
        F: FnOnce(&Request, &mut Response) -> HandlerResult,
    {
        for layer in &self.layers {
            layer.before(req);
        }

        dispatch(req, resp)?;

        for layer in &self.layers {
            layer.after(req, resp);
        }
        Ok(())
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("layers", &self.layers.len())
            .finish()
    }
}

/// Peer address of the connection a request arrived on, set by the transport
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr(pub SocketAddr);

#[derive(Debug, Clone, Copy)]
struct RequestStart(Instant);

/// Access log middleware
///
/// Emits one line per routed request under the `access` target in the configured
/// format (`combined`, `common`, `json` or a custom `$variable` pattern).
#[derive(Debug, Clone)]
pub struct AccessLog {
    format: String,
}

impl AccessLog {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Middleware for AccessLog {
    fn before(&self, req: &mut Request) {
        req.extensions_mut().insert(RequestStart(Instant::now()));
    }

    fn after(&self, req: &Request, resp: &mut Response) {
        logger::log_access(&access_entry(req, resp), &self.format);
    }
}

fn access_entry(req: &Request, resp: &Response) -> AccessLogEntry {
    let remote_addr = req
        .extensions()
        .get::<ClientAddr>()
        .map_or_else(|| "-".to_string(), |addr| addr.0.ip().to_string());

    let mut entry = AccessLogEntry::new(
        remote_addr,
        req.method().to_string(),
        req.path().to_string(),
    );
    entry.query = req.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version());
    entry.status = resp.status().as_u16();
    entry.body_bytes = resp.body().len();
    entry.referer = req.header("referer").map(ToString::to_string);
    entry.user_agent = req.header("user-agent").map(ToString::to_string);
    if let Some(start) = req.extensions().get::<RequestStart>() {
        entry.request_time_us = u64::try_from(start.0.elapsed().as_micros()).unwrap_or(u64::MAX);
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recorder {
        fn before(&self, _req: &mut Request) {
            self.events.lock().unwrap().push(format!("{}:before", self.name));
        }

        fn after(&self, _req: &Request, _resp: &mut Response) {
            self.events.lock().unwrap().push(format!("{}:after", self.name));
        }
    }

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
    }

    impl Middleware for Counter {
        fn before(&self, _req: &mut Request) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Tagger;

    impl Middleware for Tagger {
        fn after(&self, _req: &Request, resp: &mut Response) {
            resp.headers_mut()
                .insert("x-tagged", hyper::header::HeaderValue::from_static("yes"));
        }
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        for name in ["first", "second"] {
            chain.add(Recorder {
                name,
                events: Arc::clone(&events),
            });
        }

        let mut req = Request::new(Method::GET, "/");
        let mut resp = Response::new();
        let inner = Arc::clone(&events);
        chain
            .process(&mut req, &mut resp, |_, _| {
                inner.lock().unwrap().push("dispatch".to_string());
                Ok(())
            })
            .unwrap();

        // After hooks keep registration order rather than unwinding
        assert_eq!(
            *events.lock().unwrap(),
            [
                "first:before",
                "second:before",
                "dispatch",
                "first:after",
                "second:after"
            ]
        );
    }

    #[test]
    fn test_error_skips_after_hooks() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.add(Recorder {
            name: "only",
            events: Arc::clone(&events),
        });

        let mut req = Request::new(Method::GET, "/");
        let mut resp = Response::new();
        let result = chain.process(&mut req, &mut resp, |_, _| Err("boom".into()));
        assert!(result.is_err());
        assert_eq!(*events.lock().unwrap(), ["only:before"]);
    }

    #[test]
    fn test_shared_counter_and_response_mutation() {
        let counter = Arc::new(Counter::default());
        let mut chain = MiddlewareChain::new();
        chain.add_shared(counter.clone());
        chain.add(Tagger);
        assert_eq!(chain.len(), 2);

        for _ in 0..3 {
            let mut req = Request::new(Method::GET, "/");
            let mut resp = Response::new();
            chain.process(&mut req, &mut resp, |_, _| Ok(())).unwrap();
            assert_eq!(resp.headers()["x-tagged"], "yes");
        }
        assert_eq!(counter.hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_access_log_records_start_time() {
        let chain = {
            let mut chain = MiddlewareChain::new();
            chain.add(AccessLog::new("common"));
            chain
        };
        let mut req = Request::new(Method::GET, "/home");
        let mut resp = Response::new();
        chain
            .process(&mut req, &mut resp, |req, resp| {
                assert!(req.extensions().get::<RequestStart>().is_some());
                resp.text("ok");
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_access_entry_fields() {
        let mut req = Request::new(Method::GET, "/hello/Isl%C3%B6m?x=1")
            .with_version(hyper::Version::HTTP_10);
        req.extensions_mut()
            .insert(ClientAddr("10.0.0.7:51000".parse().unwrap()));
        let mut resp = Response::new();
        resp.text("Hello");

        let entry = access_entry(&req, &resp);
        assert_eq!(entry.remote_addr, "10.0.0.7");
        assert_eq!(entry.path, "/hello/Isl%C3%B6m");
        assert_eq!(entry.http_version, "HTTP/1.0");
        assert_eq!(entry.body_bytes, 5);
        assert!(entry.format("common").contains("\"GET /hello/Isl%C3%B6m?x=1 HTTP/1.0\" 200 5"));
    }
}
