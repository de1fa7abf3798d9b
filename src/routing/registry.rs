//! Route registry module
//!
//! Ordered list of routes. Resolution tries routes in registration order and the
//! first matching pattern wins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::matcher::{Params, PathPattern};
use crate::error::{Error, HandlerResult, Result};
use crate::http::{Request, Response};

/// Shared handler callable
pub type HandlerFn = Arc<dyn Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync>;

/// Handler object exposing one callable per HTTP verb
///
/// Verbs are stored lowercased; a request whose verb has no callable gets a 405.
#[derive(Clone, Default)]
pub struct Resource {
    methods: BTreeMap<String, HandlerFn>,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` to `verb` (case-insensitive), replacing any previous one
    #[must_use]
    pub fn on<F>(mut self, verb: &str, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.methods
            .insert(verb.to_ascii_lowercase(), Arc::new(handler));
        self
    }

    #[must_use]
    pub fn get<F>(self, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.on("get", handler)
    }

    #[must_use]
    pub fn post<F>(self, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.on("post", handler)
    }

    #[must_use]
    pub fn put<F>(self, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.on("put", handler)
    }

    #[must_use]
    pub fn patch<F>(self, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.on("patch", handler)
    }

    #[must_use]
    pub fn delete<F>(self, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.on("delete", handler)
    }

    /// Callable for a lowercased verb
    pub fn method(&self, verb: &str) -> Option<&HandlerFn> {
        self.methods.get(verb)
    }

    /// Verbs this resource answers, sorted
    pub fn verbs(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("verbs", &self.verbs())
            .finish()
    }
}

/// Route target
#[derive(Clone)]
pub enum Handler {
    Function(HandlerFn),
    Resource(Resource),
}

impl Handler {
    pub fn function<F>(handler: F) -> Self
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Function(Arc::new(handler))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function"),
            Self::Resource(resource) => resource.fmt(f),
        }
    }
}

/// Registered route; immutable once in the registry
#[derive(Debug)]
pub struct Route {
    pattern: PathPattern,
    handler: Handler,
    allowed_methods: Vec<String>,
}

impl Route {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub const fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Lowercased verbs; empty means every verb reaches the handler
    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }

    /// Whether a lowercased verb passes the allowed-method check
    pub fn allows(&self, verb: &str) -> bool {
        self.allowed_methods.is_empty() || self.allowed_methods.iter().any(|m| m == verb)
    }
}

#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function handler; `allowed_methods` empty allows every verb
    pub fn register(
        &mut self,
        pattern: &str,
        handler: Handler,
        allowed_methods: &[&str],
    ) -> Result<()> {
        let allowed_methods = allowed_methods
            .iter()
            .map(|m| m.to_ascii_lowercase())
            .collect();
        self.insert(pattern, handler, allowed_methods)
    }

    /// Register a resource; its allowed verbs are the ones it defines
    pub fn register_resource(&mut self, pattern: &str, resource: Resource) -> Result<()> {
        let allowed_methods = resource.verbs();
        self.insert(pattern, Handler::Resource(resource), allowed_methods)
    }

    fn insert(
        &mut self,
        pattern: &str,
        handler: Handler,
        allowed_methods: Vec<String>,
    ) -> Result<()> {
        if self.contains(pattern) {
            return Err(Error::DuplicateRoute(pattern.to_string()));
        }
        let pattern = PathPattern::compile(pattern)?;
        tracing::debug!(pattern = pattern.as_str(), ?handler, "route registered");
        self.routes.push(Route {
            pattern,
            handler,
            allowed_methods,
        });
        Ok(())
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.routes.iter().any(|r| r.pattern() == pattern)
    }

    /// First route matching `path`, with its bindings
    pub fn resolve(&self, path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
