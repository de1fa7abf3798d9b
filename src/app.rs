//! Application object
//!
//! Owns the route registry, the middleware chain, the exception handler and the
//! template/static collaborators. Built mutably during setup, then shared
//! read-only (`Arc<App>`) by the transport.
//!
//! Request flow for [`App::handle`]:
//! 1. Paths under the static prefix are answered from disk
//! 2. Middleware `before` hooks
//! 3. Dispatch, with handler errors routed to the exception handler
//! 4. Middleware `after` hooks

use std::sync::Arc;

use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{HandlerError, HandlerResult, Result};
use crate::handler::{self, StaticFiles};
use crate::http::{Request, Response};
use crate::middleware::{Middleware, MiddlewareChain};
use crate::routing::{Handler, Params, Resource, RouteRegistry};
use crate::template::Templates;
use crate::testing::TestClient;

/// Callback turning a handler error into a response
pub type ExceptionHandlerFn = Arc<dyn Fn(&Request, &mut Response, &HandlerError) + Send + Sync>;

pub struct App {
    routes: RouteRegistry,
    middleware: MiddlewareChain,
    exception_handler: Option<ExceptionHandlerFn>,
    templates: Templates,
    static_files: StaticFiles,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// App reading templates from `templates/` and serving `static/` under `/static`
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_collaborators(
            Templates::from_dir(&config.templates_dir),
            StaticFiles::new(&config.static_dir, &config.static_prefix),
        )
    }

    pub fn with_collaborators(templates: Templates, static_files: StaticFiles) -> Self {
        Self {
            routes: RouteRegistry::new(),
            middleware: MiddlewareChain::new(),
            exception_handler: None,
            templates,
            static_files,
        }
    }

    /// Register a handler reachable by every verb
    pub fn add_route<F>(&mut self, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.routes
            .register(pattern, Handler::function(handler), &[])
    }

    /// Register a handler restricted to `methods`; other verbs get a 405
    pub fn add_route_with_methods<F>(
        &mut self,
        pattern: &str,
        methods: &[&str],
        handler: F,
    ) -> Result<()>
    where
        F: Fn(&Request, &mut Response, &Params) -> HandlerResult + Send + Sync + 'static,
    {
        self.routes
            .register(pattern, Handler::function(handler), methods)
    }

    /// Register a per-verb resource
    pub fn add_resource(&mut self, pattern: &str, resource: Resource) -> Result<()> {
        self.routes.register_resource(pattern, resource)
    }

    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.add(middleware);
    }

    pub fn add_shared_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.add_shared(middleware);
    }

    /// Set the exception handler, replacing any previous one
    pub fn add_exception_handler<F>(&mut self, handler: F)
    where
        F: Fn(&Request, &mut Response, &HandlerError) + Send + Sync + 'static,
    {
        if self.exception_handler.is_some() {
            tracing::debug!("replacing exception handler");
        }
        self.exception_handler = Some(Arc::new(handler));
    }

    /// Template handle for capturing in handlers
    pub fn templates(&self) -> Templates {
        self.templates.clone()
    }

    pub fn template<S: Serialize>(&self, name: &str, context: S) -> Result<String> {
        self.templates.render(name, context)
    }

    pub const fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    pub const fn static_files(&self) -> &StaticFiles {
        &self.static_files
    }

    /// Handle one request
    ///
    /// Returns the handler error only when no exception handler is registered.
    pub fn handle(&self, mut req: Request) -> Result<Response, HandlerError> {
        if self.static_files.handles(req.path()) {
            return Ok(self.static_files.serve(&req));
        }

        let mut resp = Response::new();
        self.middleware
            .process(&mut req, &mut resp, |req, resp| self.dispatch(req, resp))?;
        Ok(resp)
    }

    fn dispatch(&self, req: &Request, resp: &mut Response) -> HandlerResult {
        let Err(err) = handler::dispatch(&self.routes, req, resp) else {
            return Ok(());
        };

        match &self.exception_handler {
            Some(on_exception) => {
                tracing::warn!(method = %req.method(), path = req.path(), error = %err, "handler failed, using exception handler");
                on_exception(req, resp, &err);
                Ok(())
            }
            None => Err(err),
        }
    }

    /// In-process client running requests through [`App::handle`]
    pub const fn test_session(&self) -> TestClient<'_> {
        TestClient::new(self)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.routes.len())
            .field("middleware", &self.middleware)
            .field("exception_handler", &self.exception_handler.is_some())
            .field("static_files", &self.static_files)
            .finish_non_exhaustive()
    }
}
