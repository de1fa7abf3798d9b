//! Request dispatch module
//!
//! Resolves the request path against the registry, applies the allowed-method
//! check and invokes the handler. Not-found and method-not-allowed are ordinary
//! outcomes written into the response; only handler errors are returned.

use crate::error::HandlerResult;
use crate::http::{Request, Response};
use crate::routing::{Handler, RouteRegistry};

/// Dispatch one request into `resp`
///
/// 1. No matching route: `404 Not Found.`
/// 2. Function handler with a non-empty allowed list missing the verb: `405`
/// 3. Resource without a callable for the verb: `405`
/// 4. Otherwise the handler populates the response
pub fn dispatch(routes: &RouteRegistry, req: &Request, resp: &mut Response) -> HandlerResult {
    let Some((route, params)) = routes.resolve(req.path()) else {
        tracing::debug!(path = req.path(), "no route matched");
        resp.not_found();
        return Ok(());
    };

    let verb = req.verb();
    let handler = match route.handler() {
        Handler::Function(handler) if route.allows(&verb) => handler,
        Handler::Resource(resource) => match resource.method(&verb) {
            Some(handler) => handler,
            None => {
                reject_method(req, route.pattern(), route.allowed_methods(), resp);
                return Ok(());
            }
        },
        Handler::Function(_) => {
            reject_method(req, route.pattern(), route.allowed_methods(), resp);
            return Ok(());
        }
    };

    handler(req, resp, &params)
}

fn reject_method(req: &Request, pattern: &str, allowed: &[String], resp: &mut Response) {
    tracing::debug!(method = %req.method(), pattern, "method not allowed");
    resp.method_not_allowed(allowed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Resource;
    use hyper::{Method, StatusCode};

    fn run(routes: &RouteRegistry, method: Method, path: &str) -> Response {
        let req = Request::new(method, path);
        let mut resp = Response::new();
        dispatch(routes, &req, &mut resp).unwrap();
        resp
    }

    #[test]
    fn test_not_found() {
        let routes = RouteRegistry::new();
        let resp = run(&routes, Method::GET, "/nimadr");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.body_text(), "Not Found.");
    }

    #[test]
    fn test_allowed_methods() {
        let mut routes = RouteRegistry::new();
        routes
            .register(
                "/about",
                Handler::function(|_, resp, _| {
                    resp.text("Hello from the About page");
                    Ok(())
                }),
                &["put"],
            )
            .unwrap();

        let resp = run(&routes, Method::GET, "/about");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.body_text(), "Method Not Allowed");
        assert_eq!(resp.headers()["allow"], "PUT");

        let resp = run(&routes, Method::PUT, "/about");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body_text(), "Hello from the About page");
    }

    #[test]
    fn test_empty_allowed_methods_accepts_any_verb() {
        let mut routes = RouteRegistry::new();
        routes
            .register(
                "/any",
                Handler::function(|req, resp, _| {
                    resp.text(req.method().as_str());
                    Ok(())
                }),
                &[],
            )
            .unwrap();

        for method in [Method::GET, Method::POST, Method::DELETE] {
            assert_eq!(run(&routes, method.clone(), "/any").body_text(), method.as_str());
        }
    }

    #[test]
    fn test_resource_verb_lookup() {
        let mut routes = RouteRegistry::new();
        let books = Resource::new().post(|_, resp, _| {
            resp.text("Endpoint to create book.");
            Ok(())
        });
        routes.register_resource("/books", books).unwrap();

        let resp = run(&routes, Method::GET, "/books");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.body_text(), "Method Not Allowed");

        let resp = run(&routes, Method::POST, "/books");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body_text(), "Endpoint to create book.");
    }

    #[test]
    fn test_params_passed_to_handler() {
        let mut routes = RouteRegistry::new();
        routes
            .register(
                "/hello/{name}",
                Handler::function(|_, resp, params| {
                    resp.text(format!("Hello {}", params.get("name").unwrap_or_default()));
                    Ok(())
                }),
                &[],
            )
            .unwrap();

        assert_eq!(run(&routes, Method::GET, "/hello/Islom").body_text(), "Hello Islom");
    }

    #[test]
    fn test_handler_error_returned() {
        let mut routes = RouteRegistry::new();
        routes
            .register(
                "/exception",
                Handler::function(|_, _, _| Err("some exception".into())),
                &[],
            )
            .unwrap();

        let req = Request::new(Method::GET, "/exception");
        let mut resp = Response::new();
        let err = dispatch(&routes, &req, &mut resp).unwrap_err();
        assert_eq!(err.to_string(), "some exception");
    }
}
