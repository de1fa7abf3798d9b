use std::sync::Arc;
use std::time::Duration;

use brainweb::config::Config;
use brainweb::{logger, server, AccessLog, App, Middleware, Request, Resource, Response};
use hyper::StatusCode;
use serde_json::json;

fn main() -> brainweb::Result<()> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    let app = build_app(&cfg)?;
    runtime.block_on(async_main(cfg, app))
}

async fn async_main(cfg: Config, app: App) -> brainweb::Result<()> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    server::serve(
        listener,
        Arc::new(app),
        Duration::from_secs(cfg.server.connection_timeout),
        server::shutdown_signal(),
    )
    .await;
    Ok(())
}

/// Logs around every routed request
struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn before(&self, req: &mut Request) {
        tracing::info!(method = %req.method(), path = req.path(), "request is being called");
    }

    fn after(&self, _req: &Request, resp: &mut Response) {
        tracing::info!(status = resp.status().as_u16(), "response has been generated");
    }
}

fn build_app(cfg: &Config) -> brainweb::Result<App> {
    let mut app = App::from_config(&cfg.app);

    app.add_route_with_methods("/home", &["get"], |_, resp, _| {
        resp.text("Hello from the Home page");
        Ok(())
    })?;

    app.add_route_with_methods("/about", &["put"], |_, resp, _| {
        resp.text("Hello from the About page");
        Ok(())
    })?;

    app.add_route("/hello/{name}", |_, resp, params| {
        resp.text(format!("Hello {}", params.get("name").unwrap_or_default()));
        Ok(())
    })?;

    app.add_resource(
        "/books",
        Resource::new()
            .get(|_, resp, _| {
                resp.text("Books page");
                Ok(())
            })
            .post(|_, resp, _| {
                resp.text("Endpoint to create a book");
                Ok(())
            }),
    )?;

    app.add_route("/new-handler", |_, resp, _| {
        resp.text("From new handler");
        Ok(())
    })?;

    let templates = app.templates();
    app.add_route("/template", move |_, resp, _| {
        resp.html(templates.render(
            "home.html",
            json!({"new_title": "New title", "new_body": "New body 123"}),
        )?);
        Ok(())
    })?;

    app.add_route("/json", |_, resp, _| {
        resp.json(&json!({"name": "some name", "type": "json"}))?;
        Ok(())
    })?;

    app.add_exception_handler(|_, resp, err| {
        resp.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        resp.text(err.to_string());
    });

    app.add_route("/exception", |_, _, _| Err("some exception".into()))?;

    app.add_middleware(LoggingMiddleware);
    if cfg.logging.access_log {
        app.add_middleware(AccessLog::new(cfg.logging.access_log_format.clone()));
    }

    Ok(app)
}
