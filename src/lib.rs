//! brainweb - a small request-dispatch web framework
//!
//! Register handlers on an [`App`] against path patterns such as `/hello/{name}`,
//! wrap them in [`Middleware`], and serve the app over HTTP/1.1 or drive it
//! in-process with [`App::test_session`].
//!
//! ```
//! use brainweb::App;
//!
//! let mut app = App::new();
//! app.add_route("/hello/{name}", |_req, resp, params| {
//!     resp.text(format!("Hello {}", params.get("name").unwrap_or_default()));
//!     Ok(())
//! })?;
//!
//! let resp = app.test_session().get("http://testserver/hello/world")?;
//! assert_eq!(resp.text(), "Hello world");
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod template;
pub mod testing;

pub use app::App;
pub use error::{Error, HandlerError, HandlerResult, Result};
pub use http::{Request, Response};
pub use middleware::{AccessLog, Middleware};
pub use routing::{Params, Resource};
pub use template::Templates;
pub use testing::{TestClient, TestResponse};
