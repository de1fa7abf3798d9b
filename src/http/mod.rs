//! HTTP layer module
//!
//! Request and response values seen by handlers and middleware, plus the content-type
//! and cache helpers shared by the dispatcher and the static-file collaborator.

pub mod cache;
pub mod mime;
pub mod request;
pub mod response;

pub use request::Request;
pub use response::Response;

/// Body text of the default not-found response
pub const NOT_FOUND_BODY: &str = "Not Found.";

/// Body text of the default method-not-allowed response
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method Not Allowed";
