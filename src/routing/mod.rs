//! Routing module
//!
//! Provides the path-pattern matcher and the ordered route registry:
//! - `{name}` placeholders bound to single path segments
//! - Plain function handlers with optional allowed-method lists
//! - Resource handlers exposing one callable per HTTP verb

mod matcher;
mod registry;

pub use matcher::{decode_segment, Params, PathPattern};
pub use registry::{Handler, HandlerFn, Resource, Route, RouteRegistry};
