//! Request handler module
//!
//! Route dispatch (404/405 defaults, verb lookup) and static asset serving.

pub mod router;
pub mod static_files;

pub use router::dispatch;
pub use static_files::StaticFiles;
