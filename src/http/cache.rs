//! HTTP cache control module
//!
//! `ETag` generation and `If-None-Match` checks for static assets.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Cache-Control value sent with static assets
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

/// Generate a quoted `ETag` from the content hash, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether the client's `If-None-Match` covers `etag` (list or `*` wildcard)
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_quoted_and_stable() {
        let etag = generate_etag(b"body { background-color: blue;}");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag, generate_etag(b"body { background-color: blue;}"));
        assert_ne!(etag, generate_etag(b"body { background-color: red;}"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }
}
