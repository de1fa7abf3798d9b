//! Static file serving module
//!
//! Answers requests under the static prefix straight from disk, with MIME
//! detection, `ETag` revalidation and path traversal protection.

use std::fs;
use std::path::{Path, PathBuf};

use hyper::header::{self, HeaderValue};

use crate::http::{cache, mime, Request, Response};
use crate::routing::decode_segment;

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    prefix: String,
}

impl StaticFiles {
    /// Serve files under `root` for request paths starting with `prefix`
    pub fn new(root: impl Into<PathBuf>, prefix: &str) -> Self {
        let prefix = format!("/{}", prefix.trim_matches('/'));
        Self {
            root: root.into(),
            prefix,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` falls under the static prefix
    pub fn handles(&self, path: &str) -> bool {
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Serve the file named by the request path, or the default 404
    pub fn serve(&self, req: &Request) -> Response {
        let Some((content, content_type)) = self.load(req.path()) else {
            let mut resp = Response::new();
            resp.not_found();
            return resp;
        };

        let etag = cache::generate_etag(&content);
        if cache::check_etag_match(req.header("if-none-match"), &etag) {
            return Response::not_modified(&etag);
        }

        let mut resp = Response::new();
        let content_type = HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(mime::OCTET_STREAM));
        resp.set_body(content, content_type);
        if let Ok(value) = HeaderValue::from_str(&etag) {
            resp.headers_mut().insert(header::ETAG, value);
        }
        resp.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache::STATIC_CACHE_CONTROL),
        );
        resp
    }

    /// Read the file for a percent-encoded request path, returning its bytes and
    /// content type
    pub fn load(&self, path: &str) -> Option<(Vec<u8>, String)> {
        let encoded = path
            .strip_prefix(self.prefix.as_str())?
            .trim_start_matches('/');
        if encoded.is_empty() {
            return None;
        }

        let mut relative = PathBuf::new();
        for segment in encoded.split('/') {
            let segment = decode_segment(segment)?;
            // A decoded separator would address a different file than the URL names
            if segment.contains(['/', '\\']) {
                return None;
            }
            relative.push(segment);
        }

        let root = match self.root.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    root = %self.root.display(),
                    error = %e,
                    "static directory not found or inaccessible"
                );
                return None;
            }
        };

        // Missing files are an ordinary 404
        let file_path = self.root.join(&relative).canonicalize().ok()?;
        if !file_path.starts_with(&root) {
            tracing::warn!(path, resolved = %file_path.display(), "path traversal attempt blocked");
            return None;
        }
        if !file_path.is_file() {
            return None;
        }

        match fs::read(&file_path) {
            Ok(content) => Some((content, mime::for_path(&file_path))),
            Err(e) => {
                tracing::error!(file = %file_path.display(), error = %e, "failed to read static file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{Method, StatusCode};

    fn fixture() -> (tempfile::TempDir, StaticFiles) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test.css"), "body { background-color: blue;}").unwrap();
        fs::create_dir(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/app.js"), "console.log(1);").unwrap();
        let files = StaticFiles::new(dir.path(), "/static");
        (dir, files)
    }

    #[test]
    fn test_prefix_normalized() {
        assert_eq!(StaticFiles::new("static", "static/").prefix(), "/static");
        assert_eq!(StaticFiles::new("static", "/assets").prefix(), "/assets");
    }

    #[test]
    fn test_handles() {
        let files = StaticFiles::new("static", "/static");
        assert!(files.handles("/static/test.css"));
        assert!(files.handles("/static"));
        assert!(!files.handles("/statics/test.css"));
        assert!(!files.handles("/home"));
    }

    #[test]
    fn test_serve_existing_file() {
        let (_dir, files) = fixture();
        let resp = files.serve(&Request::new(Method::GET, "/static/test.css"));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body_text(), "body { background-color: blue;}");
        assert_eq!(resp.content_type(), Some("text/css; charset=utf-8"));
        assert!(resp.headers().contains_key("etag"));

        let resp = files.serve(&Request::new(Method::GET, "/static/js/app.js"));
        assert!(resp.content_type().unwrap().contains("javascript"));
    }

    #[test]
    fn test_encoded_file_name() {
        let (dir, files) = fixture();
        fs::write(dir.path().join("my notes.txt"), "hi").unwrap();
        let resp = files.serve(&Request::new(Method::GET, "/static/my%20notes.txt"));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body_text(), "hi");

        assert!(files.load("/static/js%2Fapp.js").is_none());
        assert!(files.load("/static/%2E%2E/test.css").is_none());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let (_dir, files) = fixture();
        let resp = files.serve(&Request::new(Method::GET, "/static/noneexistent.css"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.body_text(), "Not Found.");

        let resp = files.serve(&Request::new(Method::GET, "/static/js"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_traversal_blocked() {
        let (dir, _) = fixture();
        let inner = dir.path().join("public");
        fs::create_dir(&inner).unwrap();
        let files = StaticFiles::new(&inner, "/static");
        assert!(files.load("/static/../test.css").is_none());
    }

    #[test]
    fn test_etag_revalidation() {
        let (_dir, files) = fixture();
        let first = files.serve(&Request::new(Method::GET, "/static/test.css"));
        let etag = first.headers()["etag"].clone();

        let req = Request::new(Method::GET, "/static/test.css")
            .with_header(header::IF_NONE_MATCH, etag);
        let resp = files.serve(&req);
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(resp.body().is_empty());
    }
}
