//! Content type detection for static assets
//!
//! Guesses from the file extension with `mime_guess`. Text types are sent as
//! UTF-8 unless the guess already carries a charset.

use std::path::Path;

use ::mime::Mime;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// `Content-Type` value for a file path
///
/// # Examples
/// ```
/// use std::path::Path;
/// use brainweb::http::mime::for_path;
/// assert_eq!(for_path(Path::new("index.html")), "text/html; charset=utf-8");
/// assert_eq!(for_path(Path::new("logo.png")), "image/png");
/// assert_eq!(for_path(Path::new("LICENSE")), "application/octet-stream");
/// ```
pub fn for_path(path: &Path) -> String {
    with_charset(&mime_guess::from_path(path).first_or_octet_stream())
}

fn with_charset(guess: &Mime) -> String {
    if guess.type_() == ::mime::TEXT && guess.get_param(::mime::CHARSET).is_none() {
        format!("{guess}; charset=utf-8")
    } else {
        guess.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_types_get_charset() {
        assert_eq!(for_path(Path::new("static/main.css")), "text/css; charset=utf-8");
        assert_eq!(for_path(Path::new("notes.txt")), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_binary_types_unchanged() {
        assert_eq!(for_path(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(for_path(Path::new("data.json")), "application/json");
        assert_eq!(for_path(Path::new("manual.pdf")), "application/pdf");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(for_path(Path::new("static/README")), OCTET_STREAM);
        assert_eq!(for_path(Path::new("blob.xyz123")), OCTET_STREAM);
    }

    #[test]
    fn test_existing_charset_kept() {
        let guess: Mime = "text/plain; charset=latin1".parse().unwrap();
        assert_eq!(with_charset(&guess), "text/plain; charset=latin1");
    }
}
