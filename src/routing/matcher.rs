//! Path pattern matching module
//!
//! A pattern is a slash-delimited list of segments. `{name}` matches exactly one
//! non-empty segment and binds it; anything else must match literally
//! (case-sensitive). Trailing slashes are significant and there are no wildcards.
//!
//! Request paths arrive percent-encoded. They are split on `/` first and each
//! segment is decoded afterwards, so `%2F` stays inside its segment.

use crate::error::{Error, Result};

/// Placeholder values extracted from a matched path, in pattern order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Compiled route pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile `pattern`, rejecting malformed placeholders up front
    pub fn compile(pattern: &str) -> Result<Self> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(Error::invalid_pattern(pattern, "must start with '/'"));
        };

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            segments.push(compile_segment(pattern, segment, &segments)?);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Raw pattern string as registered
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a percent-encoded request `path` and extract decoded placeholder bindings
    ///
    /// A segment that does not decode to UTF-8 never matches.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            let part = decode_segment(part)?;
            match segment {
                Segment::Literal(literal) if *literal == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    params.push((name.clone(), part));
                }
                _ => return None,
            }
        }
        Some(Params(params))
    }
}

/// Percent-decode one path segment
pub fn decode_segment(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(std::borrow::Cow::into_owned)
}

fn compile_segment(pattern: &str, segment: &str, seen: &[Segment]) -> Result<Segment> {
    let placeholder = segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'));

    let Some(name) = placeholder else {
        if segment.contains(['{', '}']) {
            return Err(Error::invalid_pattern(
                pattern,
                format!("segment '{segment}' mixes braces with literal text"),
            ));
        }
        return Ok(Segment::Literal(segment.to_string()));
    };

    if name.is_empty() {
        return Err(Error::invalid_pattern(pattern, "empty placeholder '{}'"));
    }
    if !is_identifier(name) {
        return Err(Error::invalid_pattern(
            pattern,
            format!("placeholder '{name}' is not a valid name"),
        ));
    }
    if seen
        .iter()
        .any(|s| matches!(s, Segment::Param(existing) if existing == name))
    {
        return Err(Error::invalid_pattern(
            pattern,
            format!("placeholder '{name}' used twice"),
        ));
    }
    Ok(Segment::Param(name.to_string()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
