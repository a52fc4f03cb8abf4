//! Route template compilation.
//!
//! # Responsibilities
//! - Split a template such as `/items/{id}/tags` into segments
//! - Validate literal and parameter segments
//! - Derive the normalized lookup key
//!
//! # Design Decisions
//! - Parameters are written `{name}`; names and literals follow the same identifier rule
//! - Every parameter collapses to one placeholder, so names never affect lookup
//! - Empty segments are ignored (`/a//b/` is `/a/b`)

use std::fmt;

use thiserror::Error;

use crate::http::Method;

/// Token that stands in for every parameter segment of a normalized path.
pub const PLACEHOLDER: &str = "{}";

/// Registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A segment is neither an identifier nor `{identifier}`.
    #[error("Invalid path parameter: {path}; ensure the path parameter is a valid identifier")]
    InvalidIdentifier { path: String },

    /// A segment opens a parameter brace that is never closed.
    #[error("Invalid path: {path}; ensure path is written as follows '{{<VALID_VARIABLE_NAME>}}'")]
    InvalidBraces { path: String },
}

/// One segment of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A validated route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Compile a template, rejecting malformed segments.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| parse_segment(s, template))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    /// The template as it was registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Declared parameter names, left to right.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Path with every parameter replaced by [`PLACEHOLDER`].
    pub fn normalized(&self) -> String {
        join_segments(self.segments.iter().map(|s| match s {
            Segment::Literal(lit) => lit.as_str(),
            Segment::Param(_) => PLACEHOLDER,
        }))
    }

    pub fn key(&self, method: Method) -> RouteKey {
        RouteKey::new(self.normalized(), method)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Registry key: normalized path plus method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    path: String,
    method: Method,
}

impl RouteKey {
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.method)
    }
}

/// ASCII letters, digits and `_`, not starting with a digit.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Join segments into an absolute path; no segments yields `/`.
pub(crate) fn join_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

fn parse_segment(segment: &str, template: &str) -> Result<Segment, RouteError> {
    if is_identifier(segment) {
        return Ok(Segment::Literal(segment.to_string()));
    }

    if let Some(inner) = segment.strip_prefix('{') {
        return match inner.strip_suffix('}') {
            Some(name) if is_identifier(name) => Ok(Segment::Param(name.to_string())),
            Some(_) => Err(RouteError::InvalidIdentifier {
                path: template.to_string(),
            }),
            None => Err(RouteError::InvalidBraces {
                path: template.to_string(),
            }),
        };
    }

    Err(RouteError::InvalidIdentifier {
        path: template.to_string(),
    })
}
