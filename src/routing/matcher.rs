//! Concrete request path matching.
//!
//! # Responsibilities
//! - Split a request path into segments the same way templates are split
//! - Bind integer-looking segments as path parameters
//! - Produce the normalized path used for key lookup
//!
//! # Design Decisions
//! - Only integer literals bind to parameters; a parameter placed where a
//!   client sends a word never matches
//! - Integers that overflow `i64` stay literal (and therefore miss)
//! - A literal `{}` segment never matches, so bound params always equal declared params
//! - No regex: a single pass over the segments

use crate::routing::template::{join_segments, PLACEHOLDER};

/// A request path reduced to its lookup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// Normalized path, parameters replaced by the placeholder.
    pub normalized: String,
    /// Bound parameter values, left to right.
    pub params: Vec<i64>,
}

/// Normalize a request path (query already stripped).
///
/// Returns `None` when a segment is the placeholder itself, which no
/// registered route can carry as a literal.
pub fn match_path(path: &str) -> Option<PathMatch> {
    let mut params = Vec::new();
    let mut segments = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match parse_integer(segment) {
            Some(value) => {
                params.push(value);
                segments.push(PLACEHOLDER);
            }
            None if segment == PLACEHOLDER => return None,
            None => segments.push(segment),
        }
    }

    Some(PathMatch {
        normalized: join_segments(segments.into_iter()),
        params,
    })
}

/// Parse `-?[0-9]+` into an `i64`.
pub fn parse_integer(segment: &str) -> Option<i64> {
    let digits = segment.strip_prefix('-').unwrap_or(segment);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
