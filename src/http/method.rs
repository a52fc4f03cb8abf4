//! HTTP method tokens.
//!
//! # Design Decisions
//! - Closed set: anything outside it is rejected with 400 before routing
//! - Tokens are matched case-insensitively and normalized to upper case
//! - POST, PUT and PATCH are the body-bearing methods

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A supported HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

/// Returned when a request line or route names a method outside [`Method::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl Method {
    /// Every supported method, in alphabetical order.
    pub const ALL: [Method; 9] = [
        Method::Connect,
        Method::Delete,
        Method::Get,
        Method::Head,
        Method::Options,
        Method::Patch,
        Method::Post,
        Method::Put,
        Method::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Connect => "CONNECT",
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Trace => "TRACE",
        }
    }

    /// Whether requests with this method must declare a JSON body.
    pub fn requires_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    /// Comma separated list of supported tokens, used in rejection messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| UnknownMethod(token.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("Patch".parse::<Method>().unwrap(), Method::Patch);
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = "FETCH".parse::<Method>().unwrap_err();
        assert_eq!(err, UnknownMethod("FETCH".into()));
        assert!("".parse::<Method>().is_err());
    }

    #[test]
    fn body_bearing_methods() {
        let bearing: Vec<_> = Method::ALL.iter().filter(|m| m.requires_body()).collect();
        assert_eq!(bearing, vec![&Method::Patch, &Method::Post, &Method::Put]);
    }

    #[test]
    fn supported_list_is_alphabetical() {
        assert_eq!(
            Method::supported_list(),
            "CONNECT, DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT, TRACE"
        );
    }
}
