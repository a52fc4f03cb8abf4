//! Request validation.
//!
//! # Responsibilities
//! - Check the method, body headers, declared size and protocol version
//! - Turn a routing miss into a not-found rejection
//!
//! # Design Decisions
//! - Pure functions over the parsed head; no I/O
//! - Checks run in a fixed order and the first failure wins:
//!   method, Content-Length, Content-Type, size, version, route
//! - The framer interleaves body completion between the size and version checks

use crate::http::error::HttpError;
use crate::http::framer::RequestHead;
use crate::http::method::Method;

/// The only protocol version accepted.
pub const SUPPORTED_VERSION: &str = "HTTP/1.1";

/// Media type required on body-bearing requests.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// The method token must name a supported method.
pub fn check_method(token: &str) -> Result<Method, HttpError> {
    token.parse().map_err(|_| HttpError::UnsupportedMethod {
        method: token.to_string(),
    })
}

/// Body header checks for body-bearing methods.
///
/// Returns the declared body length, or `None` when the method carries no body.
pub fn check_body_headers(
    method: Method,
    head: &RequestHead,
    max_body_size: usize,
) -> Result<Option<usize>, HttpError> {
    if !method.requires_body() {
        return Ok(None);
    }

    let declared = head.content_length.as_deref().ok_or(HttpError::LengthRequired)?;
    let declared = declared.trim();
    if declared.is_empty() || !declared.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HttpError::InvalidContentLength);
    }
    let length: usize = declared.parse().map_err(|_| HttpError::InvalidContentLength)?;

    match head.content_type.as_deref() {
        Some(value) if is_json_content_type(value) => {}
        _ => return Err(HttpError::UnsupportedMediaType),
    }

    if length > max_body_size {
        return Err(HttpError::PayloadTooLarge {
            limit: max_body_size,
        });
    }

    Ok(Some(length))
}

pub fn check_version(version: &str) -> Result<(), HttpError> {
    if version.trim() == SUPPORTED_VERSION {
        Ok(())
    } else {
        Err(HttpError::VersionNotSupported {
            version: version.to_string(),
        })
    }
}

/// A routing miss becomes [`HttpError::RouteNotFound`].
pub fn check_route<T>(resolved: Option<T>) -> Result<T, HttpError> {
    resolved.ok_or(HttpError::RouteNotFound)
}

/// `application/json`, ignoring parameters and case.
pub fn is_json_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .map(|media| media.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(content_type: Option<&str>, content_length: Option<&str>) -> RequestHead {
        RequestHead {
            method: "POST".into(),
            target: "/foo".into(),
            version: "HTTP/1.1".into(),
            content_type: content_type.map(str::to_string),
            content_length: content_length.map(str::to_string),
        }
    }

    #[test]
    fn method_check() {
        assert_eq!(check_method("GET").unwrap(), Method::Get);
        assert_eq!(
            check_method("BREW").unwrap_err(),
            HttpError::UnsupportedMethod { method: "BREW".into() }
        );
    }

    #[test]
    fn length_is_checked_before_content_type() {
        let err = check_body_headers(Method::Post, &head(None, None), 100).unwrap_err();
        assert_eq!(err, HttpError::LengthRequired);
    }

    #[test]
    fn content_type_must_be_json() {
        let err = check_body_headers(Method::Put, &head(None, Some("2")), 100).unwrap_err();
        assert_eq!(err, HttpError::UnsupportedMediaType);

        let err = check_body_headers(Method::Patch, &head(Some("text/plain"), Some("2")), 100).unwrap_err();
        assert_eq!(err, HttpError::UnsupportedMediaType);
    }

    #[test]
    fn size_limit() {
        let err = check_body_headers(Method::Post, &head(Some("application/json"), Some("101")), 100)
            .unwrap_err();
        assert_eq!(err, HttpError::PayloadTooLarge { limit: 100 });

        let ok = check_body_headers(Method::Post, &head(Some("application/json"), Some("100")), 100);
        assert_eq!(ok, Ok(Some(100)));
    }

    #[test]
    fn malformed_length() {
        for bad in ["abc", "-1", "1.5", "", "+5", "0x10", "1 2"] {
            let err = check_body_headers(Method::Post, &head(Some("application/json"), Some(bad)), 100)
                .unwrap_err();
            assert_eq!(err, HttpError::InvalidContentLength, "length {bad:?}");
        }
    }

    #[test]
    fn bodiless_methods_skip_body_checks() {
        assert_eq!(check_body_headers(Method::Get, &head(None, None), 0), Ok(None));
        assert_eq!(check_body_headers(Method::Delete, &head(None, Some("x")), 0), Ok(None));
    }

    #[test]
    fn version_check() {
        assert!(check_version("HTTP/1.1").is_ok());
        assert!(check_version("HTTP/1.1\r").is_ok());
        assert_eq!(
            check_version("HTTP/2").unwrap_err(),
            HttpError::VersionNotSupported { version: "HTTP/2".into() }
        );
        assert!(check_version("http/1.1").is_err());
    }

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(!is_json_content_type("application/jsonp"));
        assert!(!is_json_content_type("text/json"));
    }

    #[test]
    fn route_check() {
        assert_eq!(check_route(Some(1)), Ok(1));
        assert_eq!(check_route::<u8>(None), Err(HttpError::RouteNotFound));
    }
}
