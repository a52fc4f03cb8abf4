//! Protocol and routing failures.
//!
//! Every variant maps to one status code; its `Display` text is the message
//! sent back to the client as `{"message": ...}`.

use http::StatusCode;
use thiserror::Error;

use crate::http::method::Method;
use crate::http::response::Response;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("Malformed request line")]
    MalformedRequestLine,

    #[error("Request head must be valid UTF-8")]
    InvalidHeadEncoding,

    #[error("Request body must be valid UTF-8")]
    InvalidBodyEncoding,

    #[error("Request header section exceeds the limit of {limit} bytes")]
    HeadTooLarge { limit: usize },

    #[error("Use supported http methods: {}", Method::supported_list())]
    UnsupportedMethod { method: String },

    #[error("Content-Length header required")]
    LengthRequired,

    #[error("Invalid Content-Length header")]
    InvalidContentLength,

    #[error("A content-type of application/json must be provided")]
    UnsupportedMediaType,

    #[error("Request body exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Timed out waiting for request head")]
    HeadTimeout,

    #[error("Timed out waiting for request body")]
    BodyTimeout,

    #[error("Request body is incomplete")]
    IncompleteBody,

    #[error("Use HTTP/1.1 version")]
    VersionNotSupported { version: String },

    #[error("Route not found")]
    RouteNotFound,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::MalformedRequestLine
            | HttpError::InvalidHeadEncoding
            | HttpError::InvalidBodyEncoding
            | HttpError::UnsupportedMethod { .. }
            | HttpError::InvalidContentLength
            | HttpError::IncompleteBody => StatusCode::BAD_REQUEST,
            HttpError::HeadTooLarge { .. } => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            HttpError::LengthRequired => StatusCode::LENGTH_REQUIRED,
            HttpError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            HttpError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::HeadTimeout | HttpError::BodyTimeout => StatusCode::REQUEST_TIMEOUT,
            HttpError::VersionNotSupported { .. } => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
            HttpError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn into_response(self) -> Response {
        Response::message(self.status(), self.to_string())
    }
}

impl From<HttpError> for Response {
    fn from(err: HttpError) -> Self {
        err.into_response()
    }
}
