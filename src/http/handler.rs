//! Handler contract.
//!
//! Handlers are plain functions from a borrowed [`Request`] to a
//! [`HandlerResult`]. Expected failures are returned as [`HandlerError`]
//! and mapped 1:1 onto the response; see `dispatcher` for panics.

use http::StatusCode;
use thiserror::Error;

use crate::http::request::Request;
use crate::http::response::Response;

/// Outcome of a handler invocation.
pub type HandlerResult = Result<Response, HandlerError>;

/// A recoverable failure declared by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// Response carrying `{"message": ...}` with the declared status.
    pub fn into_response(self) -> Response {
        Response::message(self.status, self.message)
    }
}

impl From<HandlerError> for Response {
    fn from(err: HandlerError) -> Self {
        err.into_response()
    }
}

/// Something that can answer a routed request.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: &Request) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, request: &Request) -> HandlerResult {
        self(request)
    }
}
