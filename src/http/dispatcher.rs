//! Handler dispatch.
//!
//! # Responsibilities
//! - Invoke the resolved handler with the routed request
//! - Map declared handler errors onto responses
//! - Contain handler panics
//!
//! # Design Decisions
//! - `Err(HandlerError)` keeps its status and message
//! - A panic becomes `500 {"message": "Internal server error"}`; the server keeps running

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use http::StatusCode;

use crate::http::handler::Handler;
use crate::http::request::Request;
use crate::http::response::Response;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Run `handler` against `request` and always produce a response.
pub fn dispatch(handler: &dyn Handler, request: &Request) -> Response {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.call(request))) {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            tracing::debug!(
                request_id = %request.id(),
                status = err.status.as_u16(),
                message = %err.message,
                "Handler returned an error"
            );
            err.into_response()
        }
        Err(payload) => {
            tracing::error!(
                request_id = %request.id(),
                method = %request.method(),
                path = %request.path(),
                panic = panic_message(payload.as_ref()),
                "Handler panicked"
            );
            Response::message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
