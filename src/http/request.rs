//! Routed request representation.
//!
//! # Responsibilities
//! - Split the request target into path and raw query parameters
//! - Carry the bound path parameters and the raw body to the handler
//! - Tag every request with a unique ID for tracing
//!
//! # Design Decisions
//! - Built once after framing and routing; immutable afterwards
//! - Query parameters stay raw (`key=value` or bare tokens), in arrival order
//! - The body stays a string; handlers decode JSON on demand

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::http::handler::HandlerError;
use crate::http::method::Method;

/// Header carrying the request ID on responses.
pub const X_REQUEST_ID: &str = "X-Request-Id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: Uuid,
    method: Method,
    path: String,
    path_params: Vec<i64>,
    query_params: Vec<String>,
    body: String,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Integer path parameters in path order.
    pub fn path_params(&self) -> &[i64] {
        &self.path_params
    }

    pub fn param(&self, index: usize) -> Option<i64> {
        self.path_params.get(index).copied()
    }

    pub fn query_params(&self) -> &[String] {
        &self.query_params
    }

    /// Value of the first `key=value` query parameter named `key`.
    /// A bare `key` token yields an empty value.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_params.iter().find_map(|param| match param.split_once('=') {
            Some((k, v)) if k == key => Some(v),
            None if param == key => Some(""),
            _ => None,
        })
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON; failures become a 400 handler error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_str(&self.body)
            .map_err(|e| HandlerError::bad_request(format!("Request body is not valid JSON: {e}")))
    }
}

/// Split a request target into its path and raw query parameters.
pub fn split_target(target: &str) -> (&str, Vec<String>) {
    match target.split_once('?') {
        Some((path, query)) => (
            path,
            query
                .split('&')
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        None => (target, Vec::new()),
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    id: Uuid,
    method: Method,
    path: String,
    path_params: Vec<i64>,
    query_params: Vec<String>,
    body: String,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            method: Method::Get,
            path: "/".to_string(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            body: String::new(),
        }
    }
}

impl RequestBuilder {
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn path_params(mut self, params: Vec<i64>) -> Self {
        self.path_params = params;
        self
    }

    pub fn query_params(mut self, params: Vec<String>) -> Self {
        self.query_params = params;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        Request {
            id: self.id,
            method: self.method,
            path: self.path,
            path_params: self.path_params,
            query_params: self.query_params,
            body: self.body,
        }
    }
}
