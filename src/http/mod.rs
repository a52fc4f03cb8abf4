//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → reader.rs (timeout-bounded chunk reads)
//!     → framer.rs (head/body boundaries, body completion)
//!     → validator.rs (method, body headers, size, version)
//!     → routing::RouteTable (handler + path parameters)
//!     → dispatcher.rs (invoke handler, map errors and panics)
//!     → response.rs (serialize, single send)
//! ```

pub mod dispatcher;
pub mod error;
pub mod framer;
pub mod handler;
pub mod method;
pub mod reader;
pub mod request;
pub mod response;
pub mod server;
pub mod validator;

pub use error::HttpError;
pub use framer::{FramedRequest, FramingLimits};
pub use handler::{Handler, HandlerError, HandlerResult};
pub use method::Method;
pub use request::{Request, X_REQUEST_ID};
pub use response::Response;
pub use server::{serve_connection, HttpServer};
