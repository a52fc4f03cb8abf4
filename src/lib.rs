//! rawroute: a minimal HTTP/1.1 server on raw TCP sockets.
//!
//! Requests are framed by hand from the socket, validated, matched against a
//! table of route templates with integer path parameters, and answered with
//! JSON. One request per connection.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub mod api;

pub use crate::config::schema::ServerConfig;
pub use crate::http::{HttpServer, Request, Response};
pub use crate::lifecycle::Shutdown;
pub use crate::routing::RouteTable;
