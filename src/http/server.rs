//! HTTP server over raw TCP sockets.
//!
//! # Responsibilities
//! - Accept connections and hand each one to its own task
//! - Frame one request per connection, route it, write one response
//! - Close the connection after the response
//! - Drain in-flight connections on shutdown
//!
//! # Design Decisions
//! - No keep-alive: every connection carries exactly one exchange
//! - Each task loads the current route snapshot once, so a swap never
//!   affects a request already in progress
//! - Framing failures still produce a JSON response before closing

use std::io;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::http::dispatcher::dispatch;
use crate::http::error::HttpError;
use crate::http::framer::{read_request, FramedRequest, FramingLimits};
use crate::http::method::Method;
use crate::http::reader::ByteReader;
use crate::http::request::{split_target, Request, X_REQUEST_ID};
use crate::http::response::{write_response, Response};
use crate::http::validator;
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::{RouteTable, SharedRoutes};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// HTTP server bound to a route table.
pub struct HttpServer {
    config: ServerConfig,
    routes: SharedRoutes,
    tracker: ConnectionTracker,
}

impl HttpServer {
    pub fn new(config: ServerConfig, routes: RouteTable) -> Self {
        Self {
            config,
            routes: routes.into_shared(),
            tracker: ConnectionTracker::new(),
        }
    }

    /// Handle to the live route table.
    pub fn routes(&self) -> SharedRoutes {
        self.routes.clone()
    }

    /// Publish a new route table. Requests already in flight keep the old one.
    pub fn replace_routes(&self, routes: RouteTable) {
        tracing::info!(routes = routes.len(), "Route table replaced");
        self.routes.store(std::sync::Arc::new(routes));
    }

    /// Connections currently being served.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Run the accept loop until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let listener = Listener::from_tcp(listener, self.config.listener.max_connections)?;
        let limits = FramingLimits::from(&self.config.framing);

        tracing::info!(
            address = ?listener.local_addr().ok(),
            routes = self.routes.load().len(),
            "HTTP server starting"
        );

        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = listener.accept() => accepted,
            };

            let (stream, peer_addr, permit) = match accepted {
                Ok(conn) => conn,
                Err(ListenerError::Closed) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let guard = self.tracker.track();
            let routes = self.routes.load_full();
            let limits = limits.clone();

            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = serve_connection(stream, &routes, &limits).await {
                    tracing::debug!(
                        connection_id = %guard.id(),
                        peer_addr = %peer_addr,
                        error = %e,
                        "Connection ended with I/O error"
                    );
                }
                drop(guard);
            });
        }

        let drain = Duration::from_secs(self.config.shutdown.drain_timeout_secs);
        let in_flight = self.tracker.active_count();
        if in_flight > 0 {
            tracing::info!(in_flight, drain_secs = drain.as_secs(), "Draining connections");
        }

        if tokio::time::timeout(drain, self.tracker.wait_for_idle()).await.is_err() {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Drain timeout elapsed, abandoning connections"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve exactly one request on `stream`, then shut the write side down.
///
/// A peer that disconnects without sending anything gets no response.
pub async fn serve_connection<S>(stream: S, routes: &RouteTable, limits: &FramingLimits) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let mut reader = ByteReader::new(stream, limits.read_timeout);

    let (method, path, mut response) = match read_request(&mut reader, limits).await {
        Ok(None) => {
            tracing::debug!(request_id = %request_id, "Peer closed before sending a request");
            return Ok(());
        }
        Ok(Some(framed)) => {
            let method = framed.method.as_str().to_string();
            let path = framed.target.clone();
            let is_head = framed.method == Method::Head;
            let mut response = route_request(routes, framed, request_id);
            if is_head {
                response = response.head_only();
            }
            (method, path, response)
        }
        Err(err) => ("-".to_string(), "-".to_string(), reject(err, request_id)),
    };

    response = response.with_header(X_REQUEST_ID, request_id.to_string());
    let status = response.status();

    let stream = reader.get_mut();
    write_response(stream, &response).await?;
    stream.shutdown().await?;

    if status.is_success() {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
    } else {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request failed"
        );
    }
    metrics::record_request(&method, status.as_u16(), start);

    Ok(())
}

/// Resolve a framed request and run its handler.
pub fn route_request(routes: &RouteTable, framed: FramedRequest, request_id: Uuid) -> Response {
    let (path, query_params) = split_target(&framed.target);

    let resolved = match validator::check_route(routes.resolve(path, framed.method)) {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::debug!(
                request_id = %request_id,
                method = %framed.method,
                path = %path,
                "No route matched"
            );
            return err.into_response();
        }
    };

    let request = Request::builder()
        .id(request_id)
        .method(framed.method)
        .path(path)
        .path_params(resolved.params)
        .query_params(query_params)
        .body(framed.body)
        .build();

    dispatch(resolved.handler, &request)
}

fn reject(err: HttpError, request_id: Uuid) -> Response {
    tracing::debug!(request_id = %request_id, error = %err, "Rejected request");
    err.into_response()
}
