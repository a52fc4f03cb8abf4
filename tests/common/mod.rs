//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use rawroute::{HttpServer, RouteTable, ServerConfig, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

/// Start a server on an ephemeral port.
pub async fn spawn_server(routes: RouteTable) -> TestServer {
    spawn_server_with(ServerConfig::default(), routes).await
}

pub async fn spawn_server_with(config: ServerConfig, routes: RouteTable) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();

    let server = HttpServer::new(config, routes);
    let handle = tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    TestServer { addr, shutdown, handle }
}

/// A parsed raw response.
#[derive(Debug)]
pub struct RawResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn status(&self) -> u16 {
        self.status_line
            .split(' ')
            .nth(1)
            .and_then(|code| code.parse().ok())
            .unwrap_or(0)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub fn parse_response(raw: &str) -> RawResponse {
    let (head, body) = raw.split_once("\r\n\r\n").expect("response has no blank line");
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default().to_string();
    let headers = lines
        .filter_map(|line| line.split_once(": "))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    RawResponse {
        status_line,
        headers,
        body: body.to_string(),
    }
}

/// Write `chunks` with a pause between each, then read until the server closes.
pub async fn send_chunks(addr: SocketAddr, chunks: &[&[u8]], pause: Duration) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(pause).await;
        }
        stream.write_all(chunk).await.unwrap();
    }
    read_to_close(&mut stream).await
}

pub async fn send_raw(addr: SocketAddr, raw: &[u8]) -> RawResponse {
    send_chunks(addr, &[raw], Duration::ZERO).await
}

pub async fn read_to_close(stream: &mut TcpStream) -> RawResponse {
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out))
        .await
        .expect("server did not close the connection")
        .unwrap();
    parse_response(&String::from_utf8(out).unwrap())
}
