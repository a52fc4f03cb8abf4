//! Request framing.
//!
//! # Data Flow
//! ```text
//! ByteReader
//!     → head phase: initial-size chunks until the blank line (or nothing more arrives)
//!     → parse request line + scan Content-Type / Content-Length
//!     → validator: method, Content-Length, Content-Type, size
//!     → body phase: reads for exactly the missing byte count until Content-Length is met
//!     → validator: protocol version
//!     → FramedRequest
//! ```
//!
//! # Design Decisions
//! - No fixed frame size: the head grows chunk by chunk up to `max_head_size`
//!   or until `head_deadline` elapses
//! - An empty read ends the head phase; whatever is buffered is the head
//! - Body completion is bounded by a read count and a wall-clock deadline
//! - Bytes past Content-Length are dropped (no pipelining)

use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::time::Instant;

use crate::config::FramingConfig;
use crate::http::error::HttpError;
use crate::http::method::Method;
use crate::http::reader::ByteReader;
use crate::http::validator;

/// Limits applied while framing one request.
#[derive(Debug, Clone)]
pub struct FramingLimits {
    /// Size of each head-phase read.
    pub initial_read_size: usize,
    /// Per-read timeout during the head phase.
    pub read_timeout: Duration,
    /// Per-read timeout during body completion.
    pub body_read_timeout: Duration,
    pub max_head_size: usize,
    pub max_body_size: usize,
    /// Additional reads allowed while completing a body.
    pub max_body_reads: usize,
    /// Wall-clock budget for body completion.
    pub body_deadline: Duration,
    /// Wall-clock budget for the head phase.
    pub head_deadline: Duration,
}

impl Default for FramingLimits {
    fn default() -> Self {
        Self::from(&FramingConfig::default())
    }
}

impl From<&FramingConfig> for FramingLimits {
    fn from(config: &FramingConfig) -> Self {
        Self {
            initial_read_size: config.initial_read_size,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            body_read_timeout: Duration::from_millis(config.body_read_timeout_ms),
            max_head_size: config.max_head_size,
            max_body_size: config.max_body_size,
            max_body_reads: config.max_body_reads,
            body_deadline: Duration::from_millis(config.body_deadline_ms),
            head_deadline: Duration::from_millis(config.head_deadline_ms),
        }
    }
}

/// Request line and the two headers the server cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version: String,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
}

/// A fully framed and validated request, ready for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedRequest {
    pub method: Method,
    /// Path plus optional query string.
    pub target: String,
    pub version: String,
    pub body: String,
}

/// Read and validate one request from `reader`.
///
/// Returns `Ok(None)` when the peer sent nothing at all.
pub async fn read_request<S>(
    reader: &mut ByteReader<S>,
    limits: &FramingLimits,
) -> Result<Option<FramedRequest>, HttpError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(limits.initial_read_size);
    let deadline = Instant::now() + limits.head_deadline;

    let (head_end, body_start) = loop {
        if let Some(bounds) = find_head_end(&buf) {
            break bounds;
        }
        if buf.len() > limits.max_head_size {
            return Err(HttpError::HeadTooLarge {
                limit: limits.max_head_size,
            });
        }
        if Instant::now() >= deadline {
            tracing::warn!(
                received = buf.len(),
                reads = reader.reads(),
                "Gave up waiting for request head"
            );
            return Err(HttpError::HeadTimeout);
        }

        let chunk = reader.receive_chunk(limits.initial_read_size).await;
        if chunk.is_empty() {
            if buf.is_empty() {
                return Ok(None);
            }
            break (buf.len(), buf.len());
        }
        buf.extend_from_slice(&chunk);
    };

    if head_end > limits.max_head_size {
        return Err(HttpError::HeadTooLarge {
            limit: limits.max_head_size,
        });
    }

    let head_text = std::str::from_utf8(&buf[..head_end]).map_err(|_| HttpError::InvalidHeadEncoding)?;
    let head = parse_head(head_text)?;

    tracing::trace!(
        method = %head.method,
        target = %head.target,
        reads = reader.reads(),
        "Request head framed"
    );

    let method = validator::check_method(&head.method)?;

    let body = match validator::check_body_headers(method, &head, limits.max_body_size)? {
        Some(expected) => {
            let mut body = buf.split_off(body_start);
            complete_body(reader, &mut body, expected, limits).await?;
            body.truncate(expected);
            String::from_utf8(body).map_err(|_| HttpError::InvalidBodyEncoding)?
        }
        None => String::new(),
    };

    validator::check_version(&head.version)?;

    Ok(Some(FramedRequest {
        method,
        target: head.target,
        version: head.version,
        body,
    }))
}

/// Keep reading until `body` holds `expected` bytes or a bound is hit.
async fn complete_body<S>(
    reader: &mut ByteReader<S>,
    body: &mut Vec<u8>,
    expected: usize,
    limits: &FramingLimits,
) -> Result<(), HttpError>
where
    S: AsyncRead + Unpin,
{
    let deadline = Instant::now() + limits.body_deadline;
    let mut reader = reader.scoped_timeout(limits.body_read_timeout);
    let mut attempts = 0;

    while body.len() < expected {
        if attempts >= limits.max_body_reads || Instant::now() >= deadline {
            tracing::warn!(
                received = body.len(),
                expected,
                attempts,
                "Gave up waiting for request body"
            );
            return Err(HttpError::BodyTimeout);
        }
        attempts += 1;

        let chunk = reader.receive_chunk(expected - body.len()).await;
        if chunk.is_empty() && reader.is_closed() {
            return Err(HttpError::IncompleteBody);
        }
        body.extend_from_slice(&chunk);
    }

    Ok(())
}

/// Locate the blank line ending the head.
///
/// Returns `(head_end, body_start)`; accepts `\r\n\r\n` and bare `\n\n`.
pub fn find_head_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, i + 4));
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| (i, i + 2));

    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Parse the request line and scan the headers.
pub fn parse_head(head: &str) -> Result<RequestHead, HttpError> {
    let mut lines = head.split('\n').map(|l| l.trim_end_matches('\r'));

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split(' ');
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v), None) if !m.is_empty() && !t.is_empty() && !v.is_empty() => (m, t, v),
        _ => return Err(HttpError::MalformedRequestLine),
    };

    let mut content_type = None;
    let mut content_length = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        } else if name.eq_ignore_ascii_case("content-length") {
            content_length = Some(value.trim().to_string());
        }
    }

    Ok(RequestHead {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
        content_type,
        content_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Serves scripted chunks and records the size of every read request.
    struct ScriptedStream {
        chunks: VecDeque<Vec<u8>>,
        requested: Arc<Mutex<Vec<usize>>>,
    }

    impl ScriptedStream {
        fn new(chunks: &[&[u8]]) -> (Self, Arc<Mutex<Vec<usize>>>) {
            let requested = Arc::new(Mutex::new(Vec::new()));
            let stream = Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
                requested: Arc::clone(&requested),
            };
            (stream, requested)
        }
    }

    impl AsyncRead for ScriptedStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            self.requested.lock().unwrap().push(buf.remaining());
            if let Some(mut chunk) = self.chunks.pop_front() {
                let n = chunk.len().min(buf.remaining());
                buf.put_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.chunks.push_front(chunk.split_off(n));
                }
            }
            Poll::Ready(Ok(()))
        }
    }

    fn limits() -> FramingLimits {
        FramingLimits {
            read_timeout: Duration::from_millis(20),
            body_read_timeout: Duration::from_millis(20),
            ..FramingLimits::default()
        }
    }

    async fn frame(chunks: &[&[u8]]) -> (Result<Option<FramedRequest>, HttpError>, Vec<usize>) {
        let (stream, requested) = ScriptedStream::new(chunks);
        let mut reader = ByteReader::new(stream, Duration::from_millis(20));
        let result = read_request(&mut reader, &limits()).await;
        let requested = requested.lock().unwrap().clone();
        (result, requested)
    }

    #[tokio::test]
    async fn body_in_first_read_needs_one_read() {
        let data: &[u8] = b"POST /foo HTTP/1.1\r\nHost: localhost:8000\r\nContent-Type: application/json\r\n\
                     Content-Length: 20\r\n\r\n{\"message\": \"hello\"}";
        let (result, requested) = frame(&[data]).await;

        let framed = result.unwrap().unwrap();
        assert_eq!(framed.method, Method::Post);
        assert_eq!(framed.target, "/foo");
        assert_eq!(framed.body, r#"{"message": "hello"}"#);
        assert_eq!(requested, vec![256]);
    }

    #[tokio::test]
    async fn second_read_asks_for_the_missing_bytes() {
        let body1 = r#"{"message": "hello", "name": "test", "#;
        let body2 = r#""age": 30, "my_list": [1, 2, 3]}"#;
        let head = format!(
            "POST /foo HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
            body1.len() + body2.len()
        );
        let first = format!("{head}{body1}");

        let (result, requested) = frame(&[first.as_bytes(), body2.as_bytes()]).await;

        let framed = result.unwrap().unwrap();
        assert_eq!(framed.body, format!("{body1}{body2}"));
        assert_eq!(requested, vec![256, body2.len()]);
    }

    #[tokio::test]
    async fn body_assembled_across_many_reads() {
        let body = "x".repeat(700);
        let head = format!(
            "PUT /items/1 HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
            body.len()
        );
        let wire = format!("{head}{body}");
        let pieces: Vec<&[u8]> = wire.as_bytes().chunks(97).collect();

        let (result, _) = frame(&pieces).await;
        assert_eq!(result.unwrap().unwrap().body, body);
    }

    #[tokio::test]
    async fn head_spanning_several_initial_reads() {
        let padding = "a".repeat(300);
        let wire = format!("GET /foo HTTP/1.1\r\nX-Padding: {padding}\r\n\r\n");
        let (result, requested) = frame(&[wire.as_bytes()]).await;

        let framed = result.unwrap().unwrap();
        assert_eq!(framed.target, "/foo");
        assert!(framed.body.is_empty());
        assert_eq!(requested, vec![256, 256]);
    }

    #[tokio::test]
    async fn missing_content_length() {
        let data: &[u8] = b"POST /foo HTTP/1.1\r\nHost: localhost:8000\r\nAccept: */*\r\nContent-Type: \
                     application/json\r\n\r\n{\"message\": \"hello\"}";
        let (result, _) = frame(&[data]).await;
        assert_eq!(result.unwrap_err(), HttpError::LengthRequired);
    }

    #[tokio::test]
    async fn missing_content_type() {
        let data: &[u8] = b"POST /foo HTTP/1.1\r\nHost: localhost:8000\r\nContent-Length: 20\r\n\r\n{\"message\": \"hello\"}";
        let (result, _) = frame(&[data]).await;
        assert_eq!(result.unwrap_err(), HttpError::UnsupportedMediaType);
    }

    #[tokio::test]
    async fn version_checked_after_body_rules() {
        let data: &[u8] = b"POST /foo HTTP/2\r\nContent-Length: 2\r\n\r\n{}";
        let (result, _) = frame(&[data]).await;
        assert_eq!(result.unwrap_err(), HttpError::UnsupportedMediaType);

        let data: &[u8] = b"GET /foo HTTP/2\r\nHost: localhost:8000\r\n\r\n";
        let (result, _) = frame(&[data]).await;
        assert_eq!(
            result.unwrap_err(),
            HttpError::VersionNotSupported { version: "HTTP/2".into() }
        );
    }

    #[tokio::test]
    async fn oversized_body_rejected_before_reading_it() {
        let data: &[u8] = b"POST /foo HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 1000001\r\n\r\n";
        let (result, requested) = frame(&[data]).await;
        assert_eq!(result.unwrap_err(), HttpError::PayloadTooLarge { limit: 1_000_000 });
        assert_eq!(requested.len(), 1);
    }

    #[tokio::test]
    async fn peer_closing_mid_body() {
        let data: &[u8] = b"POST /foo HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 50\r\n\r\n{\"a\":";
        let (result, _) = frame(&[data]).await;
        assert_eq!(result.unwrap_err(), HttpError::IncompleteBody);
    }

    #[tokio::test]
    async fn body_reads_are_bounded() {
        let (mut client, server) = tokio::io::duplex(1024);
        tokio::io::AsyncWriteExt::write_all(
            &mut client,
            b"POST /foo HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 50\r\n\r\n{",
        )
        .await
        .unwrap();

        let limits = FramingLimits {
            max_body_reads: 3,
            ..limits()
        };
        let mut reader = ByteReader::new(server, limits.read_timeout);
        let result = read_request(&mut reader, &limits).await;

        assert_eq!(result.unwrap_err(), HttpError::BodyTimeout);
        assert_eq!(reader.reads(), 4);
        assert_eq!(reader.read_timeout(), limits.read_timeout);
        drop(client);
    }

    #[tokio::test(start_paused = true)]
    async fn body_deadline_applies_below_the_read_cap() {
        let (mut client, server) = tokio::io::duplex(1024);
        tokio::io::AsyncWriteExt::write_all(
            &mut client,
            b"POST /foo HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 50\r\n\r\n{",
        )
        .await
        .unwrap();

        let limits = FramingLimits {
            max_body_reads: 10_000,
            body_read_timeout: Duration::from_millis(20),
            body_deadline: Duration::from_millis(50),
            ..limits()
        };
        let mut reader = ByteReader::new(server, limits.read_timeout);
        let result = read_request(&mut reader, &limits).await;

        assert_eq!(result.unwrap_err(), HttpError::BodyTimeout);
        // One head read, then body reads at 0, 20 and 40ms.
        assert_eq!(reader.reads(), 4);
        drop(client);
    }

    #[tokio::test(start_paused = true)]
    async fn trickled_head_hits_the_deadline() {
        use tokio::io::AsyncWriteExt;

        let (mut client, server) = tokio::io::duplex(1024);
        let writer = tokio::spawn(async move {
            client.write_all(b"GET /foo HTTP/1.1\r\n").await.unwrap();
            loop {
                if client.write_all(b"X").await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(90)).await;
            }
        });

        let limits = FramingLimits {
            read_timeout: Duration::from_millis(100),
            head_deadline: Duration::from_millis(500),
            ..limits()
        };
        let mut reader = ByteReader::new(server, limits.read_timeout);
        let result = read_request(&mut reader, &limits).await;

        assert_eq!(result.unwrap_err(), HttpError::HeadTimeout);
        assert!(reader.reads() < 10, "reads = {}", reader.reads());
        drop(reader);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn silent_peer_yields_no_request() {
        let (result, requested) = frame(&[]).await;
        assert_eq!(result.unwrap(), None);
        assert_eq!(requested, vec![256]);
    }

    #[tokio::test]
    async fn head_without_blank_line_is_used_as_is() {
        let (result, _) = frame(&[b"GET /foo?x=1 HTTP/1.1\r\nHost: a".as_slice()]).await;
        let framed = result.unwrap().unwrap();
        assert_eq!(framed.target, "/foo?x=1");
        assert_eq!(framed.version, "HTTP/1.1");
    }

    #[tokio::test]
    async fn head_limit() {
        let wire = format!("GET /foo HTTP/1.1\r\nX-Big: {}\r\n\r\n", "b".repeat(9000));
        let (result, _) = frame(&[wire.as_bytes()]).await;
        assert_eq!(result.unwrap_err(), HttpError::HeadTooLarge { limit: 8192 });
    }

    #[tokio::test]
    async fn extra_bytes_past_content_length_are_dropped() {
        let data: &[u8] = b"PATCH /foo HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}garbage";
        let (result, _) = frame(&[data]).await;
        assert_eq!(result.unwrap().unwrap().body, "{}");
    }

    #[tokio::test]
    async fn unknown_method() {
        let (result, _) = frame(&[b"BREW /pot HTTP/1.1\r\n\r\n".as_slice()]).await;
        assert_eq!(
            result.unwrap_err(),
            HttpError::UnsupportedMethod { method: "BREW".into() }
        );
    }

    #[test]
    fn parses_request_line_and_headers() {
        let head = parse_head(
            "POST /foo/3?x=1 HTTP/1.1\r\ncontent-type: application/json\r\nCONTENT-LENGTH:  12 \r\nAccept: */*",
        )
        .unwrap();
        assert_eq!(head.method, "POST");
        assert_eq!(head.target, "/foo/3?x=1");
        assert_eq!(head.version, "HTTP/1.1");
        assert_eq!(head.content_type.as_deref(), Some("application/json"));
        assert_eq!(head.content_length.as_deref(), Some("12"));
    }

    #[test]
    fn malformed_request_lines() {
        for line in ["GET /foo", "GET  /foo HTTP/1.1", "GET /foo HTTP/1.1 extra", ""] {
            assert_eq!(parse_head(line).unwrap_err(), HttpError::MalformedRequestLine, "{line:?}");
        }
    }

    #[test]
    fn head_terminators() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n\r\nbody"), Some((14, 18)));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\n\nbody"), Some((14, 16)));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n"), None);
    }
}
