//! Response representation and wire serialization.
//!
//! # Responsibilities
//! - Hold the status and structured JSON body produced by a handler or a rejection
//! - Serialize status line, headers, blank line and body
//! - Write the whole response with a single send
//!
//! # Design Decisions
//! - Every response is JSON: `Content-Type: application/json; encoding=utf8`
//! - `Content-Length` and `Connection: close` are always emitted (one request per connection)
//! - Responses to HEAD keep the `Content-Length` of the body they leave out
//! - No chunked or streaming output

use http::StatusCode;
use serde_json::{json, Value};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Protocol token written on every status line.
pub const PROTOCOL: &str = "HTTP/1.1";

/// Content type emitted on every response.
pub const CONTENT_TYPE_JSON: &str = "application/json; encoding=utf8";

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    omit_body: bool,
}

impl Response {
    /// Empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
            omit_body: false,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Some(body),
            omit_body: false,
        }
    }

    /// `{"message": ...}` body, the shape used by every error path.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "message": message.into() }))
    }

    /// Append an extra header line.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serialize headers only, as the answer to a HEAD request.
    pub fn head_only(mut self) -> Self {
        self.omit_body = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Serialize the full response as it goes on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.body.as_ref().map(Value::to_string).unwrap_or_default();

        let mut out = format!(
            "{} {} {}\r\n",
            PROTOCOL,
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown")
        );
        out.push_str(&format!("Content-Type: {CONTENT_TYPE_JSON}\r\n"));
        out.push_str(&format!("Content-Length: {}\r\n", body.len()));
        out.push_str("Connection: close\r\n");
        for (name, value) in &self.headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str("\r\n");
        if !self.omit_body {
            out.push_str(&body);
        }
        out.into_bytes()
    }
}

/// Write `response` to `stream` in one `write_all` and flush.
pub async fn write_response<W>(stream: &mut W, response: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = response.to_bytes();
    stream.write_all(&bytes).await?;
    stream.flush().await
}
