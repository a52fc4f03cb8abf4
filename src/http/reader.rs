//! Timeout-bounded incremental reads.
//!
//! # Responsibilities
//! - Own the connection stream for the duration of one request
//! - Issue single reads bounded by a per-call timeout
//! - Report peer close separately from "nothing arrived yet"
//!
//! # Design Decisions
//! - An empty chunk means "no more data for now"; callers proceed with what is buffered
//! - Timeouts are not errors; transport errors are treated as a close
//! - Timeout overrides are scoped: the previous value is restored when the guard drops

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Reads bounded chunks from a stream.
#[derive(Debug)]
pub struct ByteReader<S> {
    stream: S,
    read_timeout: Duration,
    reads: usize,
    closed: bool,
}

impl<S> ByteReader<S> {
    pub fn new(stream: S, read_timeout: Duration) -> Self {
        Self {
            stream,
            read_timeout,
            reads: 0,
            closed: false,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Number of reads issued on the stream so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// True once the peer closed the stream or a read failed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Override the read timeout until the returned guard is dropped.
    pub fn scoped_timeout(&mut self, timeout: Duration) -> ScopedTimeout<'_, S> {
        let previous = std::mem::replace(&mut self.read_timeout, timeout);
        ScopedTimeout {
            reader: self,
            previous,
        }
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: AsyncRead + Unpin> ByteReader<S> {
    /// Read at most `max_bytes`, waiting no longer than the read timeout.
    ///
    /// Returns an empty chunk on timeout, on peer close, or on a read error.
    pub async fn receive_chunk(&mut self, max_bytes: usize) -> Vec<u8> {
        if self.closed || max_bytes == 0 {
            return Vec::new();
        }

        let mut chunk = vec![0u8; max_bytes];
        self.reads += 1;

        match tokio::time::timeout(self.read_timeout, self.stream.read(&mut chunk)).await {
            Ok(Ok(0)) => {
                tracing::trace!(reads = self.reads, "Peer closed stream");
                self.closed = true;
                Vec::new()
            }
            Ok(Ok(n)) => {
                chunk.truncate(n);
                chunk
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Read failed, treating as close");
                self.closed = true;
                Vec::new()
            }
            Err(_) => {
                tracing::trace!(timeout = ?self.read_timeout, "Read timed out");
                Vec::new()
            }
        }
    }
}

/// Restores the reader's previous timeout on drop.
#[derive(Debug)]
pub struct ScopedTimeout<'a, S> {
    reader: &'a mut ByteReader<S>,
    previous: Duration,
}

impl<S> Deref for ScopedTimeout<'_, S> {
    type Target = ByteReader<S>;

    fn deref(&self) -> &Self::Target {
        self.reader
    }
}

impl<S> DerefMut for ScopedTimeout<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.reader
    }
}

impl<S> Drop for ScopedTimeout<'_, S> {
    fn drop(&mut self) {
        self.reader.read_timeout = self.previous;
    }
}
