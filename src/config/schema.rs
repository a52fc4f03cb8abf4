//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Request framing limits and read timeouts.
    pub framing: FramingConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_connections: 1024,
        }
    }
}

/// Limits applied while reading one request off the socket.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FramingConfig {
    /// Size of each read while looking for the end of the head.
    pub initial_read_size: usize,

    /// Bounded wait per read during the head phase, in milliseconds.
    pub read_timeout_ms: u64,

    /// Bounded wait per read while completing a body, in milliseconds.
    pub body_read_timeout_ms: u64,

    /// Largest accepted request line plus headers, in bytes.
    pub max_head_size: usize,

    /// Largest accepted Content-Length, in bytes.
    pub max_body_size: usize,

    /// Additional reads allowed while completing a body.
    pub max_body_reads: usize,

    /// Overall budget for completing a body, in milliseconds.
    pub body_deadline_ms: u64,

    /// Overall budget for receiving the request head, in milliseconds.
    pub head_deadline_ms: u64,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            initial_read_size: 256,
            read_timeout_ms: 100,
            body_read_timeout_ms: 100,
            max_head_size: 8192,
            max_body_size: 1_000_000,
            max_body_reads: 64,
            body_deadline_ms: 5000,
            head_deadline_ms: 5000,
        }
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long to wait for in-flight connections after the stop signal.
    pub drain_timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
