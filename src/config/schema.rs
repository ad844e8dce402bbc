//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! There is no config file, environment lookup, or CLI flag: every tunable
//! is a fixed constant surfaced through the `Default` impls, and the process
//! constructs one `ProxyConfig` at startup and shares it immutably.

use serde::{Deserialize, Serialize};

/// Root configuration for the downgrade proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, accept backlog).
    pub listener: ListenerConfig,

    /// Initial-request receive settings.
    pub receive: ReceiveConfig,

    /// Relay loop settings.
    pub relay: RelayConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Accept backlog passed to listen(2).
    pub backlog: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            backlog: 10,
        }
    }
}

/// Settings for receiving the initial request from the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReceiveConfig {
    /// Read buffer size in bytes. A read shorter than this ends the receive.
    pub buffer_size: usize,

    /// Maximum number of failed reads before giving up on the request.
    pub max_tries: u32,

    /// Delay between failed reads in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            max_tries: 3,
            retry_delay_ms: 100,
        }
    }
}

/// Settings for the bidirectional relay loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Per-direction read buffer size in bytes.
    pub buffer_size: usize,

    /// Seconds without readable data on either side before the session ends.
    pub idle_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            idle_timeout_secs: 60,
        }
    }
}
