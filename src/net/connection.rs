//! Per-connection session handling.
//!
//! # Responsibilities
//! - Receive the initial request with bounded retries
//! - Run it through the request interpreter
//! - Connect to the origin, with a TLS handshake for downgrade tunnels
//! - Relay bytes until either side closes or the session idles out
//!
//! ```text
//! Session states:
//!     Receiving → Classified → Connecting
//!         → {PlainForward | TunnelEstablishing} → Relaying → Closed
//! ```
//!
//! A session owns both sockets; dropping the handler closes them as a unit.
//! Failures never propagate beyond the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::ProxyConfig;
use crate::http::request::{ParsedRequest, RequestError, SessionKind};
use crate::net::tls::OriginTlsConnector;
use crate::relay::{self, ContentRewriter};

/// Synthetic tunnel acknowledgement, written to the client before the
/// origin side of a downgrade tunnel is ready.
const TUNNEL_ESTABLISHED: &[u8] = b"HTTP/1.1 200 Connection established\r\n\r\n";

/// Global atomic counter for connection IDs.
/// Relaxed ordering is sufficient since we only need uniqueness.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection, used in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Error type covering everything that can end a session early.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Client connected but sent no data.
    #[error("client sent no data")]
    EmptyRequest,

    /// The initial request could not be interpreted.
    #[error("request parsing failed: {0}")]
    Request(#[from] RequestError),

    /// Transport failure on either side.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The origin refused or failed the TLS handshake. No plaintext
    /// fallback is attempted.
    #[error("origin TLS handshake failed: {0}")]
    Tls(std::io::Error),
}

/// Handles one client connection end-to-end.
///
/// Shared across sessions; holds only immutable configuration, the rewrite
/// rule set, and the TLS connector.
pub struct ConnectionHandler {
    config: Arc<ProxyConfig>,
    rewriter: ContentRewriter,
    tls: OriginTlsConnector,
}

impl ConnectionHandler {
    pub fn new(config: Arc<ProxyConfig>) -> Self {
        Self {
            config,
            rewriter: ContentRewriter::new(),
            tls: OriginTlsConnector::new(),
        }
    }

    /// Drive one client connection from first read to teardown.
    pub async fn handle(&self, mut client: TcpStream, id: ConnectionId) -> Result<(), SessionError> {
        // Receiving
        let request = self.receive_request(&mut client).await;
        if request.is_empty() {
            return Err(SessionError::EmptyRequest);
        }

        // Classified
        let parsed = ParsedRequest::parse(&request)?;
        tracing::debug!(
            connection_id = %id,
            host = %parsed.host,
            port = parsed.port,
            kind = ?parsed.kind,
            "Request classified"
        );

        // Connecting
        let origin = TcpStream::connect((parsed.host.as_str(), parsed.port)).await?;

        match parsed.kind {
            SessionKind::DowngradeTunnel => {
                // The client expects the tunnel acknowledgement before any
                // payload, handshake outcome notwithstanding.
                client.write_all(TUNNEL_ESTABLISHED).await?;

                let mut origin = self
                    .tls
                    .handshake(&parsed.host, origin)
                    .await
                    .map_err(SessionError::Tls)?;
                origin.write_all(&parsed.origin_bytes).await?;

                relay::run(client, origin, &self.rewriter, &self.config.relay).await?;
            }
            SessionKind::DirectForward => {
                let mut origin = origin;
                origin.write_all(&parsed.origin_bytes).await?;

                relay::run(client, origin, &self.rewriter, &self.config.relay).await?;
            }
        }

        Ok(())
    }

    /// Read the initial request into a growing buffer.
    ///
    /// A short read or EOF ends the receive; a failed read is retried up to
    /// `max_tries` times with a small delay, as the original proxy did.
    async fn receive_request(&self, client: &mut TcpStream) -> Vec<u8> {
        let cfg = &self.config.receive;
        let mut data = Vec::new();
        let mut buf = vec![0u8; cfg.buffer_size];
        let mut tries = 0;

        while tries < cfg.max_tries {
            match client.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    data.extend_from_slice(&buf[..n]);
                    if n < cfg.buffer_size {
                        break;
                    }
                }
                Err(e) => {
                    tries += 1;
                    tracing::trace!(error = %e, tries, "Initial read failed, retrying");
                    tokio::time::sleep(Duration::from_millis(cfg.retry_delay_ms)).await;
                }
            }
        }

        data
    }
}
