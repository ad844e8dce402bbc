//! TCP listener and accept loop.
//!
//! # Responsibilities
//! - Bind to the configured address with address reuse and a bounded backlog
//! - Accept incoming connections and spawn one task per session
//! - Log and skip accept errors; stop cleanly on the shutdown signal
//!
//! There is no cap on concurrently active sessions; the OS is the only
//! limit. Accepted scaling limitation, not to be fixed silently.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::broadcast;

use crate::config::ProxyConfig;
use crate::net::connection::{ConnectionHandler, ConnectionId, SessionError};

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind(std::io::Error),
    /// Failed to accept connection.
    Accept(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
            ListenerError::Accept(e) => write!(f, "Failed to accept: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// Accepts client connections and dispatches each to its own session task.
pub struct Listener {
    inner: TcpListener,
    handler: Arc<ConnectionHandler>,
}

impl Listener {
    /// Bind to the configured address with `SO_REUSEADDR` and the
    /// configured accept backlog.
    pub async fn bind(config: Arc<ProxyConfig>) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config.listener.bind_address.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ListenerError::Bind)?;
        socket.set_reuseaddr(true).map_err(ListenerError::Bind)?;
        socket.bind(addr).map_err(ListenerError::Bind)?;

        let listener = socket
            .listen(config.listener.backlog)
            .map_err(ListenerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            backlog = config.listener.backlog,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            handler: Arc::new(ConnectionHandler::new(config)),
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Accept connections until the shutdown signal fires.
    ///
    /// Accept errors are logged and looped past; a session's failure never
    /// reaches this loop.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                accepted = self.inner.accept() => match accepted {
                    Ok((stream, addr)) => self.dispatch(stream, addr),
                    Err(e) => {
                        tracing::warn!(error = %ListenerError::Accept(e), "Accept failed");
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        let id = ConnectionId::new();
        tracing::debug!(connection_id = %id, peer_addr = %addr, "Connection accepted");

        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            match handler.handle(stream, id).await {
                Ok(()) => tracing::debug!(connection_id = %id, "Session finished"),
                Err(SessionError::EmptyRequest) => {
                    tracing::debug!(connection_id = %id, "Client sent no data")
                }
                Err(e) => tracing::warn!(connection_id = %id, error = %e, "Session aborted"),
            }
        });
    }
}
