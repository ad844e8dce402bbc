//! Bidirectional relay between two established streams.
//!
//! # Data Flow
//! ```text
//! client stream ──read──▶ ContentRewriter ──write──▶ origin stream
//! origin stream ──read──▶ ContentRewriter ──write──▶ client stream
//! ```
//!
//! # Design Decisions
//! - Pure byte pump: no HTTP framing or protocol awareness
//! - Per-direction ordering is preserved; there is no ordering guarantee
//!   between the two directions (none is needed)
//! - A slow reader stalls the opposite direction's forwarding; blocking
//!   writes are the only backpressure mechanism
//! - EOF, an I/O error, or an idle period on both sides ends the session

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::RelayConfig;

pub mod rewrite;

pub use rewrite::ContentRewriter;

/// Which side produced the chunk.
enum Readable {
    ClientToOrigin(io::Result<usize>),
    OriginToClient(io::Result<usize>),
}

/// Pump bytes both directions until either side reaches EOF, an I/O error
/// occurs, or neither side produces data within the idle timeout.
///
/// Every chunk passes through the rewriter before being forwarded. Returns
/// `Ok(())` on EOF or idle expiry; both streams are dropped by the caller
/// as a unit regardless of the outcome.
pub async fn run<C, O>(
    client: C,
    origin: O,
    rewriter: &ContentRewriter,
    config: &RelayConfig,
) -> io::Result<()>
where
    C: AsyncRead + AsyncWrite + Unpin,
    O: AsyncRead + AsyncWrite + Unpin,
{
    let idle = Duration::from_secs(config.idle_timeout_secs);
    let (mut client_rd, mut client_wr) = tokio::io::split(client);
    let (mut origin_rd, mut origin_wr) = tokio::io::split(origin);
    let mut client_buf = vec![0u8; config.buffer_size];
    let mut origin_buf = vec![0u8; config.buffer_size];

    loop {
        let readable = tokio::time::timeout(idle, async {
            tokio::select! {
                r = client_rd.read(&mut client_buf) => Readable::ClientToOrigin(r),
                r = origin_rd.read(&mut origin_buf) => Readable::OriginToClient(r),
            }
        })
        .await;

        match readable {
            // Idle timeout: neither side was readable for the whole window.
            Err(_) => {
                tracing::debug!(idle_secs = config.idle_timeout_secs, "Relay idle, closing");
                return Ok(());
            }
            Ok(Readable::ClientToOrigin(read)) => {
                let n = read?;
                if n == 0 {
                    return Ok(());
                }
                origin_wr.write_all(&rewriter.apply(&client_buf[..n])).await?;
            }
            Ok(Readable::OriginToClient(read)) => {
                let n = read?;
                if n == 0 {
                    return Ok(());
                }
                client_wr.write_all(&rewriter.apply(&origin_buf[..n])).await?;
            }
        }
    }
}
