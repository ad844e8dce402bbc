//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, one task per session)
//!     → connection.rs (receive, classify, connect out, relay)
//!     → tls.rs (origin handshake, downgrade tunnels only)
//!
//! Session states:
//!     Receiving → Classified → Connecting
//!         → {PlainForward | TunnelEstablishing} → Relaying → Closed
//! ```
//!
//! # Design Decisions
//! - One task per connection for its whole lifetime; no shared mutable
//!   state between sessions
//! - TLS happens only toward the origin; the client side is always plaintext

pub mod connection;
pub mod listener;
pub mod tls;
