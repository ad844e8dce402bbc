//! HTTPS-downgrade forward proxy for legacy HTTP clients.
//!
//! Accepts plaintext HTTP requests and HTTPS tunnel requests (CONNECT)
//! from a client that cannot negotiate modern TLS, carries the TLS leg to
//! the origin itself, and rewrites `https://` references in transited
//! content to `http://` so the client never needs TLS support.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────────┐
//!                  │                 DOWNGRADE PROXY                    │
//!                  │                                                    │
//!  Legacy client   │  ┌──────────┐   ┌────────────┐   ┌─────────────┐  │
//!  ────────────────┼─▶│   net    │──▶│    http    │──▶│     net     │  │
//!   (plain HTTP/   │  │ listener │   │ interpreter│   │ connect+tls │──┼──▶ Origin
//!    CONNECT)      │  └──────────┘   └────────────┘   └──────┬──────┘  │   (HTTP or
//!                  │                                         │         │    HTTPS)
//!                  │                 ┌────────────┐   ┌──────▼──────┐  │
//!  ◀───────────────┼─────────────────│  rewriter  │◀──│    relay    │◀─┼────
//!                  │                 └────────────┘   └─────────────┘  │
//!                  │                                                    │
//!                  │  ┌──────────────────────────────────────────────┐ │
//!                  │  │  config (fixed constants)  lifecycle  logging │ │
//!                  │  └──────────────────────────────────────────────┘ │
//!                  └───────────────────────────────────────────────────┘
//! ```
//!
//! One task per accepted connection; a session shares nothing mutable with
//! any other session.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod relay;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use lifecycle::Shutdown;
pub use net::listener::Listener;
