//! Configuration subsystem.
//!
//! # Design Decisions
//! - All tunables are fixed constants expressed as `Default` impls; there is
//!   no config file, environment variable, or CLI surface
//! - The config is built once at startup and shared via `Arc` to all
//!   subsystems; nothing mutates it afterwards

pub mod schema;

pub use schema::ListenerConfig;
pub use schema::ProxyConfig;
pub use schema::ReceiveConfig;
pub use schema::RelayConfig;
