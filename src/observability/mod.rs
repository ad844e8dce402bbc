//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via the tracing crate; connection IDs tie a
//!   session's log lines together
//! - No metrics or tracing exporters; stdout logs are the only surface

pub mod logging;
