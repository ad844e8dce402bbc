//! HTTP layer: request interpretation.
//!
//! # Data Flow
//! ```text
//! first received chunk
//!     → request.rs (parse request line, extract host/port/path)
//!     → classification (direct-forward vs downgrade-tunnel)
//!     → bytes to send to the origin
//! ```
//!
//! # Design Decisions
//! - String-splitting parser over the first chunk only; no streaming HTTP
//!   state machine. The proxy never inspects anything past session setup.

pub mod request;

pub use request::ParsedRequest;
pub use request::RequestError;
pub use request::SessionKind;
