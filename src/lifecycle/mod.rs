//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Init logging → Build config → Bind listener → Run accept loop
//!
//! Shutdown:
//!     SIGINT → Shutdown::trigger → accept loop exits
//!     (in-flight sessions finish independently)
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
