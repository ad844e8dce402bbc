//! OS signal handling.
//!
//! Interrupt stops the accept loop; in-flight sessions are left to finish
//! on their own.

/// Wait for an interrupt (Ctrl+C / SIGINT).
pub async fn wait_for_interrupt() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Interrupt received");
}
