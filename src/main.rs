//! Thin launcher: logging, fixed configuration, bind, run until interrupt.

use std::sync::Arc;

use downgrade_proxy::lifecycle::signals;
use downgrade_proxy::observability::logging;
use downgrade_proxy::{Listener, ProxyConfig, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("downgrade-proxy v0.1.0 starting");

    let config = Arc::new(ProxyConfig::default());
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backlog = config.listener.backlog,
        idle_timeout_secs = config.relay.idle_timeout_secs,
        "Configuration loaded"
    );

    let listener = Listener::bind(Arc::clone(&config)).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");
    tracing::info!(
        address = %local_addr,
        "Point the legacy browser's proxy settings at this address"
    );

    let shutdown = Shutdown::new();
    let accept_loop = tokio::spawn(listener.run(shutdown.subscribe()));

    signals::wait_for_interrupt().await;
    shutdown.trigger();
    accept_loop.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
