use std::sync::{Arc, Mutex};

use tokio::signal;
use tracing::{error, info};

use signalrelay::config::load_config;
use signalrelay::lifecycle::{Lifecycle, enforce_max_lifetime};
use signalrelay::relay::Relay;
use signalrelay::transport::websocket::{ServerState, start_server};
use signalrelay::utils::error::RelayError;
use signalrelay::utils::logging;

#[tokio::main]
async fn main() {
    logging::init("info");

    if let Err(e) = run().await {
        error!("relay failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), RelayError> {
    let config = load_config()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let relay = Arc::new(Mutex::new(Relay::new()));
    let lifecycle = Arc::new(Lifecycle::new(config.lifecycle.persistent));
    if !lifecycle.is_persistent() {
        info!("idle shutdown enabled, exiting when the last connection closes");
    }

    if let Some(limit) = config.lifecycle.max_lifetime() {
        tokio::spawn(enforce_max_lifetime(
            limit,
            relay.clone(),
            lifecycle.clone(),
        ));
    }
    tokio::spawn(handle_signals(relay.clone(), lifecycle.clone()));

    let state = ServerState {
        relay,
        lifecycle,
        liveness: config.liveness.to_policy(),
    };
    start_server(&addr, state).await?;

    info!("relay stopped");
    Ok(())
}

/// Bridges process signals into the lifecycle: either signal force-closes
/// every connection and fires the shutdown.
async fn handle_signals(relay: Arc<Mutex<Relay>>, lifecycle: Arc<Lifecycle>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install terminate handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("interrupt received, shutting down"),
        _ = terminate => info!("terminate received, shutting down"),
    }

    relay.lock().unwrap().close_all();
    lifecycle.shutdown_now();
}
