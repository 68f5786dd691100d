use std::future::Future;
use std::io;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use thermoview::api::{self, AppState};
use thermoview::config::Config;
use thermoview::live::spawn_poller;
use thermoview::store::{MemoryStore, ReadingStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log)?)
        .init();

    let store: Arc<dyn ReadingStore> = Arc::new(MemoryStore::new(config.setpoint()?));
    let state = AppState::new(Arc::clone(&store), config.csv_options());

    let cancel = CancellationToken::new();
    let poller = spawn_poller(
        store,
        Arc::clone(&state.live),
        config.refresh_interval(),
        cancel.clone(),
    );

    let listener = TcpListener::bind(config.listen).await?;
    info!(addr = %config.listen, "thermoview listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await?;

    cancel.cancel();
    poller.await?;

    Ok(())
}

/// Resolves once `signal` fires. A signal listener that fails to install is logged and treated
/// as a request to stop.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(err) = signal.await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
