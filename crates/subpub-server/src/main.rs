//! SubPub Server - topic publish/subscribe over HTTP
//!
//! This is the main entry point for the SubPub server.

use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use subpub_core::{Broker, SubPub};
use subpub_server::shutdown::shutdown_signal;
use subpub_server::{create_router, AppState, Args, ServerConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subpub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e.into()),
    }

    // Parse command line args
    let args = Args::parse();
    let config = ServerConfig::from(&args);

    // Create broker
    let broker: Arc<dyn SubPub<Bytes>> =
        Arc::new(Broker::<Bytes>::with_config(config.broker.clone()));

    // Create router
    let app = create_router(AppState::new(Arc::clone(&broker)));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

    info!(
        addr = %listener.local_addr()?,
        max_concurrent_deliveries = config.broker.max_concurrent_deliveries,
        "SubPub server listening"
    );
    info!("Swagger UI: http://{}/swagger-ui/", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(broker, config.shutdown_timeout))
        .await?;

    info!("SubPub server stopped");
    Ok(())
}
