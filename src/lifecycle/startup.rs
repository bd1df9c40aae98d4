//! Startup orchestration.
//!
//! # Responsibilities
//! - Locate and load the site (route table, collections)
//! - Initialize the engine, dispatcher and metrics exporter
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::observability::metrics;
use crate::render::{CommandEngine, RenderDispatcher};
use crate::site::{Site, SiteError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Site(#[from] SiteError),

    #[error("Invalid address `{0}`")]
    Address(String),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the site found under `base` and wire it to the configured engine.
pub fn build_dispatcher(config: &ServiceConfig, base: &Path) -> Result<RenderDispatcher, SiteError> {
    let site = Site::discover(base, &config.site)?;
    let engine = CommandEngine::new(&config.engine);

    tracing::info!(
        program = %config.engine.program,
        global_data_key = %config.engine.global_data_key,
        "Engine configured"
    );

    Ok(RenderDispatcher::new(
        Arc::new(engine),
        Arc::new(site),
        config.engine.global_data_key.clone(),
    ))
}

/// Start every subsystem and serve until `shutdown` fires.
pub async fn run(
    config: ServiceConfig,
    base: &Path,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let dispatcher = build_dispatcher(&config, base)?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, Arc::new(dispatcher));
    server.run(listener, shutdown).await?;
    Ok(())
}
