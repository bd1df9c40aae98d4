//! Render gateway server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                RENDER GATEWAY                 │
//!                        │                                               │
//!     Client Request     │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!     ───────────────────┼─▶│  http   │───▶│ routing  │───▶│  render  │  │
//!                        │  │ server  │    │ resolver │    │dispatcher│  │
//!                        │  └─────────┘    └──────────┘    └────┬─────┘  │
//!                        │                                      │        │
//!     Client Response    │  ┌─────────┐                    ┌────▼─────┐  │
//!     ◀──────────────────┼──│response │◀───────────────────│  engine  │◀─┼── generator
//!                        │  └─────────┘                    └──────────┘  │   process
//!                        │                                               │
//!                        │  config · site · observability · lifecycle    │
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use render_gateway::config;
use render_gateway::lifecycle::{startup, Shutdown};
use render_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "render-gateway", version, about = "Render pages on demand through a site generator")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "RENDER_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        candidate_dirs = ?config.site.candidate_dirs,
        "render-gateway starting"
    );

    let shutdown = Shutdown::new();
    let base = std::env::current_dir()?;

    let run = startup::run(config, &base, shutdown.subscribe());
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => result?,
        _ = shutdown.trigger_on_signal() => run.await?,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
