use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use render_gateway::config;
use render_gateway::lifecycle::startup::build_dispatcher;
use render_gateway::render::RenderRequest;
use render_gateway::routing::Params;

#[derive(Parser)]
#[command(name = "render-cli")]
#[command(about = "Resolve and render pages locally, without the HTTP server", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "RENDER_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory relative project candidates are resolved against.
    #[arg(short, long)]
    base: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in match priority order
    Routes,
    /// Show which content source a path resolves to
    Resolve { path: String },
    /// Render a path and print the HTML
    Render {
        path: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load_or_default(cli.config.as_deref())?;
    let base = match cli.base {
        Some(base) => base,
        None => std::env::current_dir()?,
    };

    let dispatcher = build_dispatcher(&config, &base)?;
    let routes = &dispatcher.site().routes;

    match cli.command {
        Commands::Routes => {
            let listing: Vec<_> = routes
                .iter()
                .map(|route| json!({"pattern": route.pattern.as_str(), "source": route.content_source}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Commands::Resolve { path } => {
            let route = routes.resolve(&path)?;
            println!("{}", serde_json::to_string_pretty(&route)?);
        }
        Commands::Render { path, query } => {
            let route = routes.resolve(&path)?;
            let query: Params = query.into_iter().collect();
            let html = dispatcher.render(RenderRequest::new(route, query)).await?;
            println!("{html}");
        }
    }

    Ok(())
}
