//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use render_gateway::config::ServiceConfig;
use render_gateway::http::HttpServer;
use render_gateway::lifecycle::Shutdown;
use render_gateway::render::{
    BuildFuture, BuildJob, Engine, EngineError, OutputEntry, RenderDispatcher, RenderOutputSet,
};
use render_gateway::routing::RouteTable;
use render_gateway::site::Site;
use serde_json::Value;
use tokio::net::TcpListener;

/// Engine that returns a fixed output set and counts its builds.
pub struct StubEngine {
    entries: Vec<OutputEntry>,
    builds: AtomicUsize,
}

impl StubEngine {
    pub fn new(entries: Vec<OutputEntry>) -> Arc<Self> {
        Arc::new(Self {
            entries,
            builds: AtomicUsize::new(0),
        })
    }

    #[allow(dead_code)]
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl Engine for StubEngine {
    fn build(&self, _job: BuildJob) -> BuildFuture<'_> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let output: RenderOutputSet = self.entries.clone().into();
        async move { Ok::<_, EngineError>(output) }.boxed()
    }
}

/// Start a gateway on an ephemeral port in front of `engine`.
pub async fn start_gateway(
    routes: &[(&str, &str)],
    engine: Arc<dyn Engine>,
    config: ServiceConfig,
) -> (SocketAddr, Shutdown) {
    let site = Site {
        root: PathBuf::from("/srv/site"),
        input_dir: PathBuf::from("/srv/site/src"),
        config_path: PathBuf::from("/srv/site/eleventy.config.js"),
        routes: RouteTable::new(routes.iter().copied()).unwrap(),
        collections: Arc::new(Value::Null),
    };
    let dispatcher = RenderDispatcher::new(engine, Arc::new(site), config.engine.global_data_key.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(dispatcher));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// HTTP client that never goes through a proxy or reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
