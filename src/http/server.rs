//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the single render handler
//! - Wire up middleware (request ID, tracing)
//! - Bound each dispatch by the optional request timeout
//! - Bind server to listener, stop on the shutdown broadcast
//! - Dispatch requests: resolve route, render, translate errors

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::Uri,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{HttpConfig, ServiceConfig};
use crate::http::request::{parse_query, request_span, UuidRequestId};
use crate::http::response::{html_response, HandlerError};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::render::{RenderDispatcher, RenderRequest};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<RenderDispatcher>,
    pub http: HttpConfig,
    /// Upper bound on one dispatch; `None` leaves it to the host.
    pub request_timeout: Option<Duration>,
}

/// HTTP server in front of the render dispatcher.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, dispatcher: Arc<RenderDispatcher>) -> Self {
        let state = AppState {
            dispatcher,
            http: config.http.clone(),
            request_timeout: match config.timeouts.request_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(render_handler))
            .route("/", any(render_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Render handler: one endpoint for every path and method.
async fn render_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let start_time = Instant::now();
    let path = uri.path();

    let result = match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, dispatch(&state, path, uri.query()))
            .await
            .unwrap_or_else(|_| Err(HandlerError::Timeout(limit))),
        None => dispatch(&state, path, uri.query()).await,
    };

    match result {
        Ok(html) => {
            metrics::record_render(200, "ok", start_time);
            html_response(html)
        }
        Err(e) => {
            let status = e.status(&state.http);
            tracing::error!(path = %path, kind = e.kind(), error = %e, "Render failed");
            metrics::record_render(status.as_u16(), e.kind(), start_time);
            e.into_response_with(&state.http)
        }
    }
}

async fn dispatch(state: &AppState, path: &str, query: Option<&str>) -> Result<String, HandlerError> {
    let route = state.dispatcher.site().routes.resolve(path)?;
    tracing::debug!(
        pattern = %route.pattern,
        content_source = %route.content_source,
        path_params = ?route.path_params,
        "Route resolved"
    );

    let html = state
        .dispatcher
        .render(RenderRequest::new(route, parse_query(query)))
        .await?;
    Ok(html)
}
