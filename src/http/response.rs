//! Response construction and error translation.
//!
//! # Responsibilities
//! - Wrap rendered HTML in a 200 response
//! - Map route and render errors to a JSON error body
//!
//! # Design Decisions
//! - Every failure is 500 with `{"error": message}`
//! - Unmatched paths may opt into 404 via `http.unmatched_status_404`
//! - No partial output: a failed render never returns HTML

use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::HttpConfig;
use crate::render::RenderError;
use crate::routing::RouteError;

/// Content type of rendered pages.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// JSON body returned on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Everything that can go wrong while handling one request.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Render did not finish within {}s", .0.as_secs())]
    Timeout(Duration),
}

impl HandlerError {
    /// Status code for this error under the given HTTP settings.
    pub fn status(&self, http: &HttpConfig) -> StatusCode {
        match self {
            HandlerError::Route(RouteError::NoMatch { .. }) if http.unmatched_status_404 => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Route(RouteError::NoMatch { .. }) => "no_match",
            HandlerError::Route(_) => "route",
            HandlerError::Render(RenderError::EngineInit { .. }) => "engine_init",
            HandlerError::Render(RenderError::EngineBuild { .. }) => "engine_build",
            HandlerError::Render(RenderError::EmptyOutput) => "empty_output",
            HandlerError::Render(RenderError::ContentNotFound { .. }) => "content_not_found",
            HandlerError::Timeout(_) => "timeout",
        }
    }

    /// Render this error as an HTTP response.
    pub fn into_response_with(self, http: &HttpConfig) -> Response {
        error_response(self.status(http), self.to_string())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        self.into_response_with(&HttpConfig::default())
    }
}

/// 200 response carrying a rendered page.
pub fn html_response(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response()
}

/// JSON error response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}
