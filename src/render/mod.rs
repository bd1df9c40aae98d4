//! Render dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RouteMatch + query params
//!     → RenderRequest
//!     → dispatcher.rs (build job scoped to one content source)
//!     → engine.rs (Engine::build → RenderOutputSet)
//!     → dispatcher.rs (pick the entry for the content source)
//!     → rendered HTML
//! ```
//!
//! # Design Decisions
//! - The engine is a capability with one operation; the dispatcher knows nothing else
//! - All-or-nothing: either the requested page or an error, never partial output
//! - No retries; every engine failure is terminal for the request

pub mod command;
pub mod dispatcher;
pub mod engine;

use thiserror::Error;

pub use command::CommandEngine;
pub use dispatcher::{RenderDispatcher, RenderRequest};
pub use engine::{BuildFuture, BuildJob, Engine, EngineError, OutputEntry, RenderOutputSet};

/// Errors that can occur while rendering a content source.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The engine could not be constructed or initialized.
    #[error("Engine initialization failed for {content_source}: {reason}")]
    EngineInit {
        content_source: String,
        reason: String,
    },

    /// The engine started but the build failed.
    #[error("Engine build failed for {content_source}: {reason}")]
    EngineBuild {
        content_source: String,
        reason: String,
    },

    /// The engine produced no output at all.
    #[error("Couldn't find any generated output from the engine")]
    EmptyOutput,

    /// The engine produced output, but none for the requested source.
    #[error("Couldn't find any matching output from the engine for {content_source} ({produced} entries produced)")]
    ContentNotFound {
        content_source: String,
        produced: usize,
    },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
