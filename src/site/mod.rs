//! Site (project) subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     candidate dirs
//!     → locate.rs (first existing directory)
//!     → loader.rs (route file + precompiled collections)
//!     → Site (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Everything is read once; requests never touch the route file again
//! - The project root is carried explicitly, the process cwd is never changed

pub mod loader;
pub mod locate;

use std::path::PathBuf;

use thiserror::Error;

use crate::routing::RouteError;

pub use loader::Site;
pub use locate::locate_project_root;

/// Errors raised while discovering or loading the project.
#[derive(Debug, Error)]
pub enum SiteError {
    /// None of the candidate directories exists.
    #[error("Couldn't find the project directory. Searched: {}", join_paths(.searched))]
    ProjectRootNotFound { searched: Vec<PathBuf> },

    /// A project file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A project file is not valid JSON.
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The route file parsed but declares an invalid route.
    #[error("Invalid routes in {}: {source}", .path.display())]
    Routes { path: PathBuf, source: RouteError },
}

/// Result type for site operations.
pub type SiteResult<T> = Result<T, SiteError>;

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
