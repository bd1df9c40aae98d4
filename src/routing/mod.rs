//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route file (JSON object, pattern → content source)
//!     → router.rs (compile patterns in declaration order)
//!     → Freeze as immutable RouteTable
//!
//! Incoming path
//!     → router.rs (ordered scan)
//!     → matcher.rs (token match, bind parameters)
//!     → Return: RouteMatch or NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order, no specificity ranking)
//! - Explicit NoMatch rather than silent default

pub mod matcher;
pub mod router;

use thiserror::Error;

pub use matcher::{Params, Pattern, WILDCARD_PARAM};
pub use router::{Route, RouteMatch, RouteTable};

/// Errors raised while building or consulting the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    /// No declared pattern matches the requested path.
    #[error("No matching URL found for {path} ({routes} routes declared)")]
    NoMatch { path: String, routes: usize },

    /// A pattern string could not be compiled.
    #[error("Invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The route file is not a JSON object.
    #[error("Invalid route table: {0}")]
    Parse(#[from] serde_json::Error),

    /// A pattern maps to something other than a path string.
    #[error("Route `{pattern}` must map to a content source path string")]
    NonStringSource { pattern: String },
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
