//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, span, query parsing)
//!     → [routing resolves content source]
//!     → [render dispatcher builds the page]
//!     → response.rs (HTML or JSON error)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{ErrorBody, HandlerError, HTML_CONTENT_TYPE};
pub use server::{AppState, HttpServer};
