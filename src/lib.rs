//! On-demand page render gateway.
//!
//! Resolves a request path against a declared route table and asks an
//! external site generator to render that single page.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod site;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use render::{Engine, RenderDispatcher};
pub use routing::RouteTable;
