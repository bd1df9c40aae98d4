//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Resolve a request path to its content source
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan; route files are small
//! - A path matching several patterns resolves to the first one declared
//! - Patterns match the raw path; bound values are percent-decoded afterwards,
//!   so an encoded `/` never splits a segment

use serde::Serialize;
use serde_json::{Map, Value};

use super::matcher::{substitute, Params, Pattern};
use super::{RouteError, RouteResult};

/// A compiled route: pattern plus the content source it renders.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: Pattern,
    pub content_source: String,
}

/// The outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    /// Pattern string that matched.
    pub pattern: String,
    /// Content source identifier with bound parameters substituted.
    pub content_source: String,
    /// Named parameters extracted from the path.
    pub path_params: Params,
}

/// Ordered, immutable route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table from `(pattern, content source)` pairs, keeping their order.
    pub fn new<I, P, S>(entries: I) -> RouteResult<Self>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<str>,
        S: Into<String>,
    {
        let routes = entries
            .into_iter()
            .map(|(pattern, source)| {
                Ok(Route {
                    pattern: Pattern::parse(pattern.as_ref())?,
                    content_source: source.into(),
                })
            })
            .collect::<RouteResult<Vec<_>>>()?;
        Ok(Self { routes })
    }

    /// Parse a route file: a JSON object whose key order is the match priority.
    pub fn from_json_str(json: &str) -> RouteResult<Self> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(map.len());
        for (pattern, source) in map {
            match source {
                Value::String(source) => entries.push((pattern, source)),
                _ => return Err(RouteError::NonStringSource { pattern }),
            }
        }
        Self::new(entries)
    }

    /// Resolve `path` against the table. First declared match wins.
    pub fn resolve(&self, path: &str) -> RouteResult<RouteMatch> {
        for route in &self.routes {
            if let Some(raw) = route.pattern.matches(path) {
                let path_params: Params = raw
                    .into_iter()
                    .map(|(name, value)| (name, decode(value)))
                    .collect();
                let content_source = substitute(&route.content_source, &path_params);
                tracing::debug!(
                    path = %path,
                    pattern = %route.pattern,
                    content_source = %content_source,
                    "Route matched"
                );
                return Ok(RouteMatch {
                    pattern: route.pattern.as_str().to_string(),
                    content_source,
                    path_params,
                });
            }
        }

        Err(RouteError::NoMatch {
            path: path.to_string(),
            routes: self.routes.len(),
        })
    }

    /// Routes in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Percent-decode a bound value, keeping it raw if it is not valid UTF-8.
fn decode(value: String) -> String {
    match urlencoding::decode(&value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value,
    }
}
