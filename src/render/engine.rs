//! The generation engine capability.
//!
//! # Responsibilities
//! - Describe one scoped build (`BuildJob`)
//! - Define the engine contract: build → output set
//! - Hold the engine's in-memory output (`RenderOutputSet`)

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{RenderError, RenderResult};

/// A build restricted to a single content source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildJob {
    /// Project root; relative engine paths resolve against it.
    #[serde(skip)]
    pub project_root: PathBuf,
    /// Engine input directory.
    pub input_dir: PathBuf,
    /// The only content source to build.
    pub input_path: String,
    /// Engine configuration file.
    pub config_path: PathBuf,
    /// Request-scoped global data, keyed by namespace.
    pub global_data: Map<String, Value>,
    /// Precompiled collections snapshot, shared across requests.
    pub precompiled_collections: Arc<Value>,
}

/// One rendered item from an engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEntry {
    pub input_path: String,
    pub content: String,
}

impl OutputEntry {
    pub fn new(input_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            content: content.into(),
        }
    }
}

/// Everything an engine invocation produced, in engine order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutputSet {
    entries: Vec<OutputEntry>,
}

impl RenderOutputSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputEntry> {
        self.entries.iter()
    }

    /// Take the content produced for `content_source`.
    ///
    /// An empty set is reported as such before any lookup happens.
    pub fn into_content(self, content_source: &str) -> RenderResult<String> {
        if self.entries.is_empty() {
            return Err(RenderError::EmptyOutput);
        }

        let produced = self.entries.len();
        self.entries
            .into_iter()
            .find(|entry| entry.input_path == content_source)
            .map(|entry| entry.content)
            .ok_or_else(|| RenderError::ContentNotFound {
                content_source: content_source.to_string(),
                produced,
            })
    }
}

impl From<Vec<OutputEntry>> for RenderOutputSet {
    fn from(entries: Vec<OutputEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<OutputEntry> for RenderOutputSet {
    fn from_iter<I: IntoIterator<Item = OutputEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Failures reported by an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not be constructed or started.
    #[error("{0}")]
    Init(String),

    /// The engine ran but did not complete the build.
    #[error("{0}")]
    Build(String),
}

/// Future returned by [`Engine::build`].
pub type BuildFuture<'a> = BoxFuture<'a, Result<RenderOutputSet, EngineError>>;

/// An external site generator able to build a subset of sources in memory.
pub trait Engine: Send + Sync {
    /// Build the job's content source and return everything produced.
    fn build(&self, job: BuildJob) -> BuildFuture<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_content_finds_entry() {
        let output: RenderOutputSet = vec![
            OutputEntry::new("index.md", "<p>home</p>"),
            OutputEntry::new("authors/smithdotuk.md", "<p>author</p>"),
        ]
        .into();
        assert_eq!(
            output.into_content("authors/smithdotuk.md").unwrap(),
            "<p>author</p>"
        );
    }

    #[test]
    fn test_into_content_empty_output() {
        let output = RenderOutputSet::default();
        assert!(matches!(
            output.into_content("index.md"),
            Err(RenderError::EmptyOutput)
        ));
    }

    #[test]
    fn test_into_content_missing_entry() {
        let output: RenderOutputSet = [OutputEntry::new("other.md", "x")].into_iter().collect();
        match output.into_content("index.md") {
            Err(RenderError::ContentNotFound { content_source, produced }) => {
                assert_eq!(content_source, "index.md");
                assert_eq!(produced, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_output_entry_wire_format() {
        let entries: Vec<OutputEntry> = serde_json::from_str(
            r#"[{"inputPath": "a.md", "content": "<p>a</p>", "url": "/a/"}]"#,
        )
        .unwrap();
        assert_eq!(entries, vec![OutputEntry::new("a.md", "<p>a</p>")]);
    }
}
