//! Single-page render dispatch.
//!
//! # Responsibilities
//! - Turn a resolved route into a build job for exactly one content source
//! - Inject path and query parameters as request-scoped global data
//! - Extract the requested page from the engine's output set
//!
//! # Design Decisions
//! - The project root travels inside the job; the process cwd is left alone
//! - Collections come from the startup snapshot, never rebuilt per request

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Map};

use super::engine::{BuildJob, Engine, EngineError};
use super::{RenderError, RenderResult};
use crate::routing::{Params, RouteMatch};
use crate::site::Site;

/// Everything needed to render one content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub content_source: String,
    pub path_params: Params,
    pub query_params: Params,
}

impl RenderRequest {
    /// Combine a route match with the request's query parameters.
    pub fn new(route: RouteMatch, query_params: Params) -> Self {
        Self {
            content_source: route.content_source,
            path_params: route.path_params,
            query_params,
        }
    }
}

/// Drives the engine for one content source per request.
pub struct RenderDispatcher {
    engine: Arc<dyn Engine>,
    site: Arc<Site>,
    global_data_key: String,
}

impl RenderDispatcher {
    pub fn new(engine: Arc<dyn Engine>, site: Arc<Site>, global_data_key: impl Into<String>) -> Self {
        Self {
            engine,
            site,
            global_data_key: global_data_key.into(),
        }
    }

    /// The site this dispatcher renders.
    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Render `request.content_source` and return its content.
    pub async fn render(&self, request: RenderRequest) -> RenderResult<String> {
        let start = Instant::now();
        let content_source = request.content_source.clone();
        let job = self.build_job(request);

        tracing::debug!(
            content_source = %content_source,
            input_dir = %job.input_dir.display(),
            "Invoking engine"
        );

        let output = self.engine.build(job).await.map_err(|e| match e {
            EngineError::Init(reason) => RenderError::EngineInit {
                content_source: content_source.clone(),
                reason,
            },
            EngineError::Build(reason) => RenderError::EngineBuild {
                content_source: content_source.clone(),
                reason,
            },
        })?;

        let produced = output.len();
        let content = output.into_content(&content_source)?;

        tracing::info!(
            content_source = %content_source,
            produced,
            bytes = content.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Content found"
        );
        Ok(content)
    }

    fn build_job(&self, request: RenderRequest) -> BuildJob {
        let mut global_data = Map::new();
        global_data.insert(
            self.global_data_key.clone(),
            json!({
                "query": request.query_params,
                "path": request.path_params,
            }),
        );

        BuildJob {
            project_root: self.site.root.clone(),
            input_dir: self.site.input_dir.clone(),
            input_path: request.content_source,
            config_path: self.site.config_path.clone(),
            global_data,
            precompiled_collections: Arc::clone(&self.site.collections),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BuildFuture, OutputEntry, RenderOutputSet};
    use crate::routing::RouteTable;
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Returns canned output and remembers the last job it saw.
    struct CannedEngine {
        result: fn() -> Result<RenderOutputSet, EngineError>,
        last_job: Mutex<Option<BuildJob>>,
    }

    impl CannedEngine {
        fn new(result: fn() -> Result<RenderOutputSet, EngineError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                last_job: Mutex::new(None),
            })
        }
    }

    impl Engine for CannedEngine {
        fn build(&self, job: BuildJob) -> BuildFuture<'_> {
            *self.last_job.lock().unwrap() = Some(job);
            let result = (self.result)();
            Box::pin(async move { result })
        }
    }

    fn site() -> Arc<Site> {
        Arc::new(Site {
            root: PathBuf::from("/srv/site"),
            input_dir: PathBuf::from("/srv/site/src"),
            config_path: PathBuf::from("/srv/site/eleventy.config.js"),
            routes: RouteTable::default(),
            collections: Arc::new(json!({"posts": [1, 2, 3]})),
        })
    }

    fn request(source: &str) -> RenderRequest {
        RenderRequest {
            content_source: source.to_string(),
            path_params: [("handle".to_string(), "smithdotuk".to_string())].into(),
            query_params: [("preview".to_string(), "1".to_string())].into(),
        }
    }

    #[tokio::test]
    async fn test_render_returns_matching_content() {
        let engine = CannedEngine::new(|| {
            Ok(vec![
                OutputEntry::new("index.md", "<p>home</p>"),
                OutputEntry::new("authors/smithdotuk.md", "<html>...</html>"),
            ]
            .into())
        });
        let dispatcher = RenderDispatcher::new(engine.clone(), site(), "eleventy.serverless");

        let html = dispatcher.render(request("authors/smithdotuk.md")).await.unwrap();
        assert_eq!(html, "<html>...</html>");
    }

    #[tokio::test]
    async fn test_job_carries_scope_and_global_data() {
        let engine = CannedEngine::new(|| Ok(vec![OutputEntry::new("a.md", "a")].into()));
        let dispatcher = RenderDispatcher::new(engine.clone(), site(), "eleventy.serverless");
        dispatcher.render(request("a.md")).await.unwrap();

        let job = engine.last_job.lock().unwrap().take().unwrap();
        assert_eq!(job.input_path, "a.md");
        assert_eq!(job.project_root, PathBuf::from("/srv/site"));
        assert_eq!(job.input_dir, PathBuf::from("/srv/site/src"));
        assert_eq!(
            Value::Object(job.global_data),
            json!({
                "eleventy.serverless": {
                    "query": {"preview": "1"},
                    "path": {"handle": "smithdotuk"}
                }
            })
        );
        assert_eq!(job.precompiled_collections["posts"][2], 3);
    }

    #[tokio::test]
    async fn test_empty_output() {
        let engine = CannedEngine::new(|| Ok(RenderOutputSet::default()));
        let dispatcher = RenderDispatcher::new(engine, site(), "k");
        assert!(matches!(
            dispatcher.render(request("a.md")).await,
            Err(RenderError::EmptyOutput)
        ));
    }

    #[tokio::test]
    async fn test_content_not_found() {
        let engine = CannedEngine::new(|| Ok(vec![OutputEntry::new("b.md", "b")].into()));
        let dispatcher = RenderDispatcher::new(engine, site(), "k");
        let err = dispatcher.render(request("a.md")).await.unwrap_err();
        assert!(matches!(err, RenderError::ContentNotFound { .. }));
        assert!(err.to_string().contains("a.md"));
    }

    #[tokio::test]
    async fn test_engine_failures_are_classified() {
        let init = CannedEngine::new(|| Err(EngineError::Init("no node".into())));
        let dispatcher = RenderDispatcher::new(init, site(), "k");
        assert!(matches!(
            dispatcher.render(request("a.md")).await,
            Err(RenderError::EngineInit { .. })
        ));

        let build = CannedEngine::new(|| Err(EngineError::Build("template error".into())));
        let dispatcher = RenderDispatcher::new(build, site(), "k");
        let err = dispatcher.render(request("a.md")).await.unwrap_err();
        assert!(matches!(err, RenderError::EngineBuild { .. }));
        assert!(err.to_string().contains("template error"));
    }

    #[test]
    fn test_request_from_route_match() {
        let table = RouteTable::new([("/authors/:handle/", "authors/:handle.md")]).unwrap();
        let route = table.resolve("/authors/smithdotuk/").unwrap();
        let req = RenderRequest::new(route, Params::new());
        assert_eq!(req.content_source, "authors/smithdotuk.md");
        assert_eq!(req.path_params.get("handle").map(String::as_str), Some("smithdotuk"));
    }
}
