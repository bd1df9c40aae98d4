//! Full stack against a real project directory and an external engine process.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use render_gateway::config::ServiceConfig;
use render_gateway::http::{ErrorBody, HttpServer};
use render_gateway::lifecycle::startup::build_dispatcher;
use render_gateway::lifecycle::Shutdown;
use render_gateway::site::SiteError;
use serde_json::Value;
use tokio::net::TcpListener;

mod common;

/// Lay out `<base>/functions/render` the way a deployment bundle does.
fn write_project(base: &Path) {
    let root = base.join("functions/render");
    fs::create_dir_all(root.join("src/authors")).unwrap();
    fs::write(
        root.join("map.json"),
        r#"{
            "/authors/:handle/": "authors/:handle.md",
            "/broken/": "broken.md"
        }"#,
    )
    .unwrap();
    fs::write(root.join("serverless-collections.json"), r#"{"authors": ["smithdotuk"]}"#).unwrap();
}

fn config(script: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.engine.program = "sh".into();
    config.engine.args = vec!["-c".into(), script.into()];
    config
}

async fn serve(config: ServiceConfig, base: &Path) -> (std::net::SocketAddr, Shutdown) {
    let dispatcher = build_dispatcher(&config, base).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(dispatcher));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

#[tokio::test]
async fn test_engine_process_renders_page() {
    let base = tempfile::tempdir().unwrap();
    write_project(base.path());

    let script = r#"cat > job.json
printf '[{"inputPath":"authors/smithdotuk.md","content":"<h1>smithdotuk</h1>"}]'"#;
    let (addr, shutdown) = serve(config(script), base.path()).await;

    let res = common::client()
        .get(format!("http://{}/authors/smithdotuk/?tab=posts", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "<h1>smithdotuk</h1>");

    // The engine ran inside the project root and received the scoped job.
    let job: Value = serde_json::from_str(
        &fs::read_to_string(base.path().join("functions/render/job.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(job["inputPath"], "authors/smithdotuk.md");
    assert_eq!(job["globalData"]["eleventy.serverless"]["path"]["handle"], "smithdotuk");
    assert_eq!(job["globalData"]["eleventy.serverless"]["query"]["tab"], "posts");
    assert_eq!(job["precompiledCollections"]["authors"][0], "smithdotuk");

    shutdown.trigger();
}

#[tokio::test]
async fn test_engine_failure_is_json_500() {
    let base = tempfile::tempdir().unwrap();
    write_project(base.path());

    let (addr, shutdown) = serve(config("cat > /dev/null; echo 'layout missing' >&2; exit 1"), base.path()).await;

    let res = common::client()
        .get(format!("http://{}/broken/", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    let body: ErrorBody = res.json().await.unwrap();
    assert!(body.error.contains("layout missing"), "got: {}", body.error);

    shutdown.trigger();
}

#[test]
fn test_missing_project_root_fails_startup() {
    let base = tempfile::tempdir().unwrap();
    match build_dispatcher(&ServiceConfig::default(), base.path()) {
        Err(SiteError::ProjectRootNotFound { searched }) => assert_eq!(searched.len(), 2),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("startup should fail without a project root"),
    }
}
