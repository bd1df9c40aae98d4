//! Loads the route table and precompiled collections for a project root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::{locate_project_root, SiteError, SiteResult};
use crate::config::SiteConfig;
use crate::routing::RouteTable;

/// Everything a render needs that does not change between requests.
#[derive(Debug, Clone)]
pub struct Site {
    /// Project root directory.
    pub root: PathBuf,
    /// Engine input directory.
    pub input_dir: PathBuf,
    /// Engine configuration file.
    pub config_path: PathBuf,
    /// Ordered route table.
    pub routes: RouteTable,
    /// Precompiled collections snapshot (`null` when not configured).
    pub collections: Arc<Value>,
}

impl Site {
    /// Locate the project root among the configured candidates and load it.
    pub fn discover(base: &Path, config: &SiteConfig) -> SiteResult<Self> {
        let root = locate_project_root(base, &config.candidate_dirs)?;
        Self::load(root, config)
    }

    /// Load the project rooted at `root`.
    pub fn load(root: PathBuf, config: &SiteConfig) -> SiteResult<Self> {
        let routes_path = root.join(&config.routes_file);
        let routes = RouteTable::from_json_str(&read(&routes_path)?).map_err(|source| {
            SiteError::Routes {
                path: routes_path.clone(),
                source,
            }
        })?;

        let collections = match &config.collections_file {
            Some(file) => {
                let path = root.join(file);
                serde_json::from_str(&read(&path)?)
                    .map_err(|source| SiteError::Parse { path, source })?
            }
            None => Value::Null,
        };

        let site = Self {
            input_dir: root.join(&config.input_dir),
            config_path: root.join(&config.config_file),
            root,
            routes,
            collections: Arc::new(collections),
        };

        tracing::info!(
            project_root = %site.root.display(),
            input_dir = %site.input_dir.display(),
            config_path = %site.config_path.display(),
            routes = site.routes.len(),
            "Site loaded"
        );

        Ok(site)
    }
}

fn read(path: &Path) -> SiteResult<String> {
    fs::read_to_string(path).map_err(|source| SiteError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(routes: &str, collections: Option<&str>) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("map.json"), routes).unwrap();
        if let Some(collections) = collections {
            fs::write(dir.path().join("serverless-collections.json"), collections).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_project() {
        let dir = project(
            r#"{"/authors/:handle/": "authors/:handle.md"}"#,
            Some(r#"{"authors": ["smithdotuk"]}"#),
        );

        let site = Site::load(dir.path().to_path_buf(), &SiteConfig::default()).unwrap();
        assert_eq!(site.routes.len(), 1);
        assert_eq!(site.input_dir, dir.path().join("src"));
        assert_eq!(site.config_path, dir.path().join("eleventy.config.js"));
        assert_eq!(site.collections["authors"][0], "smithdotuk");
    }

    #[test]
    fn test_collections_optional() {
        let dir = project("{}", None);
        let config = SiteConfig {
            collections_file: None,
            ..SiteConfig::default()
        };

        let site = Site::load(dir.path().to_path_buf(), &config).unwrap();
        assert!(site.routes.is_empty());
        assert!(site.collections.is_null());
    }

    #[test]
    fn test_missing_collections_file_fails() {
        let dir = project("{}", None);
        let err = Site::load(dir.path().to_path_buf(), &SiteConfig::default()).unwrap_err();
        assert!(matches!(err, SiteError::Read { .. }));
        assert!(err.to_string().contains("serverless-collections.json"));
    }

    #[test]
    fn test_bad_route_file() {
        let dir = project(r#"{"/a": 42}"#, Some("{}"));
        let err = Site::load(dir.path().to_path_buf(), &SiteConfig::default()).unwrap_err();
        assert!(matches!(err, SiteError::Routes { .. }));
    }

    #[test]
    fn test_discover_uses_candidates() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("functions/render");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("map.json"), r#"{"/": "index.md"}"#).unwrap();
        fs::write(root.join("serverless-collections.json"), "[]").unwrap();

        let site = Site::discover(base.path(), &SiteConfig::default()).unwrap();
        assert_eq!(site.root, root);
        assert_eq!(site.routes.resolve("/").unwrap().content_source, "index.md");
    }
}
