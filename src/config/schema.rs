//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration for the render gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where the project lives and which artifacts it ships.
    pub site: SiteConfig,

    /// External generation engine invocation.
    pub engine: EngineConfig,

    /// HTTP response behaviour.
    pub http: HttpConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Project layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Candidate project directories, checked in order. First existing wins.
    pub candidate_dirs: Vec<String>,

    /// Engine input directory, relative to the project root.
    pub input_dir: String,

    /// Engine configuration file, relative to the project root.
    pub config_file: String,

    /// Route declaration file (JSON), relative to the project root.
    pub routes_file: String,

    /// Precompiled collections artifact (JSON), relative to the project root.
    /// An empty string turns the snapshot off (`null`).
    #[serde(deserialize_with = "empty_as_none")]
    pub collections_file: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            candidate_dirs: vec![
                "functions/render".to_string(),
                "/var/task/src/functions/render".to_string(),
            ],
            input_dir: "src".to_string(),
            config_file: "eleventy.config.js".to_string(),
            routes_file: "map.json".to_string(),
            collections_file: Some("serverless-collections.json".to_string()),
        }
    }
}

/// TOML has no null, so an empty string stands for "not set".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|file| !file.is_empty()))
}

/// External engine command.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Program to execute for each render.
    pub program: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// Extra environment variables for the engine process.
    pub env: BTreeMap<String, String>,

    /// Namespaced global data key under which `{query, path}` is registered.
    pub global_data_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            args: vec!["render.js".to_string()],
            env: BTreeMap::new(),
            global_data_key: "eleventy.serverless".to_string(),
        }
    }
}

/// HTTP response behaviour.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Answer unmatched paths with 404 instead of the uniform 500.
    pub unmatched_status_404: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds. 0 leaves invocation lifetime to the host.
    pub request_secs: u64,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
