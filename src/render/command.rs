//! Engine backed by an external generator process.
//!
//! # Protocol
//! ```text
//! stdin  ← BuildJob as one JSON document
//!          {inputDir, inputPath, configPath, globalData, precompiledCollections}
//! stdout → JSON array of {inputPath, content}
//! exit   → 0 on success; anything else is a build failure
//! ```
//!
//! # Design Decisions
//! - The child runs with the project root as its working directory
//! - One process per render; the child is killed if the request is dropped
//! - stdin is fed while stdout is drained so large jobs cannot deadlock

use std::collections::BTreeMap;
use std::process::Stdio;

use futures_util::FutureExt;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::engine::{BuildFuture, BuildJob, Engine, EngineError, OutputEntry, RenderOutputSet};
use crate::config::EngineConfig;

/// Maximum number of stderr bytes quoted in an error.
const STDERR_EXCERPT: usize = 2048;

/// Runs a configured program for every build.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl CommandEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            env: config.env.clone(),
        }
    }

    async fn run(&self, job: BuildJob) -> Result<RenderOutputSet, EngineError> {
        let input_dir_exists = tokio::fs::metadata(&job.input_dir)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !input_dir_exists {
            return Err(EngineError::Init(format!(
                "input directory {} does not exist",
                job.input_dir.display()
            )));
        }

        let payload = serde_json::to_vec(&job)
            .map_err(|e| EngineError::Init(format!("failed to encode build job: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(&self.env)
            .current_dir(&job.project_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Init(format!("failed to start `{}`: {e}", self.program)))?;

        let stdin = child.stdin.take();
        let feed = async move {
            match stdin {
                Some(mut stdin) => stdin.write_all(&payload).await,
                None => Ok(()),
            }
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output
            .map_err(|e| EngineError::Build(format!("failed to collect `{}` output: {e}", self.program)))?;
        if let Err(e) = fed {
            tracing::warn!(program = %self.program, error = %e, "Engine did not read the whole build job");
        }

        if !output.status.success() {
            return Err(EngineError::Build(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                excerpt(&output.stderr)
            )));
        }

        let entries: Vec<OutputEntry> = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::Build(format!("`{}` produced unreadable output: {e}", self.program)))?;

        tracing::debug!(
            program = %self.program,
            entries = entries.len(),
            "Engine run finished"
        );
        Ok(entries.into())
    }
}

impl Engine for CommandEngine {
    fn build(&self, job: BuildJob) -> BuildFuture<'_> {
        self.run(job).boxed()
    }
}

fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(STDERR_EXCERPT)]);
    text.trim().to_string()
}
