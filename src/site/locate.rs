//! Project root discovery.

use std::path::{Path, PathBuf};

use super::{SiteError, SiteResult};

/// Return the first candidate directory that exists.
///
/// Relative candidates are resolved against `base`, which callers take from
/// the current directory once at startup.
pub fn locate_project_root<S: AsRef<str>>(base: &Path, candidates: &[S]) -> SiteResult<PathBuf> {
    let searched: Vec<PathBuf> = candidates
        .iter()
        .map(|candidate| base.join(candidate.as_ref()))
        .collect();

    for path in &searched {
        if path.is_dir() {
            tracing::debug!(project_root = %path.display(), "Project root located");
            return Ok(path.clone());
        }
        tracing::trace!(candidate = %path.display(), "Project root candidate missing");
    }

    Err(SiteError::ProjectRootNotFound { searched })
}
