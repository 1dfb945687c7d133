use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use crate::errors::ScanGateError;
use super::{split_patterns, BuildWorkspace};

/// Workspace on a mounted filesystem. `remote` marks mounts that are
/// really another node's disk (network shares, agent volumes).
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
    remote: bool,
}

impl FsWorkspace {
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), remote: false }
    }

    pub fn remote(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), remote: true }
    }

    /// Only the include patterns are globs; the root is matched literally.
    fn resolve(&self, includes: &str) -> Result<Vec<PathBuf>, ScanGateError> {
        let root = self.root.to_str().ok_or_else(|| {
            ScanGateError::Workspace(format!("Workspace path is not valid UTF-8: {}", self.root.display()))
        })?;
        let root = glob::Pattern::escape(root.trim_end_matches(std::path::MAIN_SEPARATOR));

        let mut matched = BTreeSet::new();
        for pattern in split_patterns(includes) {
            let full = format!("{}{}{}", root, std::path::MAIN_SEPARATOR, pattern);
            let entries = glob::glob(&full)
                .map_err(|e| ScanGateError::Workspace(format!("Invalid include pattern '{}': {}", pattern, e)))?;
            for entry in entries {
                let path = entry.map_err(|e| ScanGateError::Workspace(format!("Cannot read {}", e)))?;
                if path.is_file() {
                    matched.insert(path);
                }
            }
        }
        debug!(root = %self.root.display(), count = matched.len(), "Resolved include patterns");
        Ok(matched.into_iter().collect())
    }

    /// Run the directory walk on the blocking pool.
    async fn resolve_blocking(&self, includes: &str) -> Result<Vec<PathBuf>, ScanGateError> {
        let workspace = self.clone();
        let includes = includes.to_string();
        tokio::task::spawn_blocking(move || workspace.resolve(&includes))
            .await
            .map_err(|e| ScanGateError::Workspace(format!("Include resolution task failed: {}", e)))?
    }
}

#[async_trait]
impl BuildWorkspace for FsWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_remote(&self) -> bool {
        self.remote
    }

    async fn list(&self, includes: &str) -> Result<Vec<PathBuf>, ScanGateError> {
        self.resolve_blocking(includes).await
    }

    async fn copy_matching(&self, includes: &str, dest: &Path) -> Result<Vec<PathBuf>, ScanGateError> {
        let mut copies = Vec::new();
        for source in self.resolve_blocking(includes).await? {
            let relative = source.strip_prefix(&self.root).map_err(|_| {
                ScanGateError::Workspace(format!("{} is outside the workspace", source.display()))
            })?;
            let target = dest.join(relative);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ScanGateError::staging(format!("cannot create {}", parent.display()), e))?;
            }
            tokio::fs::copy(&source, &target)
                .await
                .map_err(|e| ScanGateError::staging(format!("cannot copy {}", source.display()), e))?;
            copies.push(target);
        }
        Ok(copies)
    }
}
