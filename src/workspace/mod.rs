pub mod env;
pub mod fs;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use crate::errors::ScanGateError;

pub use env::EnvVars;
pub use fs::FsWorkspace;

/// The build's workspace as seen from the machine running the orchestrator.
#[async_trait]
pub trait BuildWorkspace: Send + Sync {
    fn root(&self) -> &Path;

    /// True when the workspace lives on another node and file handles
    /// resolved here are slow or indirect.
    fn is_remote(&self) -> bool;

    /// Files matching the comma-separated `includes` globs, sorted.
    async fn list(&self, includes: &str) -> Result<Vec<PathBuf>, ScanGateError>;

    /// Copy the files `includes` matches into `dest`, keeping their paths
    /// relative to the root. Returns the copies.
    async fn copy_matching(&self, includes: &str, dest: &Path) -> Result<Vec<PathBuf>, ScanGateError>;
}

/// Split a comma-separated include list, dropping blanks.
pub fn split_patterns(includes: &str) -> Vec<&str> {
    includes
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
