use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use crate::errors::ScanGateError;
use crate::service::ScanService;
use crate::workspace::BuildWorkspace;
use super::interrupt::interruptible;

pub struct ArtifactUploader {
    service: Arc<dyn ScanService>,
    workspace: Arc<dyn BuildWorkspace>,
    stage_remote: bool,
    staging_dir: PathBuf,
    cancel_token: CancellationToken,
}

impl ArtifactUploader {
    pub fn new(
        service: Arc<dyn ScanService>,
        workspace: Arc<dyn BuildWorkspace>,
        stage_remote: bool,
        staging_dir: PathBuf,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            service,
            workspace,
            stage_remote,
            staging_dir,
            cancel_token,
        }
    }

    /// Resolve `includes` to the files that will be uploaded, staging them
    /// locally first when the workspace is remote and staging is enabled.
    pub async fn collect(&self, includes: &str) -> Result<Vec<PathBuf>, ScanGateError> {
        if !self.workspace.is_remote() {
            return interruptible(&self.cancel_token, "listing workspace files", self.workspace.list(includes)).await;
        }

        debug!(root = %self.workspace.root().display(), "Remote workspace detected");
        if !self.stage_remote {
            warn!("Remote workspace detected and local staging is disabled; uploads may be slower");
            return interruptible(&self.cancel_token, "listing workspace files", self.workspace.list(includes)).await;
        }

        info!(staging_dir = %self.staging_dir.display(), "Preparing workspace for file upload");
        interruptible(&self.cancel_token, "staging workspace", async {
            reset_dir(&self.staging_dir).await?;
            let staged = self.workspace.copy_matching(includes, &self.staging_dir).await?;
            debug!(count = staged.len(), dir = %self.staging_dir.display(), "Files copied into staging directory");
            Ok(staged)
        })
        .await
    }

    /// Upload every file, one call each, stopping at the first failure.
    pub async fn upload_all(&self, app_id: &str, files: &[PathBuf]) -> Result<usize, ScanGateError> {
        for file in files {
            interruptible(&self.cancel_token, "uploading artifacts", self.service.upload_file(app_id, file)).await?;
            info!(file = %file.display(), "Uploaded artifact");
        }
        Ok(files.len())
    }
}

/// Make `dir` an empty directory.
async fn reset_dir(dir: &Path) -> Result<(), ScanGateError> {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => {
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| ScanGateError::staging("cannot list staging directory", e))?
            {
                let path = entry.path();
                let is_dir = entry
                    .file_type()
                    .await
                    .map_err(|e| ScanGateError::staging(format!("cannot inspect {}", path.display()), e))?
                    .is_dir();
                let removed = if is_dir {
                    tokio::fs::remove_dir_all(&path).await
                } else {
                    tokio::fs::remove_file(&path).await
                };
                removed.map_err(|e| ScanGateError::staging(format!("cannot remove {}", path.display()), e))?;
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ScanGateError::staging(format!("cannot create {}", dir.display()), e)),
        Err(e) => Err(ScanGateError::staging(format!("cannot open {}", dir.display()), e)),
    }
}
