use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};
use crate::errors::ScanGateError;
use crate::models::{RemoteApplication, ScanRequest};
use crate::pipeline::clock::Clock;
use super::{elapsed_exceeds, FreshnessOracle};

/// Freshness from the modification time of a marker file that is touched
/// after every launched scan.
pub struct MarkerFileOracle {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl MarkerFileOracle {
    pub fn new(path: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self { path, clock }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn last_scan(&self) -> Result<Option<DateTime<Utc>>, ScanGateError> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ScanGateError::freshness(
                    format!("unable to read scan marker {}", self.path.display()),
                    e,
                ));
            }
        };
        let modified = metadata.modified().map_err(|e| {
            ScanGateError::freshness(
                format!("unable to read modification time of {}", self.path.display()),
                e,
            )
        })?;
        Ok(Some(DateTime::<Utc>::from(modified)))
    }
}

#[async_trait]
impl FreshnessOracle for MarkerFileOracle {
    async fn is_due(
        &self,
        request: &ScanRequest,
        _application: &RemoteApplication,
    ) -> Result<bool, ScanGateError> {
        match self.last_scan().await? {
            None => {
                info!(marker = %self.path.display(), "No previous scan recorded, a scan is due");
                Ok(true)
            }
            Some(last) => {
                let now = self.clock.now();
                let due = elapsed_exceeds(now, last, request.frequency());
                debug!(
                    last_scan = %last.to_rfc3339(),
                    frequency_days = request.scan_frequency_days,
                    due,
                    "Checked scan marker"
                );
                Ok(due)
            }
        }
    }

    async fn record_scan(&self) -> Result<(), ScanGateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let file = file.into_std().await;
        file.set_modified(SystemTime::from(self.clock.now()))?;
        debug!(marker = %self.path.display(), "Scan marker updated");
        Ok(())
    }

    fn strategy_name(&self) -> &str {
        "marker"
    }
}
