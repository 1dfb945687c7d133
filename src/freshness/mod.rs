pub mod marker;
pub mod remote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use crate::errors::ScanGateError;
use crate::models::{RemoteApplication, ScanRequest};
use crate::pipeline::clock::Clock;
use crate::service::ScanService;

pub use marker::MarkerFileOracle;
pub use remote::RemoteStatusOracle;

/// Decides whether a new scan is due for an application.
#[async_trait]
pub trait FreshnessOracle: Send + Sync {
    async fn is_due(
        &self,
        request: &ScanRequest,
        application: &RemoteApplication,
    ) -> Result<bool, ScanGateError>;

    /// Called once a scan has been launched.
    async fn record_scan(&self) -> Result<(), ScanGateError> {
        Ok(())
    }

    /// Strategy name for logging
    fn strategy_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessStrategy {
    /// Timestamp of a marker file next to the workspace.
    #[default]
    Marker,
    /// Publication date of the service's last build.
    Remote,
}

impl std::str::FromStr for FreshnessStrategy {
    type Err = ScanGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marker" => Ok(Self::Marker),
            "remote" => Ok(Self::Remote),
            other => Err(ScanGateError::Config(format!("Invalid freshness strategy: {}", other))),
        }
    }
}

pub fn build_oracle(
    strategy: FreshnessStrategy,
    marker_path: PathBuf,
    service: Arc<dyn ScanService>,
    clock: Arc<dyn Clock>,
) -> Arc<dyn FreshnessOracle> {
    match strategy {
        FreshnessStrategy::Marker => Arc::new(MarkerFileOracle::new(marker_path, clock)),
        FreshnessStrategy::Remote => Arc::new(RemoteStatusOracle::new(service, clock)),
    }
}

/// True once strictly more than `frequency` has passed since `last_scan`.
pub fn elapsed_exceeds(now: DateTime<Utc>, last_scan: DateTime<Utc>, frequency: chrono::Duration) -> bool {
    now.signed_duration_since(last_scan) > frequency
}
