use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::errors::ScanGateError;
use crate::models::xml::parse_document;
use crate::models::{BuildInfo, RemoteApplication, ScanRequest};
use crate::pipeline::clock::Clock;
use crate::service::ScanService;
use super::{elapsed_exceeds, FreshnessOracle};

/// Freshness from the service's record of the application's last build.
///
/// A build whose results are not ready yet blocks a new scan, which keeps
/// two pipelines from piling scans onto the same application. Anything the
/// document cannot tell us (missing units, unreadable dates, a malformed
/// payload) counts as stale.
pub struct RemoteStatusOracle {
    service: Arc<dyn ScanService>,
    clock: Arc<dyn Clock>,
}

impl RemoteStatusOracle {
    pub fn new(service: Arc<dyn ScanService>, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }
}

#[async_trait]
impl FreshnessOracle for RemoteStatusOracle {
    async fn is_due(
        &self,
        request: &ScanRequest,
        application: &RemoteApplication,
    ) -> Result<bool, ScanGateError> {
        let xml = match self.service.get_build_info(&application.id).await {
            Ok(xml) => xml,
            Err(e @ ScanGateError::Interrupted(_)) => return Err(e),
            Err(e) => return Err(ScanGateError::freshness("unable to retrieve build info", e)),
        };

        let info: BuildInfo = match parse_document(&xml, "buildinfo") {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "Failed to read build info to decide whether a scan is needed, assuming one is");
                return Ok(true);
            }
        };

        if !info.build.results_ready {
            info!(app = %application.name, "Last scan is still in progress, not starting a new one");
            return Ok(false);
        }

        let Some(unit) = info.build.last_published() else {
            info!("No analysis units in the last build, another scan will be started");
            return Ok(true);
        };

        match unit.published_at() {
            Some(published) => {
                let due = elapsed_exceeds(self.clock.now(), published, request.frequency());
                debug!(
                    published = %published.to_rfc3339(),
                    frequency_days = request.scan_frequency_days,
                    due,
                    "Compared last published scan"
                );
                Ok(due)
            }
            None => {
                warn!(
                    published_date = ?unit.published_date,
                    "Could not read the last scan's publication date, assuming a scan is needed"
                );
                Ok(true)
            }
        }
    }

    fn strategy_name(&self) -> &str {
        "remote"
    }
}
