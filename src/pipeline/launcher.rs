use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use crate::errors::ScanGateError;
use crate::service::ScanService;
use super::interrupt::interruptible;
use super::state::ScanScope;

pub struct ScanLauncher {
    service: Arc<dyn ScanService>,
    cancel_token: CancellationToken,
    verbose: bool,
}

impl ScanLauncher {
    pub fn new(service: Arc<dyn ScanService>, cancel_token: CancellationToken, verbose: bool) -> Self {
        Self {
            service,
            cancel_token,
            verbose,
        }
    }

    /// Ask the service to begin the scan. The service finishes it on its
    /// own and notifies out of band.
    pub async fn launch(&self, app_id: &str, scope: &ScanScope) -> Result<String, ScanGateError> {
        info!(app_id = %app_id, all_modules = scope.scans_all_modules(), "Starting execution of scan");
        let ack = interruptible(
            &self.cancel_token,
            "starting scan",
            self.service.begin_scan(app_id, scope.module_id(), scope.scans_all_modules()),
        )
        .await?;

        if self.verbose {
            info!(document = %ack, "Scan launch response");
        } else {
            debug!(bytes = ack.len(), "Scan launch acknowledged");
        }
        info!("Scan has been started");
        Ok(ack)
    }
}
