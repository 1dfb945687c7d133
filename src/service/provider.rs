use async_trait::async_trait;
use std::path::Path;
use crate::errors::ScanGateError;

/// Client for the remote scanning service.
///
/// Document-returning calls hand back the raw XML; callers decide how
/// strictly to parse it.
#[async_trait]
pub trait ScanService: Send + Sync {
    /// `<applist>` of every application visible to the account
    async fn list_applications(&self) -> Result<String, ScanGateError>;

    /// `<buildinfo>` for the application's most recent build
    async fn get_build_info(&self, app_id: &str) -> Result<String, ScanGateError>;

    async fn begin_prescan(&self, app_id: &str) -> Result<(), ScanGateError>;

    /// `<prescanresults>` once the prescan is done, an `<error>` document before that
    async fn get_prescan_results(&self, app_id: &str) -> Result<String, ScanGateError>;

    async fn upload_file(&self, app_id: &str, path: &Path) -> Result<(), ScanGateError>;

    async fn create_build(&self, app_id: &str, name: &str) -> Result<(), ScanGateError>;

    /// Start the full scan; returns the service's `<buildinfo>` acknowledgment
    async fn begin_scan(
        &self,
        app_id: &str,
        module_id: Option<&str>,
        scan_all_modules: bool,
    ) -> Result<String, ScanGateError>;

    /// Service name for logging
    fn service_name(&self) -> &str;
}
