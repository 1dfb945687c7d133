use tracing::{debug, warn};
use crate::errors::ScanGateError;
use crate::models::xml::parse_document;
use crate::models::{AppList, RemoteApplication};
use super::provider::ScanService;

/// Look up `name` in the service's application list.
pub async fn resolve_application(
    service: &dyn ScanService,
    name: &str,
) -> Result<RemoteApplication, ScanGateError> {
    let xml = service.list_applications().await?;
    debug!(bytes = xml.len(), "Fetched application list");

    let list: AppList = parse_document(&xml, "applist")?;
    match list.find(name) {
        Some(app) => Ok(app),
        None => {
            warn!(
                app = %name,
                available = ?list.names(),
                "Application was not found in the service's application list"
            );
            Err(ScanGateError::ApplicationNotFound(name.to_string()))
        }
    }
}
