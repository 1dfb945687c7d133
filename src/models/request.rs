use crate::trigger::TriggerPolicy;

/// Everything a single orchestration run needs to know about the scan.
///
/// Built once by the caller from config and CLI flags; numeric fields are
/// validated before construction.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Comma-separated glob patterns, relative to the workspace root.
    pub includes: String,
    /// Application name as registered with the service. May contain `$VAR`s.
    pub application_name: String,
    /// Substring of a module's platform label. Empty means scan all modules.
    pub platform_name: String,
    /// Custom build name. Empty leaves naming to the service.
    pub scan_name: String,
    pub scan_frequency_days: u32,
    /// Prescan wait budget in minutes (one poll per minute).
    pub prescan_timeout_minutes: u32,
    /// `None` scans regardless of what triggered the build.
    pub triggers: Option<TriggerPolicy>,
}

impl ScanRequest {
    pub fn platform_filter(&self) -> Option<&str> {
        let trimmed = self.platform_name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    pub fn frequency(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.scan_frequency_days))
    }
}
