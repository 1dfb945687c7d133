use serde::{Deserialize, Serialize};
use crate::freshness::FreshnessStrategy;
use crate::pipeline::selector::ModuleSelection;
use crate::trigger::TriggerPolicy;

pub const DEFAULT_SCAN_FREQUENCY_DAYS: u32 = 7;
pub const DEFAULT_PRESCAN_TIMEOUT_MINUTES: u32 = 30;
/// Relative marker paths resolve against the workspace root.
pub const DEFAULT_MARKER_FILE: &str = ".scangate-last-scan";
/// Relative staging paths resolve against the current directory, which is
/// on the local node even when the workspace is not.
pub const DEFAULT_STAGING_DIR: &str = ".scangate/workspace-remote";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanGateConfig {
    pub service: Option<ServiceConfig>,
    pub behavior: Option<BehaviorConfig>,
    pub defaults: Option<DefaultsConfig>,
    pub scan: Option<ScanConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    /// Literal or `$ENV_VAR`.
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BehaviorConfig {
    pub verbose: Option<bool>,
    pub stage_remote_workspace: Option<bool>,
    pub fail_build: Option<bool>,
    pub module_selection: Option<ModuleSelection>,
    pub freshness: Option<FreshnessStrategy>,
    /// Relative to the workspace root.
    pub marker_file: Option<String>,
    /// Relative to the current directory, never the workspace.
    pub staging_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DefaultsConfig {
    pub scan_frequency_days: Option<u32>,
    pub prescan_timeout_minutes: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    pub includes: Option<String>,
    pub application_name: Option<String>,
    pub platform_name: Option<String>,
    pub scan_name: Option<String>,
    pub scan_frequency_days: Option<u32>,
    pub prescan_timeout_minutes: Option<u32>,
    pub triggers: Option<TriggersConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct TriggersConfig {
    #[serde(default)]
    pub manual: bool,
    #[serde(default)]
    pub scm: bool,
    #[serde(default)]
    pub timer: bool,
}

impl TriggersConfig {
    /// A section with every flag off does not override anything.
    pub fn policy(&self) -> Option<TriggerPolicy> {
        let policy = TriggerPolicy::new(self.manual, self.scm, self.timer);
        if policy.overrides_any() {
            Some(policy)
        } else {
            None
        }
    }
}

impl ScanGateConfig {
    pub fn behavior(&self) -> BehaviorConfig {
        self.behavior.clone().unwrap_or_default()
    }

    pub fn scan(&self) -> ScanConfig {
        self.scan.clone().unwrap_or_default()
    }

    pub fn service(&self) -> ServiceConfig {
        self.service.clone().unwrap_or_default()
    }

    pub fn default_scan_frequency_days(&self) -> u32 {
        self.defaults
            .as_ref()
            .and_then(|d| d.scan_frequency_days)
            .unwrap_or(DEFAULT_SCAN_FREQUENCY_DAYS)
    }

    pub fn default_prescan_timeout_minutes(&self) -> u32 {
        self.defaults
            .as_ref()
            .and_then(|d| d.prescan_timeout_minutes)
            .unwrap_or(DEFAULT_PRESCAN_TIMEOUT_MINUTES)
    }
}
