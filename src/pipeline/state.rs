use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use crate::models::{PrescanModule, RemoteApplication};
use super::selector::ModuleSelection;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub status: RunStatus,
    pub current_phase: Option<PhaseName>,
    pub start_time: DateTime<Utc>,
    pub application: Option<RemoteApplication>,
    pub uploaded_files: usize,
    pub error: Option<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            status: RunStatus::Queued,
            current_phase: None,
            start_time: Utc::now(),
            application: None,
            uploaded_files: 0,
            error: None,
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseName {
    TriggerCheck,
    ApplicationLookup,
    FreshnessCheck,
    Upload,
    Prescan,
    ModuleSelection,
    ScanLaunch,
}

impl std::fmt::Display for PhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TriggerCheck => write!(f, "trigger-check"),
            Self::ApplicationLookup => write!(f, "application-lookup"),
            Self::FreshnessCheck => write!(f, "freshness-check"),
            Self::Upload => write!(f, "upload"),
            Self::Prescan => write!(f, "prescan"),
            Self::ModuleSelection => write!(f, "module-selection"),
            Self::ScanLaunch => write!(f, "scan-launch"),
        }
    }
}

/// Terminal result of the prescan poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Ready(Vec<PrescanModule>),
    TimedOut { attempts: u32 },
}

/// What the final scan should cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope")]
pub enum ScanScope {
    AllModules,
    Module { id: String, platform: String },
}

impl ScanScope {
    pub fn module_id(&self) -> Option<&str> {
        match self {
            Self::AllModules => None,
            Self::Module { id, .. } => Some(id),
        }
    }

    pub fn scans_all_modules(&self) -> bool {
        matches!(self, Self::AllModules)
    }
}

/// How a successful orchestration run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No cause of this build is enabled in the trigger policy.
    SkippedByTrigger,
    /// The last scan is recent enough, or still running remotely.
    NotDue { application: RemoteApplication },
    /// The include pattern matched nothing; no prescan or scan was started.
    NoArtifacts { application: RemoteApplication },
    Launched {
        application: RemoteApplication,
        uploaded: usize,
        scope: ScanScope,
    },
}

impl RunOutcome {
    pub fn launched(&self) -> bool {
        matches!(self, Self::Launched { .. })
    }
}

/// Process-level settings handed to the orchestrator at construction.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Log raw service documents at info level.
    pub verbose: bool,
    /// Copy matched files out of a remote workspace before uploading.
    pub stage_remote_workspace: bool,
    pub staging_dir: PathBuf,
    pub module_selection: ModuleSelection,
    /// Service account name, logged for traceability. Never the password.
    pub service_user: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            stage_remote_workspace: true,
            staging_dir: PathBuf::from(".scangate/workspace-remote"),
            module_selection: ModuleSelection::default(),
            service_user: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_accessors() {
        let all = ScanScope::AllModules;
        assert!(all.scans_all_modules());
        assert_eq!(all.module_id(), None);

        let one = ScanScope::Module { id: "42".into(), platform: "Win32".into() };
        assert!(!one.scans_all_modules());
        assert_eq!(one.module_id(), Some("42"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(PhaseName::Prescan.to_string(), "prescan");
        assert_eq!(PhaseName::ScanLaunch.to_string(), "scan-launch");
    }

    #[test]
    fn test_run_state_starts_queued() {
        let state = RunState::new();
        assert_eq!(state.status, RunStatus::Queued);
        assert!(state.current_phase.is_none());
    }
}
