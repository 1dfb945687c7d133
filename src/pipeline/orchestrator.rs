use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use crate::errors::ScanGateError;
use crate::freshness::FreshnessOracle;
use crate::models::{RemoteApplication, ScanRequest};
use crate::service::{resolve_application, ScanService};
use crate::trigger::{should_run, CauseKind};
use crate::workspace::{BuildWorkspace, EnvVars};
use super::clock::{Clock, SystemClock};
use super::interrupt::interruptible;
use super::launcher::ScanLauncher;
use super::phase::PHASES;
use super::poller::PrescanPoller;
use super::selector::select_scope;
use super::state::*;
use super::uploader::ArtifactUploader;
use tracing::{debug, info, warn};

/// Single entry point for one scan decision-and-launch run.
pub struct ScanOrchestrator {
    settings: OrchestratorSettings,
    service: Arc<dyn ScanService>,
    workspace: Arc<dyn BuildWorkspace>,
    freshness: Arc<dyn FreshnessOracle>,
    clock: Arc<dyn Clock>,
    env: EnvVars,
    state: Arc<RwLock<RunState>>,
    cancel_token: CancellationToken,
}

impl ScanOrchestrator {
    pub fn new(
        settings: OrchestratorSettings,
        service: Arc<dyn ScanService>,
        workspace: Arc<dyn BuildWorkspace>,
        freshness: Arc<dyn FreshnessOracle>,
    ) -> Self {
        Self {
            settings,
            service,
            workspace,
            freshness,
            clock: Arc::new(SystemClock),
            env: EnvVars::default(),
            state: Arc::new(RwLock::new(RunState::new())),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Replace the orchestrator's cancel token with one owned by the host,
    /// so the host can abort a run mid-poll.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Environment used to expand the application and scan names.
    pub fn with_env(mut self, env: EnvVars) -> Self {
        self.env = env;
        self
    }

    pub async fn state(&self) -> RunState {
        self.state.read().await.clone()
    }

    pub async fn run(&self, request: &ScanRequest, causes: &[CauseKind]) -> Result<RunOutcome, ScanGateError> {
        {
            let mut state = self.state.write().await;
            state.status = RunStatus::Running;
            state.start_time = self.clock.now();
        }
        let result = self.execute(request, causes).await;

        let mut state = self.state.write().await;
        match &result {
            Ok(RunOutcome::Launched { uploaded, .. }) => {
                state.status = RunStatus::Completed;
                state.uploaded_files = *uploaded;
            }
            Ok(_) => state.status = RunStatus::Skipped,
            Err(e) => {
                state.status = RunStatus::Failed;
                state.error = Some(e.to_string());
            }
        }
        result
    }

    async fn execute(&self, request: &ScanRequest, causes: &[CauseKind]) -> Result<RunOutcome, ScanGateError> {
        self.set_phase(PhaseName::TriggerCheck).await;
        if !should_run(request.triggers.as_ref(), causes) {
            info!(causes = ?causes, "No build cause is enabled for scanning, skipping");
            return Ok(RunOutcome::SkippedByTrigger);
        }

        self.set_phase(PhaseName::ApplicationLookup).await;
        let app_name = self.env.expand(&request.application_name);
        let application = interruptible(
            &self.cancel_token,
            "resolving application",
            resolve_application(self.service.as_ref(), &app_name),
        )
        .await?;
        info!(app = %application.name, app_id = %application.id, "Resolved application");
        self.state.write().await.application = Some(application.clone());

        self.set_phase(PhaseName::FreshnessCheck).await;
        let due = interruptible(
            &self.cancel_token,
            "checking scan freshness",
            self.freshness.is_due(request, &application),
        )
        .await?;
        if !due {
            info!(strategy = self.freshness.strategy_name(), "Scan is not needed at this time");
            return Ok(RunOutcome::NotDue { application });
        }

        if !request.scan_name.trim().is_empty() {
            let build_name = self.env.expand(&request.scan_name);
            info!(scan_name = %build_name, "Creating scan");
            interruptible(
                &self.cancel_token,
                "creating scan",
                self.service.create_build(&application.id, &build_name),
            )
            .await?;
        }

        self.set_phase(PhaseName::Upload).await;
        let uploaded = self.upload_artifacts(request, &application).await?;
        if uploaded == 0 {
            info!(includes = %request.includes, "No files matched the include pattern, nothing to scan");
            return Ok(RunOutcome::NoArtifacts { application });
        }

        self.set_phase(PhaseName::Prescan).await;
        let poller = PrescanPoller::new(
            self.service.clone(),
            self.clock.clone(),
            self.cancel_token.clone(),
            self.settings.verbose,
        );
        let modules = poller.run(&application.id, request.prescan_timeout_minutes).await?;

        self.set_phase(PhaseName::ModuleSelection).await;
        let scope = select_scope(&modules, request.platform_filter(), self.settings.module_selection)?;

        self.set_phase(PhaseName::ScanLaunch).await;
        let launcher = ScanLauncher::new(self.service.clone(), self.cancel_token.clone(), self.settings.verbose);
        launcher.launch(&application.id, &scope).await?;

        if let Err(e) = self.freshness.record_scan().await {
            warn!(error = %e, "Scan launched but the last-scan record could not be updated");
        }

        info!("Scan succeeded, results will be sent once they are ready");
        Ok(RunOutcome::Launched {
            application,
            uploaded,
            scope,
        })
    }

    async fn upload_artifacts(
        &self,
        request: &ScanRequest,
        application: &RemoteApplication,
    ) -> Result<usize, ScanGateError> {
        let uploader = ArtifactUploader::new(
            self.service.clone(),
            self.workspace.clone(),
            self.settings.stage_remote_workspace,
            self.settings.staging_dir.clone(),
            self.cancel_token.clone(),
        );
        let files = uploader.collect(&request.includes).await?;
        if files.is_empty() {
            return Ok(0);
        }

        info!(
            files = ?files,
            user = %self.settings.service_user,
            service = self.service.service_name(),
            "Uploading files"
        );
        uploader.upload_all(&application.id, &files).await
    }

    async fn set_phase(&self, phase: PhaseName) {
        if let Some(def) = PHASES.iter().find(|p| p.name == phase) {
            debug!(phase = %phase, "{}: {}", def.display_name, def.description);
        }
        let mut state = self.state.write().await;
        state.current_phase = Some(phase);
    }
}
