use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use crate::cli::commands::ScanArgs;
use scangate::config::{self, credentials::resolve_credential, ScanGateConfig};
use scangate::config::{DEFAULT_MARKER_FILE, DEFAULT_STAGING_DIR};
use scangate::errors::ScanGateError;
use scangate::freshness::{build_oracle, FreshnessStrategy};
use scangate::models::ScanRequest;
use scangate::pipeline::clock::{Clock, SystemClock};
use scangate::pipeline::{OrchestratorSettings, RunOutcome, ScanOrchestrator};
use scangate::service::http::{ServiceSettings, DEFAULT_BASE_URL};
use scangate::service::{HttpScanService, ScanService};
use scangate::trigger::parse_causes;
use scangate::workspace::{EnvVars, FsWorkspace};

const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 300;

/// Everything one `scan` invocation needs, merged from CLI flags and the
/// config file.
#[derive(Debug)]
pub struct ScanPlan {
    pub request: ScanRequest,
    pub settings: OrchestratorSettings,
    pub service: ServiceSettings,
    pub freshness: FreshnessStrategy,
    pub marker_path: PathBuf,
    pub fail_build: bool,
}

pub async fn handle_scan(args: ScanArgs) -> Result<(), ScanGateError> {
    let file_config = match &args.config {
        Some(path) => config::parse_config(Path::new(path)).await?,
        None => ScanGateConfig::default(),
    };
    let plan = build_scan_plan(&args, &file_config)?;

    let service: Arc<dyn ScanService> = Arc::new(HttpScanService::new(plan.service.clone())?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let workspace = if args.remote_workspace {
        FsWorkspace::remote(&args.workspace)
    } else {
        FsWorkspace::local(&args.workspace)
    };
    let freshness = build_oracle(plan.freshness, plan.marker_path.clone(), service.clone(), clock.clone());

    let cancel_token = CancellationToken::new();
    let interrupt = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, abandoning scan run");
            interrupt.cancel();
        }
    });

    info!(
        app = %plan.request.application_name,
        freshness = ?plan.freshness,
        user = %plan.service.username,
        "Starting scan run"
    );

    let orchestrator = ScanOrchestrator::new(plan.settings, service, Arc::new(workspace), freshness)
        .with_clock(clock)
        .with_env(EnvVars::from_process())
        .with_cancel_token(cancel_token);

    let causes = parse_causes(&args.cause);
    match orchestrator.run(&plan.request, &causes).await {
        Ok(outcome) => {
            report_outcome(&outcome);
            Ok(())
        }
        Err(e @ ScanGateError::Interrupted(_)) => Err(e),
        Err(e) if !plan.fail_build => {
            warn!(error = %e, "Scan failed; build continues because fail_build is disabled");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn report_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::SkippedByTrigger => info!("Build cause not enabled for scanning"),
        RunOutcome::NotDue { application } => info!(app = %application, "Scan not due"),
        RunOutcome::NoArtifacts { application } => info!(app = %application, "No artifacts to scan"),
        RunOutcome::Launched { application, uploaded, scope } => info!(
            app = %application,
            uploaded,
            module = scope.module_id().unwrap_or("all"),
            "Scan launched"
        ),
    }
}

pub fn build_scan_plan(args: &ScanArgs, file_config: &ScanGateConfig) -> Result<ScanPlan, ScanGateError> {
    let scan = file_config.scan();
    let behavior = file_config.behavior();
    let service = file_config.service();

    let includes = args.includes.clone()
        .or(scan.includes)
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| ScanGateError::Config("No include pattern configured".into()))?;
    let application_name = args.application.clone()
        .or(scan.application_name)
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ScanGateError::Config("No application name configured".into()))?;

    let freshness = match &args.freshness {
        Some(raw) => raw.parse()?,
        None => behavior.freshness.unwrap_or_default(),
    };
    let module_selection = match &args.module_selection {
        Some(raw) => raw.parse()?,
        None => behavior.module_selection.unwrap_or_default(),
    };

    let username = args.username.clone()
        .or(service.username)
        .unwrap_or_default();
    let password = args.password.clone()
        .or_else(|| service.password.as_deref().map(resolve_credential))
        .unwrap_or_default();

    let workspace = PathBuf::from(&args.workspace);
    let marker_file = behavior.marker_file.unwrap_or_else(|| DEFAULT_MARKER_FILE.to_string());
    let marker_path = resolve_against(&workspace, &marker_file);

    Ok(ScanPlan {
        request: ScanRequest {
            includes,
            application_name,
            platform_name: args.platform.clone().or(scan.platform_name).unwrap_or_default(),
            scan_name: args.scan_name.clone().or(scan.scan_name).unwrap_or_default(),
            scan_frequency_days: args.frequency
                .or(scan.scan_frequency_days)
                .unwrap_or_else(|| file_config.default_scan_frequency_days()),
            prescan_timeout_minutes: args.prescan_timeout
                .or(scan.prescan_timeout_minutes)
                .unwrap_or_else(|| file_config.default_prescan_timeout_minutes()),
            triggers: scan.triggers.and_then(|t| t.policy()),
        },
        settings: OrchestratorSettings {
            verbose: behavior.verbose.unwrap_or(false),
            stage_remote_workspace: behavior.stage_remote_workspace.unwrap_or(true),
            // Relative to the current directory, not the workspace.
            staging_dir: PathBuf::from(behavior.staging_dir.unwrap_or_else(|| DEFAULT_STAGING_DIR.to_string())),
            module_selection,
            service_user: username.clone(),
        },
        service: ServiceSettings {
            base_url: args.service_url.clone()
                .or(service.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            username,
            password,
            timeout: Duration::from_secs(service.timeout_secs.unwrap_or(DEFAULT_SERVICE_TIMEOUT_SECS)),
        },
        freshness,
        marker_path,
        fail_build: behavior.fail_build.unwrap_or(true),
    })
}

fn resolve_against(base: &Path, path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        candidate
    } else {
        base.join(candidate)
    }
}
