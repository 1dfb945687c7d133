use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use scangate::errors::ScanGateError;
use scangate::freshness::{FreshnessOracle, MarkerFileOracle, RemoteStatusOracle};
use scangate::models::ScanRequest;
use scangate::pipeline::clock::ManualClock;
use scangate::pipeline::poller::PRESCAN_POLL_INTERVAL;
use scangate::pipeline::state::RunStatus;
use scangate::pipeline::{ModuleSelection, OrchestratorSettings, RunOutcome, ScanOrchestrator, ScanScope};
use scangate::service::fake::{build_info_xml, prescan_xml, ScriptedService, ServiceCall};
use scangate::trigger::{parse_causes, CauseKind, TriggerPolicy};
use scangate::workspace::{EnvVars, FsWorkspace};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ws/dist")).unwrap();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
        Self { dir, clock }
    }

    fn workspace(&self) -> PathBuf {
        self.dir.path().join("ws")
    }

    fn marker(&self) -> PathBuf {
        self.dir.path().join(".scangate-last-scan")
    }

    fn artifact(&self, relative: &str) {
        let path = self.workspace().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"artifact").unwrap();
    }

    fn marker_oracle(&self) -> Arc<dyn FreshnessOracle> {
        Arc::new(MarkerFileOracle::new(self.marker(), self.clock.clone()))
    }

    fn orchestrator(
        &self,
        settings: OrchestratorSettings,
        service: Arc<ScriptedService>,
        workspace: FsWorkspace,
        freshness: Arc<dyn FreshnessOracle>,
    ) -> ScanOrchestrator {
        ScanOrchestrator::new(settings, service, Arc::new(workspace), freshness)
            .with_clock(self.clock.clone())
            .with_env(EnvVars::from_pairs([("BUILD_NUMBER", "42")]))
    }

    fn local(&self, service: Arc<ScriptedService>) -> ScanOrchestrator {
        self.orchestrator(
            OrchestratorSettings::default(),
            service,
            FsWorkspace::local(self.workspace()),
            self.marker_oracle(),
        )
    }
}

fn request() -> ScanRequest {
    ScanRequest {
        includes: "dist/*.jar".into(),
        application_name: "Foo".into(),
        platform_name: String::new(),
        scan_name: String::new(),
        scan_frequency_days: 7,
        prescan_timeout_minutes: 3,
        triggers: None,
    }
}

fn foo_service() -> ScriptedService {
    ScriptedService::new().with_applications(&[("100", "Bar"), ("123", "Foo")])
}

fn manual() -> Vec<CauseKind> {
    vec![CauseKind::Manual]
}

#[tokio::test]
async fn test_unknown_application_fails_before_upload() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(ScriptedService::new().with_applications(&[("100", "Bar")]));
    let orch = h.local(service.clone());

    let err = orch.run(&request(), &manual()).await.unwrap_err();

    assert!(matches!(err, ScanGateError::ApplicationNotFound(_)));
    assert!(err.to_string().contains("failed to get application id for app Foo"));
    assert!(service.uploaded_paths().is_empty());
    assert!(!service.prescan_started());
    assert_eq!(err.classify().exit_code, 3);
    assert_eq!(orch.state().await.status, RunStatus::Failed);
}

#[tokio::test]
async fn test_application_name_is_env_expanded() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(
        ScriptedService::new()
            .with_applications(&[("7", "Foo-42")])
            .with_prescan_responses([prescan_xml(&[("m1", "JVM", false)])]),
    );
    let orch = h.local(service.clone());
    let mut req = request();
    req.application_name = "Foo-${BUILD_NUMBER}".into();

    let outcome = orch.run(&req, &manual()).await.unwrap();

    match outcome {
        RunOutcome::Launched { application, .. } => assert_eq!(application.id, "7"),
        other => panic!("expected launch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_zero_matches_is_success_without_service_side_effects() {
    let h = Harness::new();
    h.artifact("dist/readme.txt");
    let service = Arc::new(foo_service());
    let orch = h.local(service.clone());

    let outcome = orch.run(&request(), &manual()).await.unwrap();

    assert!(matches!(outcome, RunOutcome::NoArtifacts { .. }));
    assert!(service.uploaded_paths().is_empty());
    assert!(!service.prescan_started());
    assert!(service.scan_launches().is_empty());
    assert!(!h.marker().exists());
    assert_eq!(orch.state().await.status, RunStatus::Skipped);
}

#[tokio::test]
async fn test_full_launch_selects_platform_module() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    h.artifact("dist/lib.jar");
    let service = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[
        ("m1", "JVM", false),
        ("m2", "Windows Win32", false),
    ])]));
    let orch = h.local(service.clone());
    let mut req = request();
    req.platform_name = "Win32".into();

    let outcome = orch.run(&req, &manual()).await.unwrap();

    assert_eq!(
        service.uploaded_paths(),
        vec![h.workspace().join("dist/app.jar"), h.workspace().join("dist/lib.jar")]
    );
    assert_eq!(
        service.scan_launches(),
        vec![ServiceCall::BeginScan {
            app_id: "123".into(),
            module_id: Some("m2".into()),
            scan_all_modules: false,
        }]
    );
    match outcome {
        RunOutcome::Launched { uploaded, scope, .. } => {
            assert_eq!(uploaded, 2);
            assert_eq!(scope, ScanScope::Module { id: "m2".into(), platform: "Windows Win32".into() });
        }
        other => panic!("expected launch, got {:?}", other),
    }
    let state = orch.state().await;
    assert_eq!(state.status, RunStatus::Completed);
    assert_eq!(state.uploaded_files, 2);
}

#[tokio::test]
async fn test_no_platform_filter_scans_all_modules() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[
        ("m1", "JVM", false),
        ("m2", "Windows Win32", false),
    ])]));
    let orch = h.local(service.clone());

    orch.run(&request(), &manual()).await.unwrap();

    assert_eq!(
        service.scan_launches(),
        vec![ServiceCall::BeginScan {
            app_id: "123".into(),
            module_id: None,
            scan_all_modules: true,
        }]
    );
}

#[tokio::test]
async fn test_fatal_selected_module_blocks_launch() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[
        ("m1", "JVM", false),
        ("m2", "Windows Win32", true),
    ])]));
    let orch = h.local(service.clone());
    let mut req = request();
    req.platform_name = "Win32".into();

    let err = orch.run(&req, &manual()).await.unwrap_err();

    assert!(matches!(err, ScanGateError::PrescanFatal));
    assert!(service.scan_launches().is_empty());
    assert!(!h.marker().exists());
}

#[tokio::test]
async fn test_strict_selection_checks_modules_after_match() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let modules = prescan_xml(&[("m1", "Windows Win32", false), ("m2", "JVM", true)]);
    let mut req = request();
    req.platform_name = "Win32".into();

    let legacy_service = Arc::new(foo_service().with_prescan_responses([modules.clone()]));
    h.local(legacy_service.clone()).run(&req, &manual()).await.unwrap();
    assert_eq!(legacy_service.scan_launches().len(), 1);

    let strict_service = Arc::new(foo_service().with_prescan_responses([modules]));
    let strict = h.orchestrator(
        OrchestratorSettings {
            module_selection: ModuleSelection::Strict,
            ..OrchestratorSettings::default()
        },
        strict_service.clone(),
        FsWorkspace::local(h.workspace()),
        // The legacy run above recorded a scan; a fresh marker path keeps this one due.
        Arc::new(MarkerFileOracle::new(h.dir.path().join("strict-marker"), h.clock.clone())),
    );
    let err = strict.run(&req, &manual()).await.unwrap_err();
    assert!(matches!(err, ScanGateError::PrescanFatal));
    assert!(strict_service.scan_launches().is_empty());
}

#[tokio::test]
async fn test_prescan_never_ready_times_out() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(foo_service());
    let orch = h.local(service.clone());

    let err = orch.run(&request(), &manual()).await.unwrap_err();

    assert!(matches!(err, ScanGateError::PrescanTimeout { attempts: 3 }));
    assert_eq!(err.classify().exit_code, 5);
    assert_eq!(service.prescan_fetches(), 3);
    assert_eq!(h.clock.total_slept(), PRESCAN_POLL_INTERVAL * 3);
    assert!(service.scan_launches().is_empty());
}

#[tokio::test]
async fn test_prescan_ready_on_later_attempt() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let not_ready = "<error>Prescan results not available</error>".to_string();
    let service = Arc::new(foo_service().with_prescan_responses([
        not_ready.clone(),
        not_ready,
        prescan_xml(&[("m1", "JVM", false)]),
    ]));
    let orch = h.local(service.clone());

    let outcome = orch.run(&request(), &manual()).await.unwrap();

    assert!(outcome.launched());
    assert_eq!(service.prescan_fetches(), 3);
    assert_eq!(h.clock.sleeps().len(), 2);
}

#[tokio::test]
async fn test_remote_workspace_uploads_staged_copies() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    h.artifact("dist/nested/inner.jar");
    let staging = h.dir.path().join("staging");
    std::fs::create_dir_all(&staging).unwrap();
    std::fs::write(staging.join("stale.jar"), b"old").unwrap();

    let service = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[("m1", "JVM", false)])]));
    let orch = h.orchestrator(
        OrchestratorSettings {
            stage_remote_workspace: true,
            staging_dir: staging.clone(),
            ..OrchestratorSettings::default()
        },
        service.clone(),
        FsWorkspace::remote(h.workspace()),
        h.marker_oracle(),
    );
    let mut req = request();
    req.includes = "dist/**/*.jar".into();

    orch.run(&req, &manual()).await.unwrap();

    let uploaded = service.uploaded_paths();
    assert_eq!(
        uploaded,
        vec![staging.join("dist/app.jar"), staging.join("dist/nested/inner.jar")]
    );
    assert!(uploaded.iter().all(|p| p.starts_with(&staging)));
    assert!(!staging.join("stale.jar").exists());
}

#[tokio::test]
async fn test_remote_workspace_without_staging_uploads_in_place() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let staging = h.dir.path().join("staging");
    let service = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[("m1", "JVM", false)])]));
    let orch = h.orchestrator(
        OrchestratorSettings {
            stage_remote_workspace: false,
            staging_dir: staging.clone(),
            ..OrchestratorSettings::default()
        },
        service.clone(),
        FsWorkspace::remote(h.workspace()),
        h.marker_oracle(),
    );

    orch.run(&request(), &manual()).await.unwrap();

    assert_eq!(service.uploaded_paths(), vec![h.workspace().join("dist/app.jar")]);
    assert!(!staging.exists());
}

#[tokio::test]
async fn test_marker_touched_after_launch_makes_next_run_not_due() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let first = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[("m1", "JVM", false)])]));
    h.local(first.clone()).run(&request(), &manual()).await.unwrap();
    assert!(h.marker().exists());

    h.clock.advance(ChronoDuration::days(3));
    let second = Arc::new(foo_service());
    let outcome = h.local(second.clone()).run(&request(), &manual()).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NotDue { .. }));
    assert!(second.uploaded_paths().is_empty());

    h.clock.advance(ChronoDuration::days(5));
    let third = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[("m1", "JVM", false)])]));
    let outcome = h.local(third.clone()).run(&request(), &manual()).await.unwrap();
    assert!(outcome.launched());
}

#[tokio::test]
async fn test_trigger_policy_skips_disallowed_cause() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(foo_service());
    let orch = h.local(service.clone());
    let mut req = request();
    req.triggers = Some(TriggerPolicy::new(false, true, false));

    let outcome = orch.run(&req, &parse_causes("timer")).await.unwrap();

    assert_eq!(outcome, RunOutcome::SkippedByTrigger);
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_trigger_policy_allows_any_matching_cause() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[("m1", "JVM", false)])]));
    let orch = h.local(service.clone());
    let mut req = request();
    req.triggers = Some(TriggerPolicy::new(false, true, false));

    let outcome = orch.run(&req, &parse_causes("timer,scm")).await.unwrap();

    assert!(outcome.launched());
}

#[tokio::test]
async fn test_remote_freshness_waits_for_running_scan() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(foo_service().with_build_info(&build_info_xml(false, None)));
    let oracle = Arc::new(RemoteStatusOracle::new(service.clone(), h.clock.clone()));
    let orch = h.orchestrator(
        OrchestratorSettings::default(),
        service.clone(),
        FsWorkspace::local(h.workspace()),
        oracle,
    );

    let outcome = orch.run(&request(), &manual()).await.unwrap();

    assert!(matches!(outcome, RunOutcome::NotDue { .. }));
    assert!(service.uploaded_paths().is_empty());
    assert!(service.calls().contains(&ServiceCall::GetBuildInfo("123".into())));
}

#[tokio::test]
async fn test_remote_freshness_transport_failure_is_error() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(foo_service().with_build_info_failure("connection reset"));
    let oracle = Arc::new(RemoteStatusOracle::new(service.clone(), h.clock.clone()));
    let orch = h.orchestrator(
        OrchestratorSettings::default(),
        service.clone(),
        FsWorkspace::local(h.workspace()),
        oracle,
    );

    let err = orch.run(&request(), &manual()).await.unwrap_err();

    assert!(matches!(err, ScanGateError::FreshnessCheck { .. }));
    assert!(service.uploaded_paths().is_empty());
}

#[tokio::test]
async fn test_failed_upload_stops_run() {
    let h = Harness::new();
    h.artifact("dist/a.jar");
    h.artifact("dist/b.jar");
    let service = Arc::new(foo_service().with_failing_upload("a.jar"));
    let orch = h.local(service.clone());

    let err = orch.run(&request(), &manual()).await.unwrap_err();

    assert!(matches!(err, ScanGateError::Upload { .. }));
    assert_eq!(service.uploaded_paths().len(), 1);
    assert!(!service.prescan_started());
}

#[tokio::test]
async fn test_cancelled_run_is_interrupted() {
    let h = Harness::new();
    h.artifact("dist/app.jar");
    let service = Arc::new(foo_service());
    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();
    let orch = h.local(service.clone()).with_cancel_token(token);

    let err = orch.run(&request(), &manual()).await.unwrap_err();

    assert!(matches!(err, ScanGateError::Interrupted(_)));
    assert_eq!(err.classify().exit_code, 130);
}

#[tokio::test]
async fn test_bracketed_workspace_path_still_uploads() {
    let h = Harness::new();
    let root = h.dir.path().join("job[7]");
    std::fs::create_dir_all(root.join("dist")).unwrap();
    std::fs::write(root.join("dist/app.jar"), b"artifact").unwrap();
    let service = Arc::new(foo_service().with_prescan_responses([prescan_xml(&[("m1", "JVM", false)])]));
    let orch = h.orchestrator(
        OrchestratorSettings::default(),
        service.clone(),
        FsWorkspace::local(&root),
        h.marker_oracle(),
    );

    let outcome = orch.run(&request(), &manual()).await.unwrap();

    assert!(outcome.launched());
    assert_eq!(service.uploaded_paths(), vec![root.join("dist/app.jar")]);
}
