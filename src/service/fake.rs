//! In-memory scanning service for tests.
//!
//! `ScriptedService` answers from canned documents and records every call,
//! so orchestration tests can assert on exactly what reached the service.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use crate::errors::ScanGateError;
use super::provider::ScanService;

/// Document the service returns while the prescan is still running.
pub const PRESCAN_NOT_READY: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<error>Prescan results not available for the requested build</error>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    ListApplications,
    GetBuildInfo(String),
    BeginPrescan(String),
    GetPrescanResults(String),
    UploadFile { app_id: String, path: PathBuf },
    CreateBuild { app_id: String, name: String },
    BeginScan { app_id: String, module_id: Option<String>, scan_all_modules: bool },
}

#[derive(Debug)]
pub struct ScriptedService {
    applications: String,
    build_info: Result<String, String>,
    prescan_responses: Mutex<VecDeque<String>>,
    failing_uploads: HashSet<String>,
    calls: Mutex<Vec<ServiceCall>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            applications: applist_xml(&[]),
            build_info: Ok(build_info_xml(true, None)),
            prescan_responses: Mutex::new(VecDeque::new()),
            failing_uploads: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_applications(mut self, apps: &[(&str, &str)]) -> Self {
        self.applications = applist_xml(apps);
        self
    }

    pub fn with_application_xml(mut self, xml: &str) -> Self {
        self.applications = xml.to_string();
        self
    }

    pub fn with_build_info(mut self, xml: &str) -> Self {
        self.build_info = Ok(xml.to_string());
        self
    }

    /// Make `get_build_info` fail at the transport level.
    pub fn with_build_info_failure(mut self, message: &str) -> Self {
        self.build_info = Err(message.to_string());
        self
    }

    /// Queue prescan documents; once drained, the service keeps answering
    /// [`PRESCAN_NOT_READY`].
    pub fn with_prescan_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut queue = self.prescan_responses.lock().unwrap_or_else(|e| e.into_inner());
            queue.extend(responses.into_iter().map(Into::into));
        }
        self
    }

    /// Fail uploads whose file name equals `file_name`.
    pub fn with_failing_upload(mut self, file_name: &str) -> Self {
        self.failing_uploads.insert(file_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn uploaded_paths(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ServiceCall::UploadFile { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn prescan_fetches(&self) -> usize {
        self.count(|c| matches!(c, ServiceCall::GetPrescanResults(_)))
    }

    pub fn prescan_started(&self) -> bool {
        self.count(|c| matches!(c, ServiceCall::BeginPrescan(_))) > 0
    }

    pub fn scan_launches(&self) -> Vec<ServiceCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ServiceCall::BeginScan { .. }))
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&ServiceCall) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: ServiceCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

impl Default for ScriptedService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScanService for ScriptedService {
    async fn list_applications(&self) -> Result<String, ScanGateError> {
        self.record(ServiceCall::ListApplications);
        Ok(self.applications.clone())
    }

    async fn get_build_info(&self, app_id: &str) -> Result<String, ScanGateError> {
        self.record(ServiceCall::GetBuildInfo(app_id.to_string()));
        self.build_info.clone().map_err(ScanGateError::Network)
    }

    async fn begin_prescan(&self, app_id: &str) -> Result<(), ScanGateError> {
        self.record(ServiceCall::BeginPrescan(app_id.to_string()));
        Ok(())
    }

    async fn get_prescan_results(&self, app_id: &str) -> Result<String, ScanGateError> {
        self.record(ServiceCall::GetPrescanResults(app_id.to_string()));
        let next = self
            .prescan_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        Ok(next.unwrap_or_else(|| PRESCAN_NOT_READY.to_string()))
    }

    async fn upload_file(&self, app_id: &str, path: &Path) -> Result<(), ScanGateError> {
        self.record(ServiceCall::UploadFile {
            app_id: app_id.to_string(),
            path: path.to_path_buf(),
        });
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.failing_uploads.contains(name) {
            return Err(ScanGateError::Upload {
                path: path.to_path_buf(),
                message: "scripted upload failure".into(),
            });
        }
        Ok(())
    }

    async fn create_build(&self, app_id: &str, name: &str) -> Result<(), ScanGateError> {
        self.record(ServiceCall::CreateBuild {
            app_id: app_id.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    async fn begin_scan(
        &self,
        app_id: &str,
        module_id: Option<&str>,
        scan_all_modules: bool,
    ) -> Result<String, ScanGateError> {
        self.record(ServiceCall::BeginScan {
            app_id: app_id.to_string(),
            module_id: module_id.map(str::to_string),
            scan_all_modules,
        });
        Ok(format!(
            "<buildinfo app_id=\"{}\"><build version=\"scripted\" results_ready=\"false\"/></buildinfo>",
            escape(app_id)
        ))
    }

    fn service_name(&self) -> &str {
        "scripted"
    }
}

pub fn applist_xml(apps: &[(&str, &str)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<applist applist_version=\"1.2\">\n");
    for (id, name) in apps {
        xml.push_str(&format!("  <app app_id=\"{}\" app_name=\"{}\"/>\n", escape(id), escape(name)));
    }
    xml.push_str("</applist>");
    xml
}

/// `modules` are `(id, platform, has_fatal_errors)` triples.
pub fn prescan_xml(modules: &[(&str, &str, bool)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<prescanresults app_id=\"1\" build_id=\"1\">\n");
    for (id, platform, fatal) in modules {
        xml.push_str(&format!(
            "  <module id=\"{}\" name=\"module-{}\" platform=\"{}\" status=\"OK\" has_fatal_errors=\"{}\"/>\n",
            escape(id),
            escape(id),
            escape(platform),
            fatal
        ));
    }
    xml.push_str("</prescanresults>");
    xml
}

pub fn build_info_xml(results_ready: bool, published_date: Option<&str>) -> String {
    let unit = published_date
        .map(|d| format!("<analysis_unit analysis_type=\"Static\" published_date=\"{}\" status=\"Results Ready\"/>", escape(d)))
        .unwrap_or_default();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<buildinfo app_id=\"1\"><build version=\"v1\" results_ready=\"{}\">{}</build></buildinfo>",
        results_ready, unit
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
