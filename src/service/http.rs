use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use crate::config::credentials::redact_credentials;
use crate::errors::ScanGateError;
use crate::models::xml::error_message;
use super::provider::ScanService;

pub const DEFAULT_BASE_URL: &str = "https://analysiscenter.veracode.com/api/5.0";

/// Connection settings for [`HttpScanService`].
#[derive(Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Scanning service reached over its HTTP upload API (`*.do` endpoints,
/// basic auth, XML responses).
pub struct HttpScanService {
    client: Client,
    settings: ServiceSettings,
}

impl HttpScanService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ScanGateError> {
        if settings.username.is_empty() {
            return Err(ScanGateError::Config("Scan service username is not configured".into()));
        }
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ScanGateError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), name)
    }

    fn redact(&self, text: &str) -> String {
        redact_credentials(text, &[self.settings.password.as_str()])
    }

    async fn post_form(&self, name: &str, form: &[(&str, &str)]) -> Result<String, ScanGateError> {
        debug!(endpoint = %name, "Calling scan service");
        let resp = self.client
            .post(self.endpoint(name))
            .basic_auth(&self.settings.username, Some(&self.settings.password))
            .form(form)
            .send()
            .await
            .map_err(|e| ScanGateError::Network(self.redact(&format!("{} request failed: {}", name, e))))?;
        self.read_body(name, resp).await
    }

    async fn read_body(&self, name: &str, resp: reqwest::Response) -> Result<String, ScanGateError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ScanGateError::Service(format!(
                "{} rejected the credentials for user {}",
                name, self.settings.username
            )));
        }
        if !status.is_success() {
            return Err(ScanGateError::Service(format!("{} returned HTTP {}", name, status)));
        }
        resp.text()
            .await
            .map_err(|e| ScanGateError::Network(self.redact(&format!("Failed to read {} response: {}", name, e))))
    }

    /// Commands answer `<error>` on failure with a 200 status.
    fn check_command(name: &str, body: &str) -> Result<(), ScanGateError> {
        match error_message(body) {
            Some(message) => Err(ScanGateError::Service(format!("{} failed: {}", name, message))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ScanService for HttpScanService {
    async fn list_applications(&self) -> Result<String, ScanGateError> {
        self.post_form("getapplist.do", &[]).await
    }

    async fn get_build_info(&self, app_id: &str) -> Result<String, ScanGateError> {
        self.post_form("getbuildinfo.do", &[("app_id", app_id)]).await
    }

    async fn begin_prescan(&self, app_id: &str) -> Result<(), ScanGateError> {
        let body = self.post_form("beginprescan.do", &[("app_id", app_id)]).await?;
        Self::check_command("beginprescan.do", &body)
    }

    async fn get_prescan_results(&self, app_id: &str) -> Result<String, ScanGateError> {
        self.post_form("getprescanresults.do", &[("app_id", app_id)]).await
    }

    async fn upload_file(&self, app_id: &str, path: &Path) -> Result<(), ScanGateError> {
        let upload_error = |message: String| ScanGateError::Upload {
            path: path.to_path_buf(),
            message,
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| upload_error(format!("could not read artifact: {}", e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());

        let form = Form::new()
            .text("app_id", app_id.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let resp = self.client
            .post(self.endpoint("uploadfile.do"))
            .basic_auth(&self.settings.username, Some(&self.settings.password))
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_error(self.redact(&e.to_string())))?;
        let body = self
            .read_body("uploadfile.do", resp)
            .await
            .map_err(|e| upload_error(e.to_string()))?;
        Self::check_command("uploadfile.do", &body).map_err(|e| upload_error(e.to_string()))
    }

    async fn create_build(&self, app_id: &str, name: &str) -> Result<(), ScanGateError> {
        let body = self
            .post_form("createbuild.do", &[("app_id", app_id), ("version", name)])
            .await?;
        Self::check_command("createbuild.do", &body)
    }

    async fn begin_scan(
        &self,
        app_id: &str,
        module_id: Option<&str>,
        scan_all_modules: bool,
    ) -> Result<String, ScanGateError> {
        let mut form = vec![("app_id", app_id)];
        if let Some(id) = module_id {
            form.push(("modules", id));
        }
        if scan_all_modules {
            form.push(("scan_all_top_level_modules", "true"));
        }
        let body = self.post_form("beginscan.do", &form).await?;
        Self::check_command("beginscan.do", &body)?;
        Ok(body)
    }

    fn service_name(&self) -> &str {
        "http"
    }
}
