use super::types::ScanGateError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub exit_code: i32,
}

impl ScanGateError {
    /// Classify this error into a stable type name and the process exit code
    /// the CLI reports for it.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            ScanGateError::Config(_) | ScanGateError::Yaml(_) => ErrorClassification {
                error_type: "ConfigError",
                exit_code: 2,
            },
            ScanGateError::ApplicationNotFound(_) => ErrorClassification {
                error_type: "ApplicationNotFoundError",
                exit_code: 3,
            },
            ScanGateError::PrescanFatal => ErrorClassification {
                error_type: "PrescanFatalError",
                exit_code: 4,
            },
            ScanGateError::PrescanTimeout { .. } => ErrorClassification {
                error_type: "TimeoutError",
                exit_code: 5,
            },
            ScanGateError::Interrupted(_) => ErrorClassification {
                error_type: "InterruptedError",
                exit_code: 130,
            },

            ScanGateError::Service(_) => ErrorClassification {
                error_type: "ServiceError",
                exit_code: 1,
            },
            ScanGateError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                exit_code: 1,
            },
            ScanGateError::Upload { .. } => ErrorClassification {
                error_type: "UploadError",
                exit_code: 1,
            },
            ScanGateError::Staging { .. } => ErrorClassification {
                error_type: "StagingError",
                exit_code: 1,
            },
            ScanGateError::Workspace(_) => ErrorClassification {
                error_type: "WorkspaceError",
                exit_code: 1,
            },
            ScanGateError::FreshnessCheck { .. } => ErrorClassification {
                error_type: "FreshnessCheckError",
                exit_code: 1,
            },
            ScanGateError::Xml { .. } => ErrorClassification {
                error_type: "XmlError",
                exit_code: 1,
            },
            ScanGateError::Io(_) => ErrorClassification {
                error_type: "IoError",
                exit_code: 1,
            },
        }
    }
}
