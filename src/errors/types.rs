use std::path::PathBuf;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ScanGateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("failed to get application id for app {0}")]
    ApplicationNotFound(String),

    #[error("Scan service error: {0}")]
    Service(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload of {} failed: {message}", path.display())]
    Upload {
        path: PathBuf,
        message: String,
    },

    #[error("Could not prepare local workspace: {message}")]
    Staging {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("freshness check failed: {message}")]
    FreshnessCheck {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("prescan failed for one or more modules, check prescan results")]
    PrescanFatal,

    #[error("Unable to get prescan results after {attempts} attempts")]
    PrescanTimeout { attempts: u32 },

    #[error("Interrupted: {0}")]
    Interrupted(String),

    #[error("Malformed {document} document: {message}")]
    Xml {
        document: &'static str,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ScanGateError {
    pub fn freshness<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::FreshnessCheck {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn staging(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Staging {
            message: message.into(),
            source: Some(source),
        }
    }
}
