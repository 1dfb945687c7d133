use serde::{Deserialize, Serialize};

/// An application registered with the scanning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteApplication {
    pub id: String,
    pub name: String,
}

impl std::fmt::Display for RemoteApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// `<applist>` document returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct AppList {
    #[serde(rename = "app", default)]
    pub apps: Vec<AppEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppEntry {
    #[serde(rename = "@app_id")]
    pub app_id: String,
    #[serde(rename = "@app_name")]
    pub app_name: String,
}

impl AppList {
    /// Case-insensitive exact match; the first entry wins when names repeat.
    pub fn find(&self, name: &str) -> Option<RemoteApplication> {
        self.apps
            .iter()
            .find(|app| app.app_name.to_lowercase() == name.to_lowercase())
            .map(|app| RemoteApplication {
                id: app.app_id.clone(),
                name: app.app_name.clone(),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.apps.iter().map(|a| a.app_name.as_str()).collect()
    }
}
