use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `<buildinfo>` document describing the most recent build of an application.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildInfo {
    pub build: BuildStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildStatus {
    #[serde(rename = "@results_ready", default)]
    pub results_ready: bool,
    #[serde(rename = "analysis_unit", default)]
    pub analysis_units: Vec<AnalysisUnit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisUnit {
    #[serde(rename = "@published_date", default)]
    pub published_date: Option<String>,
}

impl AnalysisUnit {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl BuildStatus {
    /// The first analysis unit is the one that counts.
    pub fn last_published(&self) -> Option<&AnalysisUnit> {
        self.analysis_units.first()
    }
}
