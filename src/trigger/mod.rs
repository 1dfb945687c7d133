use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Why the current build ran.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseKind {
    Manual,
    Scm,
    Timer,
    /// Any cause the policy cannot name (upstream job, remote API call, ...).
    Other(String),
}

impl CauseKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manual => "manual",
            Self::Scm => "scm",
            Self::Timer => "timer",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for CauseKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "manual" | "user" => Self::Manual,
            "scm" => Self::Scm,
            "timer" | "periodic" | "cron" => Self::Timer,
            other => Self::Other(other.to_string()),
        })
    }
}

impl std::fmt::Display for CauseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma-separated cause list such as `"scm,timer"`.
pub fn parse_causes(raw: &str) -> Vec<CauseKind> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Which build causes are allowed to start a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerPolicy {
    allowed: HashMap<CauseKind, bool>,
}

impl TriggerPolicy {
    pub fn new(manual: bool, scm: bool, timer: bool) -> Self {
        let mut allowed = HashMap::new();
        allowed.insert(CauseKind::Manual, manual);
        allowed.insert(CauseKind::Scm, scm);
        allowed.insert(CauseKind::Timer, timer);
        Self { allowed }
    }

    /// Unlisted causes are never allowed.
    pub fn allows(&self, cause: &CauseKind) -> bool {
        self.allowed.get(cause).copied().unwrap_or(false)
    }

    /// True when at least one cause kind is switched on.
    pub fn overrides_any(&self) -> bool {
        self.allowed.values().any(|v| *v)
    }
}

/// Decide whether this build may start a scan. No policy means always.
pub fn should_run(policy: Option<&TriggerPolicy>, causes: &[CauseKind]) -> bool {
    match policy {
        None => true,
        Some(policy) => causes.iter().any(|c| policy.allows(c)),
    }
}
