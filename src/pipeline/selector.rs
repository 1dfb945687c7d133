use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::errors::ScanGateError;
use crate::models::PrescanModule;
use super::state::ScanScope;

/// How far the module walk goes once a platform match is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSelection {
    /// Stop at the first match; modules after it are not checked for
    /// fatal errors.
    #[default]
    Legacy,
    /// Check every module for fatal errors, match or not.
    Strict,
}

impl std::str::FromStr for ModuleSelection {
    type Err = ScanGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            other => Err(ScanGateError::Config(format!("Invalid module selection mode: {}", other))),
        }
    }
}

/// Choose the scan scope from the prescan modules, refusing to scan when an
/// examined module has fatal errors.
pub fn select_scope(
    modules: &[PrescanModule],
    platform_filter: Option<&str>,
    mode: ModuleSelection,
) -> Result<ScanScope, ScanGateError> {
    let mut selected: Option<&PrescanModule> = None;

    for module in modules {
        if selected.is_none() {
            if let Some(filter) = platform_filter {
                if module.platform.contains(filter) && !module.id.is_empty() {
                    selected = Some(module);
                }
            }
        }

        if module.has_fatal_errors {
            warn!(
                module = %module.name,
                platform = %module.platform,
                "Prescan reported fatal errors for module"
            );
            return Err(ScanGateError::PrescanFatal);
        }

        if selected.is_some() && mode == ModuleSelection::Legacy {
            break;
        }
    }

    Ok(match selected {
        Some(module) => {
            info!(module_id = %module.id, platform = %module.platform, "Selected module");
            ScanScope::Module {
                id: module.id.clone(),
                platform: module.platform.clone(),
            }
        }
        None => ScanScope::AllModules,
    })
}
