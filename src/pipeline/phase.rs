use super::state::PhaseName;

pub struct PhaseDefinition {
    pub name: PhaseName,
    pub display_name: &'static str,
    pub description: &'static str,
}

pub static PHASES: &[PhaseDefinition] = &[
    PhaseDefinition {
        name: PhaseName::TriggerCheck,
        display_name: "Trigger Check",
        description: "Match build causes against the trigger policy",
    },
    PhaseDefinition {
        name: PhaseName::ApplicationLookup,
        display_name: "Application Lookup",
        description: "Resolve the application id from the service's application list",
    },
    PhaseDefinition {
        name: PhaseName::FreshnessCheck,
        display_name: "Freshness Check",
        description: "Decide whether enough time has passed since the last scan",
    },
    PhaseDefinition {
        name: PhaseName::Upload,
        display_name: "Artifact Upload",
        description: "Resolve include patterns and upload matching build artifacts",
    },
    PhaseDefinition {
        name: PhaseName::Prescan,
        display_name: "Prescan",
        description: "Start pre-analysis and poll until module results are available",
    },
    PhaseDefinition {
        name: PhaseName::ModuleSelection,
        display_name: "Module Selection",
        description: "Pick the scan scope and veto modules with fatal errors",
    },
    PhaseDefinition {
        name: PhaseName::ScanLaunch,
        display_name: "Scan Launch",
        description: "Ask the service to begin the full scan",
    },
];

pub fn display_name(phase: PhaseName) -> &'static str {
    PHASES
        .iter()
        .find(|p| p.name == phase)
        .map(|p| p.display_name)
        .unwrap_or("Unknown")
}
