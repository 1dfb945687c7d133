pub mod clock;
pub mod interrupt;
pub mod launcher;
pub mod orchestrator;
pub mod phase;
pub mod poller;
pub mod selector;
pub mod state;
pub mod uploader;

pub use orchestrator::ScanOrchestrator;
pub use selector::ModuleSelection;
pub use state::{OrchestratorSettings, RunOutcome, ScanScope};
