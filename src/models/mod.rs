pub mod application;
pub mod buildinfo;
pub mod prescan;
pub mod request;
pub mod xml;

pub use application::{AppList, RemoteApplication};
pub use buildinfo::{AnalysisUnit, BuildInfo, BuildStatus};
pub use prescan::{PrescanModule, PrescanResults};
pub use request::ScanRequest;
