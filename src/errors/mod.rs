pub mod types;
pub mod classification;

pub use types::ScanGateError;
pub use classification::ErrorClassification;
