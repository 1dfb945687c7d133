pub mod applications;
pub mod fake;
pub mod http;
pub mod provider;

pub use applications::resolve_application;
pub use http::HttpScanService;
pub use provider::ScanService;
