pub mod analyzers;
pub mod config;
pub mod error;
pub mod join;
pub mod loader;
pub mod output;

pub use analyzers::analyzer::{analyze, build_report, load_joined};
pub use analyzers::types::DistrictReport;
pub use config::ReportConfig;
pub use error::{ReportError, Result};
