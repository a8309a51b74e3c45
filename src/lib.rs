pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod scanner;
pub mod utils;

// 重新导出常用模块
pub use config::Config;
pub use error::ScanError;
pub use models::{Diagnostic, DiagnosticKind, ExtensionTally, ScanReport};
pub use scanner::{ExclusionPolicy, ExtensionTotals, ParallelFileWalker, ScanEvent};
