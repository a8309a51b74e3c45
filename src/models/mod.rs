pub mod diagnostic;
pub mod scan_result;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use scan_result::{ExtensionTally, ScanReport, ScanStats};
