pub mod aggregator;
pub mod exclusion;
pub mod line_classifier;
pub mod parallel_file_walker;
pub mod pending;

pub use aggregator::ExtensionTotals;
pub use exclusion::{extension_key, EntryKind, ExclusionPolicy};
pub use line_classifier::{classify_line, count_lines, ClassifyError, LineKind, LineTally};
pub use parallel_file_walker::{ParallelFileWalker, ProgressCallback, ScanEvent};
pub use pending::{PendingWork, WorkGuard};
