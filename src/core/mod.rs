mod detector;
mod finding;
mod report;
mod severity;
mod snapshot;

pub use detector::DetectorResult;
pub use finding::{Finding, LifecycleStatus, Observation};
pub use report::{ScanReport, ScanWarning, WarningKind};
pub use severity::Severity;
pub use snapshot::Snapshot;
