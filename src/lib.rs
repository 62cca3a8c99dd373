pub mod config;
pub mod core;
pub mod detectors;
pub mod diff;
pub mod engine;
pub mod fingerprint;
pub mod history;
pub mod ledger;
pub mod logs;
pub mod matcher;
pub mod store;

pub use crate::core::{
    DetectorResult, Finding, LifecycleStatus, Observation, ScanReport, ScanWarning, Severity,
    Snapshot, WarningKind,
};
pub use detectors::{Detector, DetectorRegistry};
pub use engine::{Engine, EngineOptions, ResetReport};
pub use fingerprint::fingerprint;
pub use store::{FileStore, MemoryStore, Store};
