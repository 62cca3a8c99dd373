use crate::core::Finding;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    ProbeFailure,
    StoreReadFailure,
    StoreWriteFailure,
    InvariantViolation,
}

impl WarningKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            WarningKind::ProbeFailure => "probe_failure",
            WarningKind::StoreReadFailure => "store_read_failure",
            WarningKind::StoreWriteFailure => "store_write_failure",
            WarningKind::InvariantViolation => "invariant_violation",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl ScanWarning {
    pub fn probe_failure(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ProbeFailure,
            message: message.into(),
        }
    }

    pub fn store_read(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StoreReadFailure,
            message: message.into(),
        }
    }

    pub fn store_write(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StoreWriteFailure,
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::InvariantViolation,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub schema_version: String,
    pub tool_version: String,
    pub scan_id: String,
    pub generated_at: String,
    pub active_findings: Vec<Finding>,
    pub backend_fixed_findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolved_findings: Vec<Finding>,
    pub new_count: usize,
    pub existing_count: usize,
    pub reappeared_count: usize,
    pub resolved_count: usize,
    pub true_detector_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanWarning>,
}
