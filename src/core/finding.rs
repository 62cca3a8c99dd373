use crate::core::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    New,
    Existing,
    Reappeared,
    Resolved,
    BackendFixed,
}

impl LifecycleStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            LifecycleStatus::New => "new",
            LifecycleStatus::Existing => "existing",
            LifecycleStatus::Reappeared => "reappeared",
            LifecycleStatus::Resolved => "resolved",
            LifecycleStatus::BackendFixed => "backend_fixed",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw caller-supplied input for one scan, before identity is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub kind: String,
    pub message: String,
    pub source: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_key: Option<String>,
}

impl Observation {
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: source.into(),
            severity,
            remediation_key: None,
        }
    }

    pub fn with_remediation_key(mut self, key: impl Into<String>) -> Self {
        self.remediation_key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: String,
    pub message: String,
    pub source: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_key: Option<String>,
    pub fingerprint: String,
    pub lifecycle_status: LifecycleStatus,
    pub first_detected: String,
    pub last_seen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
}
