use crate::core::Finding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub scan_id: String,
    pub recorded_at: String,
    pub timestamp_nanos: i128,
    pub findings: Vec<Finding>,
    pub true_detector_count: usize,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub auto_fixed_detectors: BTreeSet<String>,
}

impl Snapshot {
    pub fn fingerprints(&self) -> BTreeSet<&str> {
        self.findings
            .iter()
            .map(|f| f.fingerprint.as_str())
            .collect()
    }
}
