use std::collections::BTreeSet;

use crate::core::{ScanWarning, Snapshot};
use crate::store::Store;

pub const HISTORY_LIMIT: usize = 10;

pub fn history_key(namespace: &str) -> String {
    format!("{namespace}:history")
}

/// Bounded rolling record of past scans, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotHistory {
    snapshots: Vec<Snapshot>,
}

impl SnapshotHistory {
    pub fn load(store: &dyn Store, namespace: &str, warnings: &mut Vec<ScanWarning>) -> Self {
        let key = history_key(namespace);
        let mut snapshots: Vec<Snapshot> = match store.get(&key) {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(snapshots) => snapshots,
                Err(err) => {
                    warnings.push(ScanWarning::store_read(format!(
                        "snapshot history at {key} is not valid JSON ({err}); treating as empty"
                    )));
                    Vec::new()
                }
            },
            Err(err) => {
                warnings.push(ScanWarning::store_read(format!(
                    "failed to read snapshot history: {err:#}"
                )));
                Vec::new()
            }
        };

        if snapshots.len() > HISTORY_LIMIT {
            warnings.push(ScanWarning::invariant(format!(
                "snapshot history held {} entries (limit {HISTORY_LIMIT}); truncating",
                snapshots.len()
            )));
            snapshots.truncate(HISTORY_LIMIT);
        }

        Self { snapshots }
    }

    pub fn persist(&self, store: &mut dyn Store, namespace: &str, warnings: &mut Vec<ScanWarning>) {
        let key = history_key(namespace);
        match serde_json::to_string(&self.snapshots) {
            Ok(raw) => {
                if let Err(err) = store.set(&key, &raw) {
                    warnings.push(ScanWarning::store_write(format!(
                        "failed to persist snapshot history: {err:#}"
                    )));
                }
            }
            Err(err) => warnings.push(ScanWarning::store_write(format!(
                "failed to serialize snapshot history: {err}"
            ))),
        }
    }

    /// Prepends the snapshot and evicts the oldest beyond the limit.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.snapshots.insert(0, snapshot);
        self.snapshots.truncate(HISTORY_LIMIT);
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Fingerprints observed by any snapshot still in the window.
    pub fn seen_fingerprints(&self) -> BTreeSet<&str> {
        self.snapshots
            .iter()
            .flat_map(|s| s.findings.iter())
            .map(|f| f.fingerprint.as_str())
            .collect()
    }
}
