use std::collections::{BTreeMap, BTreeSet};

use crate::core::{Finding, LifecycleStatus};
use crate::history::SnapshotHistory;
use crate::ledger::ResolutionLedger;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub new: Vec<Finding>,
    pub existing: Vec<Finding>,
    pub reappeared: Vec<Finding>,
    /// Findings present in the previous snapshot but absent from the current
    /// scan. Reported for observability only; nothing here enters the ledger.
    pub resolved: Vec<Finding>,
    /// Fingerprints dropped because the ledger already holds them.
    pub suppressed: Vec<String>,
}

/// Buckets the current findings against the previous snapshot, the rest of
/// the history window and the resolution ledger. Every input finding lands
/// in exactly one of new/existing/reappeared or is suppressed by the ledger.
/// A missing prior snapshot means everything is new and nothing is resolved.
pub fn classify(
    current: Vec<Finding>,
    history: &SnapshotHistory,
    ledger: &ResolutionLedger,
) -> Classification {
    let prior: BTreeSet<&str> = history
        .latest()
        .map(|s| s.fingerprints())
        .unwrap_or_default();
    let seen_earlier = history.seen_fingerprints();

    // Most recent snapshot carrying a fingerprint holds its original
    // first-detected time, carried forward scan over scan.
    let mut first_seen: BTreeMap<&str, &str> = BTreeMap::new();
    for snapshot in history.snapshots() {
        for finding in &snapshot.findings {
            first_seen
                .entry(finding.fingerprint.as_str())
                .or_insert(finding.first_detected.as_str());
        }
    }

    let current_set: BTreeSet<String> = current.iter().map(|f| f.fingerprint.clone()).collect();

    let mut out = Classification::default();
    for mut finding in current {
        if ledger.contains(&finding.fingerprint) {
            out.suppressed.push(finding.fingerprint);
            continue;
        }

        if let Some(first) = first_seen.get(finding.fingerprint.as_str()) {
            finding.first_detected = (*first).to_string();
        }

        if prior.contains(finding.fingerprint.as_str()) {
            finding.lifecycle_status = LifecycleStatus::Existing;
            out.existing.push(finding);
        } else if seen_earlier.contains(finding.fingerprint.as_str()) {
            finding.lifecycle_status = LifecycleStatus::Reappeared;
            out.reappeared.push(finding);
        } else {
            finding.lifecycle_status = LifecycleStatus::New;
            out.new.push(finding);
        }
    }

    if let Some(last) = history.latest() {
        for finding in &last.findings {
            if current_set.contains(&finding.fingerprint) || ledger.contains(&finding.fingerprint)
            {
                continue;
            }
            let mut resolved = finding.clone();
            resolved.lifecycle_status = LifecycleStatus::Resolved;
            out.resolved.push(resolved);
        }
    }

    out
}
