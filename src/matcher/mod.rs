use serde::Serialize;

use crate::core::{DetectorResult, Finding, LifecycleStatus};
use crate::ledger::ResolutionLedger;

/// One detector's claim: any finding whose text carries one of these
/// patterns is remediated once the detector reports true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    pub detector: String,
    patterns: Vec<String>,
}

impl MatchRule {
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Ordered rule table derived from the current detector results. Only
/// detectors reporting true contribute rules; order follows detector
/// registration, so first-match-wins is a stable contract rather than an
/// accident of iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<MatchRule>,
}

impl RuleTable {
    pub fn from_results(results: &[DetectorResult]) -> Self {
        let rules = results
            .iter()
            .filter(|r| r.implemented)
            .map(|r| MatchRule {
                detector: r.name.clone(),
                patterns: r
                    .match_patterns
                    .iter()
                    .map(|p| p.to_lowercase())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Case-insensitive substring match over kind, message and source.
    /// Returns the first matching detector's name; a finding matches at most
    /// one detector per scan.
    pub fn first_match(&self, finding: &Finding) -> Option<&str> {
        let kind = finding.kind.to_lowercase();
        let message = finding.message.to_lowercase();
        let source = finding.source.to_lowercase();

        for rule in &self.rules {
            for pattern in &rule.patterns {
                if pattern.is_empty() {
                    continue;
                }
                if kind.contains(pattern) || message.contains(pattern) || source.contains(pattern)
                {
                    return Some(&rule.detector);
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixPairing {
    pub detector: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoMoveOutcome {
    pub still_active: Vec<Finding>,
    pub backend_fixed: Vec<Finding>,
    pub pairings: Vec<FixPairing>,
}

/// Moves findings matched by a true detector out of the active set. Each
/// match is recorded in the ledger immediately, which is what makes the
/// backend-fixed state terminal.
pub fn auto_move(
    findings: Vec<Finding>,
    table: &RuleTable,
    ledger: &mut ResolutionLedger,
) -> AutoMoveOutcome {
    let mut out = AutoMoveOutcome::default();
    for mut finding in findings {
        match table.first_match(&finding) {
            Some(detector) => {
                finding.lifecycle_status = LifecycleStatus::BackendFixed;
                finding.resolved_by = Some(detector.to_string());
                ledger.add(finding.fingerprint.clone());
                out.pairings.push(FixPairing {
                    detector: detector.to_string(),
                    fingerprint: finding.fingerprint.clone(),
                });
                out.backend_fixed.push(finding);
            }
            None => out.still_active.push(finding),
        }
    }
    out
}
