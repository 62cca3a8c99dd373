use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::EffectiveConfig;
use crate::core::{Finding, LifecycleStatus, Observation, ScanReport, ScanWarning, Snapshot};
use crate::detectors::{self, DetectorRegistry};
use crate::diff;
use crate::fingerprint::fingerprint;
use crate::history::SnapshotHistory;
use crate::ledger::{self, ResolutionLedger};
use crate::matcher::{self, RuleTable};
use crate::store::Store;

pub fn true_detector_count_key(namespace: &str) -> String {
    format!("{namespace}:true-detector-count")
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub namespace: String,
    pub audit_dir: Option<PathBuf>,
    pub include_resolved: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            namespace: "fixwatch".to_string(),
            audit_dir: None,
            include_resolved: true,
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &EffectiveConfig) -> Self {
        Self {
            namespace: config.store.namespace.clone(),
            audit_dir: if config.audit.enabled {
                config.audit.log_dir.as_deref().map(PathBuf::from)
            } else {
                None
            },
            include_resolved: config.report.include_resolved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub previous_ledger_len: usize,
    pub cleared_keys: Vec<String>,
    pub log_path: Option<PathBuf>,
}

/// Orchestrates one scan: detector evaluation, fingerprinting, backend-fix
/// auto-move, lifecycle diff, snapshot recording. Holds no locks; the caller
/// guarantees at most one scan runs at a time against a given store.
pub struct Engine<S: Store> {
    store: S,
    registry: DetectorRegistry,
    opts: EngineOptions,
}

static SCAN_SEQ: AtomicU64 = AtomicU64::new(0);

impl<S: Store> Engine<S> {
    pub fn new(store: S, registry: DetectorRegistry, opts: EngineOptions) -> Self {
        Self {
            store,
            registry,
            opts,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.opts
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one scan over the caller-supplied observations. Never fails:
    /// probe and store trouble degrades into `ScanReport.warnings` and the
    /// in-memory classification stays valid for this invocation.
    pub fn scan(&mut self, observations: Vec<Observation>) -> ScanReport {
        let started_at = OffsetDateTime::now_utc();
        let now = format_ts(started_at);
        let mut warnings = Vec::new();

        let results =
            self.registry
                .evaluate_all(&mut self.store, &self.opts.namespace, &mut warnings);
        let true_detector_count = detectors::count_true_detectors(&results);

        let mut ledger = ResolutionLedger::load(&self.store, &self.opts.namespace, &mut warnings);
        let history_before =
            SnapshotHistory::load(&self.store, &self.opts.namespace, &mut warnings);

        // Ledger precedence: a fingerprint recorded as permanently resolved
        // never re-enters the pipeline, regardless of current probe state.
        let mut candidates = Vec::new();
        let mut seen = std::collections::BTreeSet::new();
        for observation in observations {
            let fp = fingerprint(&observation.kind, &observation.message, &observation.source);
            if ledger.contains(&fp) || !seen.insert(fp.clone()) {
                continue;
            }
            candidates.push(Finding {
                kind: observation.kind,
                message: observation.message,
                source: observation.source,
                severity: observation.severity,
                remediation_key: observation.remediation_key,
                fingerprint: fp,
                lifecycle_status: LifecycleStatus::New,
                first_detected: now.clone(),
                last_seen: now.clone(),
                resolved_by: None,
            });
        }

        let table = RuleTable::from_results(&results);
        let moved = matcher::auto_move(candidates, &table, &mut ledger);

        let classification = diff::classify(moved.still_active, &history_before, &ledger);
        let new_count = classification.new.len();
        let existing_count = classification.existing.len();
        let reappeared_count = classification.reappeared.len();
        let resolved_count = classification.resolved.len();

        let mut active = classification.new;
        active.extend(classification.existing);
        active.extend(classification.reappeared);
        active.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.fingerprint.cmp(&b.fingerprint))
        });

        active.retain(|f| {
            if ledger.contains(&f.fingerprint) {
                warnings.push(ScanWarning::invariant(format!(
                    "ledger member {} reached the active set; dropping",
                    f.fingerprint
                )));
                false
            } else {
                true
            }
        });

        let scan_id = next_scan_id(started_at);
        let mut history = history_before;
        history.record(Snapshot {
            scan_id: scan_id.clone(),
            recorded_at: now.clone(),
            timestamp_nanos: started_at.unix_timestamp_nanos(),
            findings: active.clone(),
            true_detector_count,
            auto_fixed_detectors: moved
                .pairings
                .iter()
                .map(|p| p.detector.clone())
                .collect(),
        });

        history.persist(&mut self.store, &self.opts.namespace, &mut warnings);
        ledger.persist(&mut self.store, &self.opts.namespace, &mut warnings);
        let count_key = true_detector_count_key(&self.opts.namespace);
        if let Err(err) = self.store.set(&count_key, &true_detector_count.to_string()) {
            warnings.push(ScanWarning::store_write(format!(
                "failed to persist true-detector count: {err:#}"
            )));
        }

        let mut report = ScanReport {
            schema_version: "1.0".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            scan_id,
            generated_at: now,
            active_findings: active,
            backend_fixed_findings: moved.backend_fixed.clone(),
            resolved_findings: if self.opts.include_resolved {
                classification.resolved
            } else {
                Vec::new()
            },
            new_count,
            existing_count,
            reappeared_count,
            resolved_count,
            true_detector_count,
            warnings,
        };

        if let Some(dir) = self.opts.audit_dir.clone() {
            let finished_at = OffsetDateTime::now_utc();
            if let Err(err) =
                crate::logs::write_scan_log(&dir, started_at, finished_at, &report, &moved.pairings)
            {
                report
                    .warnings
                    .push(ScanWarning::store_write(format!(
                        "failed to write scan audit log: {err:#}"
                    )));
            }
        }

        report
    }

    /// Administrative reset: clears the resolution ledger, every detector's
    /// cached state and the true-detector counter. Leaves snapshot history
    /// untouched. Never called from the scan path; the audit record it
    /// writes carries `command = "reset"` so operators can tell it apart.
    pub fn reset(&mut self) -> Result<ResetReport> {
        let started_at = OffsetDateTime::now_utc();

        let mut ignored = Vec::new();
        let previous_ledger_len =
            ResolutionLedger::load(&self.store, &self.opts.namespace, &mut ignored).len();

        let mut cleared_keys = vec![
            ledger::ledger_key(&self.opts.namespace),
            true_detector_count_key(&self.opts.namespace),
        ];
        cleared_keys.extend(self.registry.cache_keys(&self.opts.namespace));

        for key in &cleared_keys {
            self.store
                .remove(key)
                .with_context(|| format!("reset failed to clear {key}"))?;
        }

        let log_path = match &self.opts.audit_dir {
            Some(dir) => Some(crate::logs::write_reset_log(
                dir,
                started_at,
                OffsetDateTime::now_utc(),
                previous_ledger_len,
                &cleared_keys,
            )?),
            None => None,
        };

        Ok(ResetReport {
            previous_ledger_len,
            cleared_keys,
            log_path,
        })
    }
}

fn next_scan_id(at: OffsetDateTime) -> String {
    let seq = SCAN_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "scan-{}-{}-{seq}",
        std::process::id(),
        at.unix_timestamp_nanos()
    )
}

fn format_ts(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_string())
}
