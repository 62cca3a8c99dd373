use anyhow::{Result, bail};

use fixwatch::core::{Observation, Severity, WarningKind};
use fixwatch::detectors::{Detector, DetectorRegistry};
use fixwatch::engine::{Engine, EngineOptions};
use fixwatch::store::{MemoryStore, Store};

fn observation() -> Observation {
    Observation::new(
        "Security Vulnerability",
        "MFA is not implemented",
        "Security Scanner",
        Severity::High,
    )
}

struct WriteFailStore {
    inner: MemoryStore,
}

impl Store for WriteFailStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        bail!("store is read-only today")
    }

    fn remove(&mut self, _key: &str) -> Result<()> {
        bail!("store is read-only today")
    }
}

#[test]
fn malformed_history_json_degrades_to_empty_history() {
    let mut store = MemoryStore::new();
    store
        .set("fixwatch:history", "{not valid json at all")
        .unwrap();

    let mut engine = Engine::new(store, DetectorRegistry::new(), EngineOptions::default());
    let report = engine.scan(vec![observation()]);

    // classified as if history were empty, with the anomaly reported
    assert_eq!(report.new_count, 1);
    assert_eq!(report.active_findings.len(), 1);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::StoreReadFailure)
    );

    // the follow-up scan sees the rewritten, now-valid history
    let second = engine.scan(vec![observation()]);
    assert_eq!(second.existing_count, 1);
    assert!(second.warnings.is_empty());
}

#[test]
fn malformed_ledger_json_degrades_to_empty_ledger() {
    let mut store = MemoryStore::new();
    store.set("fixwatch:ledger", "42 and some trailing junk").unwrap();

    let mut engine = Engine::new(store, DetectorRegistry::new(), EngineOptions::default());
    let report = engine.scan(vec![observation()]);

    assert_eq!(report.new_count, 1);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::StoreReadFailure)
    );
}

#[test]
fn write_failures_surface_as_warnings_not_errors() {
    let store = WriteFailStore {
        inner: MemoryStore::new(),
    };
    let mut registry = DetectorRegistry::new();
    registry.register(Detector::new(
        "SSO Implementation",
        "configuration flag probe",
        vec!["sso".to_string()],
        || Ok(true),
    ));

    let mut engine = Engine::new(store, registry, EngineOptions::default());
    let report = engine.scan(vec![observation()]);

    // the in-memory classification is still valid for this invocation
    assert_eq!(report.new_count, 1);
    assert_eq!(report.active_findings.len(), 1);
    assert_eq!(report.true_detector_count, 1);

    let write_failures = report
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::StoreWriteFailure)
        .count();
    // detector cache, history, ledger and counter writes all failed
    assert!(write_failures >= 4, "got {write_failures} write warnings");
}

#[test]
fn reset_propagates_store_errors() {
    let store = WriteFailStore {
        inner: MemoryStore::new(),
    };
    let mut engine = Engine::new(store, DetectorRegistry::new(), EngineOptions::default());
    assert!(engine.reset().is_err());
}
