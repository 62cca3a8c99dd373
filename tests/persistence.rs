use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use fixwatch::core::{LifecycleStatus, Observation, Severity};
use fixwatch::detectors::{Detector, DetectorRegistry};
use fixwatch::engine::{Engine, EngineOptions};
use fixwatch::store::FileStore;

fn make_temp_state_file() -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);

    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let uniq = format!("fixwatch-persistence-test-{}-{seq}", std::process::id());
    let dir = std::env::temp_dir().join(uniq);
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("state.json")
}

fn cleanup(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::remove_dir_all(parent);
    }
}

fn observation() -> Observation {
    Observation::new(
        "Security Vulnerability",
        "MFA is not implemented",
        "Security Scanner",
        Severity::High,
    )
}

fn registry(implemented: bool) -> DetectorRegistry {
    let mut registry = DetectorRegistry::new();
    registry.register(Detector::new(
        "MFA Implementation",
        "configuration flag probe",
        vec!["mfa".to_string()],
        move || Ok(implemented),
    ));
    registry
}

#[test]
fn classification_survives_a_process_restart() {
    let path = make_temp_state_file();

    {
        let store = FileStore::open(&path).unwrap();
        let mut engine = Engine::new(store, registry(false), EngineOptions::default());
        let report = engine.scan(vec![observation()]);
        assert_eq!(report.new_count, 1);
    }

    // fresh store handle over the same file stands in for a restart
    let store = FileStore::open(&path).unwrap();
    let mut engine = Engine::new(store, registry(false), EngineOptions::default());
    let report = engine.scan(vec![observation()]);
    assert_eq!(report.existing_count, 1);
    assert_eq!(
        report.active_findings[0].lifecycle_status,
        LifecycleStatus::Existing
    );

    cleanup(&path);
}

#[test]
fn ledger_suppression_survives_a_process_restart() {
    let path = make_temp_state_file();

    {
        let store = FileStore::open(&path).unwrap();
        let mut engine = Engine::new(store, registry(true), EngineOptions::default());
        let report = engine.scan(vec![observation()]);
        assert_eq!(report.backend_fixed_findings.len(), 1);
    }

    let store = FileStore::open(&path).unwrap();
    let mut engine = Engine::new(store, registry(false), EngineOptions::default());
    let report = engine.scan(vec![observation()]);
    assert!(report.active_findings.is_empty());
    assert!(report.backend_fixed_findings.is_empty());

    cleanup(&path);
}

#[test]
fn detector_cache_survives_a_process_restart() {
    let path = make_temp_state_file();

    {
        let store = FileStore::open(&path).unwrap();
        let mut engine = Engine::new(store, registry(true), EngineOptions::default());
        engine.scan(vec![]);
    }

    // the probe now fails; the detector must report its persisted state
    let store = FileStore::open(&path).unwrap();
    let mut failing = DetectorRegistry::new();
    failing.register(Detector::new(
        "MFA Implementation",
        "configuration flag probe",
        vec!["mfa".to_string()],
        || anyhow::bail!("probe unavailable"),
    ));
    let mut engine = Engine::new(store, failing, EngineOptions::default());
    let report = engine.scan(vec![]);
    assert_eq!(report.true_detector_count, 1);

    cleanup(&path);
}
