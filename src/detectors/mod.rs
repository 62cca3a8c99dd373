use anyhow::Result;

use crate::core::{DetectorResult, ScanWarning};
use crate::store::Store;

pub type Probe = Box<dyn Fn() -> Result<bool>>;

/// A named boolean probe plus the text patterns of findings it remediates.
/// Each detector owns its own cache key in the injected store; the cached
/// value is what a failing probe falls back to, so a transient probe error
/// never un-resolves a condition that was last known to hold.
pub struct Detector {
    name: String,
    detection_method: String,
    match_patterns: Vec<String>,
    probe: Probe,
}

impl Detector {
    pub fn new(
        name: impl Into<String>,
        detection_method: impl Into<String>,
        match_patterns: Vec<String>,
        probe: impl Fn() -> Result<bool> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            detection_method: detection_method.into(),
            match_patterns,
            probe: Box::new(probe),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache_key(&self, namespace: &str) -> String {
        format!("{namespace}:detector:{}", self.name)
    }

    fn evaluate(
        &self,
        store: &mut dyn Store,
        namespace: &str,
        warnings: &mut Vec<ScanWarning>,
    ) -> DetectorResult {
        let key = self.cache_key(namespace);
        let implemented = match (self.probe)() {
            Ok(value) => {
                let encoded = if value { "true" } else { "false" };
                if let Err(err) = store.set(&key, encoded) {
                    warnings.push(ScanWarning::store_write(format!(
                        "failed to cache detector state for {}: {err:#}",
                        self.name
                    )));
                }
                value
            }
            Err(err) => {
                let fallback = cached_bool(store, &key);
                warnings.push(ScanWarning::probe_failure(format!(
                    "probe for {} failed ({err:#}); falling back to last known state {fallback}",
                    self.name
                )));
                fallback
            }
        };

        DetectorResult {
            name: self.name.clone(),
            implemented,
            detection_method: self.detection_method.clone(),
            match_patterns: self.match_patterns.clone(),
        }
    }
}

fn cached_bool(store: &dyn Store, key: &str) -> bool {
    match store.get(key) {
        Ok(Some(raw)) => serde_json::from_str::<bool>(&raw).unwrap_or(false),
        Ok(None) | Err(_) => false,
    }
}

/// Ordered battery of detectors. Registration order is a stable contract:
/// the downstream match table tries detectors in exactly this order.
#[derive(Default)]
pub struct DetectorRegistry {
    detectors: Vec<Detector>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, detector: Detector) {
        self.detectors.push(detector);
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn cache_keys(&self, namespace: &str) -> Vec<String> {
        self.detectors
            .iter()
            .map(|d| d.cache_key(namespace))
            .collect()
    }

    /// Runs every probe; a failing probe degrades to its cached value and
    /// never aborts evaluation of the others.
    pub fn evaluate_all(
        &self,
        store: &mut dyn Store,
        namespace: &str,
        warnings: &mut Vec<ScanWarning>,
    ) -> Vec<DetectorResult> {
        self.detectors
            .iter()
            .map(|d| d.evaluate(store, namespace, warnings))
            .collect()
    }
}

pub fn count_true_detectors(results: &[DetectorResult]) -> usize {
    results.iter().filter(|r| r.implemented).count()
}
