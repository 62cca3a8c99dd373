use std::collections::BTreeSet;

use crate::core::ScanWarning;
use crate::store::Store;

pub fn ledger_key(namespace: &str) -> String {
    format!("{namespace}:ledger")
}

/// Durable set of fingerprints considered permanently resolved. Grows
/// monotonically during scans; the only shrinking operation is the explicit
/// administrative reset on the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionLedger {
    fingerprints: BTreeSet<String>,
}

impl ResolutionLedger {
    /// Malformed or unreadable ledger data reads back as an empty set with a
    /// warning; the engine must keep scanning rather than crash.
    pub fn load(store: &dyn Store, namespace: &str, warnings: &mut Vec<ScanWarning>) -> Self {
        let key = ledger_key(namespace);
        match store.get(&key) {
            Ok(None) => Self::default(),
            Ok(Some(raw)) => match serde_json::from_str::<BTreeSet<String>>(&raw) {
                Ok(fingerprints) => Self { fingerprints },
                Err(err) => {
                    warnings.push(ScanWarning::store_read(format!(
                        "resolution ledger at {key} is not valid JSON ({err}); treating as empty"
                    )));
                    Self::default()
                }
            },
            Err(err) => {
                warnings.push(ScanWarning::store_read(format!(
                    "failed to read resolution ledger: {err:#}"
                )));
                Self::default()
            }
        }
    }

    pub fn persist(&self, store: &mut dyn Store, namespace: &str, warnings: &mut Vec<ScanWarning>) {
        let key = ledger_key(namespace);
        match serde_json::to_string(&self.fingerprints) {
            Ok(raw) => {
                if let Err(err) = store.set(&key, &raw) {
                    warnings.push(ScanWarning::store_write(format!(
                        "failed to persist resolution ledger: {err:#}"
                    )));
                }
            }
            Err(err) => warnings.push(ScanWarning::store_write(format!(
                "failed to serialize resolution ledger: {err}"
            ))),
        }
    }

    pub fn add(&mut self, fingerprint: impl Into<String>) -> bool {
        self.fingerprints.insert(fingerprint.into())
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &str> {
        self.fingerprints.iter().map(String::as_str)
    }

    /// Administrative clear. The only caller is the engine's explicit reset
    /// path; no scan path ever clears the ledger.
    pub fn clear(&mut self) {
        self.fingerprints.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn missing_key_loads_as_empty_without_warning() {
        let store = MemoryStore::new();
        let mut warnings = Vec::new();
        let ledger = ResolutionLedger::load(&store, "t", &mut warnings);
        assert!(ledger.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn malformed_ledger_loads_as_empty_with_warning() {
        let mut store = MemoryStore::new();
        store.set("t:ledger", "{{{definitely not json").unwrap();
        let mut warnings = Vec::new();
        let ledger = ResolutionLedger::load(&store, "t", &mut warnings);
        assert!(ledger.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, crate::core::WarningKind::StoreReadFailure);
    }

    #[test]
    fn persist_and_reload_round_trips() {
        let mut store = MemoryStore::new();
        let mut warnings = Vec::new();

        let mut ledger = ResolutionLedger::default();
        assert!(ledger.add("fp-1"));
        assert!(ledger.add("fp-2"));
        assert!(!ledger.add("fp-1"));
        ledger.persist(&mut store, "t", &mut warnings);

        let reloaded = ResolutionLedger::load(&store, "t", &mut warnings);
        assert_eq!(reloaded, ledger);
        assert!(reloaded.contains("fp-1"));
        assert!(!reloaded.contains("fp-3"));
        assert!(warnings.is_empty());
    }
}
