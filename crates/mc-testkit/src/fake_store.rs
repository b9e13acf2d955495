use std::sync::Mutex;

use mc_reconcile::{ChangeSet, ConfigKey, ConfigStore, StoreSnapshot, StoredConfig};

/// Minimal fake store used ONLY for tests.
///
/// Lookups are recorded so tests can assert what the reconciler read.
/// [`FakeStore::apply`] plays the caller's role of writing a change set back.
#[derive(Default)]
pub struct FakeStore {
    snapshot: StoreSnapshot,
    lookups: Mutex<Vec<ConfigKey>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(configs: impl IntoIterator<Item = StoredConfig>) -> Self {
        let mut store = Self::new();
        for c in configs {
            store.put(c);
        }
        store
    }

    pub fn put(&mut self, config: StoredConfig) {
        self.snapshot.put(config);
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Write additions and modifications, then remove deletions by identity.
    pub fn apply(&mut self, changes: &ChangeSet) {
        for c in changes.additions.iter().chain(&changes.modifications) {
            if let Some(stored) = c.clone().into_stored() {
                self.snapshot.put(stored);
            }
        }
        for c in &changes.deletions {
            self.snapshot.remove(&c.key);
        }
    }

    pub fn lookups(&self) -> Vec<ConfigKey> {
        self.lookups
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    pub fn clear_lookups(&self) {
        if let Ok(mut l) = self.lookups.lock() {
            l.clear();
        }
    }
}

impl ConfigStore for FakeStore {
    fn get(&self, key: &ConfigKey) -> Option<StoredConfig> {
        if let Ok(mut l) = self.lookups.lock() {
            l.push(key.clone());
        }
        self.snapshot.get(key)
    }
}
