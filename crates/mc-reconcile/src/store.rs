use std::collections::BTreeMap;

use crate::{ConfigKey, StoredConfig};

/// Read-only view of the mesh config store.
///
/// Implementations must not mutate state on lookup and must return consistent
/// answers for repeated lookups within one reconciliation call.
pub trait ConfigStore {
    fn get(&self, key: &ConfigKey) -> Option<StoredConfig>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for &S {
    fn get(&self, key: &ConfigKey) -> Option<StoredConfig> {
        (**self).get(key)
    }
}

/// In-memory store contents captured at one point in time, keyed by identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    configs: BTreeMap<ConfigKey, StoredConfig>,
}

/// Two stored configs claimed the same identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateConfig {
    pub key: ConfigKey,
}

impl std::fmt::Display for DuplicateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store snapshot holds {} more than once", self.key)
    }
}

impl std::error::Error for DuplicateConfig {}

impl StoreSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot, rejecting repeated identities.
    pub fn from_configs(
        configs: impl IntoIterator<Item = StoredConfig>,
    ) -> Result<Self, DuplicateConfig> {
        let mut snap = Self::empty();
        for c in configs {
            if snap.configs.contains_key(&c.key) {
                return Err(DuplicateConfig { key: c.key });
            }
            snap.configs.insert(c.key.clone(), c);
        }
        Ok(snap)
    }

    /// Insert or replace by identity.
    pub fn put(&mut self, config: StoredConfig) -> Option<StoredConfig> {
        self.configs.insert(config.key.clone(), config)
    }

    pub fn remove(&mut self, key: &ConfigKey) -> Option<StoredConfig> {
        self.configs.remove(key)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredConfig> {
        self.configs.values()
    }
}

impl ConfigStore for StoreSnapshot {
    fn get(&self, key: &ConfigKey) -> Option<StoredConfig> {
        self.configs.get(key).cloned()
    }
}
