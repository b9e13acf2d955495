//! Convenience layer over the three entry points: binds a store, a converter
//! and the local cluster once, and normalizes every outcome into a
//! [`ChangeSet`].

use std::fmt;

use crate::engine::{add_config, delete_config, modify_config, AddOutcome, DeleteOutcome};
use crate::{
    ClusterInfo, ConfigStore, Converter, IntentObject, LowLevelConfig, MissingRealizations,
    ReconcileError,
};

/// What happened to an intent object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntentEvent {
    Added,
    Modified,
    Deleted,
}

impl IntentEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentEvent::Added => "added",
            IntentEvent::Modified => "modified",
            IntentEvent::Deleted => "deleted",
        }
    }
}

impl fmt::Display for IntentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one reconciliation call asks the caller to write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub additions: Vec<LowLevelConfig>,
    pub modifications: Vec<LowLevelConfig>,
    /// Identity-only configs; spec is always `None`.
    pub deletions: Vec<LowLevelConfig>,
    /// Soft failures from the delete path.
    pub missing: Option<MissingRealizations>,
}

impl ChangeSet {
    /// No writes required. Soft failures do not count as writes.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.modifications.is_empty() && self.deletions.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "additions={} modifications={} deletions={} missing={}",
            self.additions.len(),
            self.modifications.len(),
            self.deletions.len(),
            self.missing.as_ref().map(|m| m.len()).unwrap_or(0)
        )
    }
}

impl From<AddOutcome> for ChangeSet {
    fn from(o: AddOutcome) -> Self {
        Self {
            additions: o.additions,
            modifications: o.modifications,
            ..Default::default()
        }
    }
}

impl From<DeleteOutcome> for ChangeSet {
    fn from(o: DeleteOutcome) -> Self {
        Self {
            deletions: o.deletions,
            missing: o.missing,
            ..Default::default()
        }
    }
}

pub struct Reconciler<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    converter: &'a C,
    cluster: &'a ClusterInfo,
}

impl<'a, S, C> Reconciler<'a, S, C>
where
    S: ConfigStore + ?Sized,
    C: Converter + ?Sized,
{
    pub fn new(store: &'a S, converter: &'a C, cluster: &'a ClusterInfo) -> Self {
        Self {
            store,
            converter,
            cluster,
        }
    }

    pub fn add(&self, intent: &IntentObject) -> Result<AddOutcome, ReconcileError> {
        add_config(self.store, self.converter, intent, self.cluster)
    }

    pub fn modify(&self, intent: &IntentObject) -> Result<Vec<LowLevelConfig>, ReconcileError> {
        modify_config(self.store, self.converter, intent, self.cluster)
    }

    pub fn delete(&self, intent: &IntentObject) -> Result<DeleteOutcome, ReconcileError> {
        delete_config(self.store, self.converter, intent, self.cluster)
    }

    /// Dispatch `event` to the matching entry point.
    pub fn plan(
        &self,
        event: IntentEvent,
        intent: &IntentObject,
    ) -> Result<ChangeSet, ReconcileError> {
        let changes = match event {
            IntentEvent::Added => self.add(intent)?.into(),
            IntentEvent::Modified => ChangeSet {
                modifications: self.modify(intent)?,
                ..Default::default()
            },
            IntentEvent::Deleted => self.delete(intent)?.into(),
        };
        tracing::info!(
            intent = %intent.key(),
            event = %event,
            "planned {}",
            changes.summary()
        );
        Ok(changes)
    }
}
