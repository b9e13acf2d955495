use tracing::{debug, info, warn};

use crate::equality::specs_equal;
use crate::provenance::has_provenance;
use crate::{
    ClusterInfo, ConfigStore, ConvertError, Converter, IntentObject, LowLevelConfig,
    MissingRealization, MissingRealizations, ReconcileError,
};

/// Result of reconciling a newly created intent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Targets the store does not hold yet.
    pub additions: Vec<LowLevelConfig>,
    /// Targets the store holds with a different spec.
    pub modifications: Vec<LowLevelConfig>,
}

impl AddOutcome {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.modifications.is_empty()
    }
}

/// Result of reconciling a removed intent.
///
/// `missing` does not invalidate `deletions`: callers apply the deletions and
/// surface the aggregate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Provenanced targets to delete, with their spec cleared.
    pub deletions: Vec<LowLevelConfig>,
    /// Targets the intent should have realized but the store lacks.
    pub missing: Option<MissingRealizations>,
}

/// How one converter target relates to the store.
enum Observed {
    Absent,
    Drifted,
    InSync,
}

fn convert_one<C: Converter + ?Sized>(
    converter: &C,
    intent: &IntentObject,
    cluster: &ClusterInfo,
) -> Result<Vec<LowLevelConfig>, ConvertError> {
    converter.convert(std::slice::from_ref(intent), cluster)
}

/// Conversion for the paths that compare specs; every target needs a payload.
fn convert_with_specs<C: Converter + ?Sized>(
    converter: &C,
    intent: &IntentObject,
    cluster: &ClusterInfo,
) -> Result<Vec<LowLevelConfig>, ReconcileError> {
    let targets = convert_one(converter, intent, cluster)?;
    if let Some(bad) = targets.iter().find(|t| t.is_redacted()) {
        return Err(ConvertError::for_intent(
            intent.key(),
            format!("converter emitted {} without a spec", bad.key),
        )
        .into());
    }
    Ok(targets)
}

fn observe<S: ConfigStore + ?Sized>(store: &S, target: &LowLevelConfig) -> Observed {
    match store.get(&target.key) {
        None => Observed::Absent,
        Some(stored) => {
            let same = target
                .spec
                .as_ref()
                .map(|spec| specs_equal(spec, &stored.spec))
                .unwrap_or(false);
            if same {
                Observed::InSync
            } else {
                Observed::Drifted
            }
        }
    }
}

/// Compute what must be written to realize a newly created intent.
///
/// Converter order is preserved. Each target lands in `additions`,
/// `modifications`, or neither.
pub fn add_config<S, C>(
    store: &S,
    converter: &C,
    intent: &IntentObject,
    cluster: &ClusterInfo,
) -> Result<AddOutcome, ReconcileError>
where
    S: ConfigStore + ?Sized,
    C: Converter + ?Sized,
{
    let mut out = AddOutcome::default();

    for target in convert_with_specs(converter, intent, cluster)? {
        match observe(store, &target) {
            Observed::Absent => {
                debug!(config = %target.key, "add: not in store");
                out.additions.push(target);
            }
            Observed::Drifted => {
                debug!(config = %target.key, "add: spec differs from store");
                out.modifications.push(target);
            }
            Observed::InSync => {
                debug!(config = %target.key, "add: already in sync");
            }
        }
    }

    Ok(out)
}

/// Compute the modifications needed after an intent was updated.
///
/// Every target must already exist; a single absent target fails the whole
/// call and nothing is returned.
pub fn modify_config<S, C>(
    store: &S,
    converter: &C,
    intent: &IntentObject,
    cluster: &ClusterInfo,
) -> Result<Vec<LowLevelConfig>, ReconcileError>
where
    S: ConfigStore + ?Sized,
    C: Converter + ?Sized,
{
    let mut modifications = Vec::new();

    for target in convert_with_specs(converter, intent, cluster)? {
        match observe(store, &target) {
            Observed::Absent => {
                warn!(
                    intent = %intent.key(),
                    config = %target.key,
                    "modify: target missing from store"
                );
                return Err(ReconcileError::UnknownTarget {
                    intent: intent.key(),
                    target: target.key,
                });
            }
            Observed::Drifted => {
                debug!(config = %target.key, "modify: spec differs from store");
                modifications.push(target);
            }
            Observed::InSync => {
                debug!(config = %target.key, "modify: already in sync");
            }
        }
    }

    Ok(modifications)
}

/// Compute the configs to delete after an intent was removed.
///
/// Only stored configs carrying the provenance annotation are returned, and
/// their spec is cleared: callers delete by identity alone. Missing targets
/// are collected into [`DeleteOutcome::missing`] instead of aborting. Specs
/// are never compared here, so targets without one are accepted.
pub fn delete_config<S, C>(
    store: &S,
    converter: &C,
    intent: &IntentObject,
    cluster: &ClusterInfo,
) -> Result<DeleteOutcome, ReconcileError>
where
    S: ConfigStore + ?Sized,
    C: Converter + ?Sized,
{
    let mut deletions = Vec::new();
    let mut missing = Vec::new();

    for target in convert_one(converter, intent, cluster)? {
        let stored = match store.get(&target.key) {
            None => {
                let m = MissingRealization {
                    intent: intent.key(),
                    target: target.key,
                };
                warn!("{m}");
                missing.push(m);
                continue;
            }
            Some(stored) => stored,
        };

        if has_provenance(&stored.annotations) {
            deletions.push(target.redacted());
        } else {
            info!(
                "Ignoring unprovenanced {} when reconciling deletion",
                target.key
            );
        }
    }

    Ok(DeleteOutcome {
        deletions,
        missing: MissingRealizations::from_causes(missing),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::PROVENANCE_ANNOTATION_KEY;
    use crate::spec::{ConfigSpec, VirtualServiceSpec};
    use crate::{RemoteServiceBindingSpec, StoreSnapshot, StoredConfig};

    fn vs(name: &str, hosts: &[&str]) -> LowLevelConfig {
        LowLevelConfig::new(
            name,
            "ns1",
            VirtualServiceSpec {
                hosts: hosts.iter().map(|h| h.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    fn intent() -> IntentObject {
        IntentObject::binding("bind", "ns1", RemoteServiceBindingSpec::default())
    }

    fn cluster() -> ClusterInfo {
        ClusterInfo::new("c1", "10.0.0.1", 15443)
    }

    fn emits(
        targets: Vec<LowLevelConfig>,
    ) -> impl Fn(&[IntentObject], &ClusterInfo) -> Result<Vec<LowLevelConfig>, ConvertError> {
        move |_, _| Ok(targets.clone())
    }

    fn stored(c: &LowLevelConfig) -> StoredConfig {
        c.clone().into_stored().unwrap()
    }

    #[test]
    fn add_partitions_absent_drifted_and_in_sync() {
        let absent = vs("absent", &["a"]);
        let drifted = vs("drifted", &["a"]);
        let same = vs("same", &["a"]);

        let store = StoreSnapshot::from_configs([stored(&vs("drifted", &["b"])), stored(&same)])
            .unwrap();
        let conv = emits(vec![absent.clone(), drifted.clone(), same]);

        let out = add_config(&store, &conv, &intent(), &cluster()).unwrap();
        assert_eq!(out.additions, vec![absent]);
        assert_eq!(out.modifications, vec![drifted]);
    }

    #[test]
    fn redacted_converter_output_is_rejected() {
        let conv = emits(vec![vs("x", &["a"]).redacted()]);
        let err = add_config(&StoreSnapshot::empty(), &conv, &intent(), &cluster()).unwrap_err();
        assert!(matches!(err, ReconcileError::Convert(_)), "{err}");
    }

    #[test]
    fn delete_accepts_targets_without_spec() {
        let ours = vs("ours", &["a"]);
        let owned = stored(&ours).with_annotation(PROVENANCE_ANNOTATION_KEY, "x");
        let store = StoreSnapshot::from_configs([owned]).unwrap();
        let conv = emits(vec![ours.clone().redacted()]);

        let out = delete_config(&store, &conv, &intent(), &cluster()).unwrap();
        assert_eq!(out.deletions, vec![ours.redacted()]);
        assert!(out.missing.is_none());

        let err = modify_config(&store, &conv, &intent(), &cluster()).unwrap_err();
        assert!(matches!(err, ReconcileError::Convert(_)), "{err}");
    }

    #[test]
    fn modify_is_all_or_nothing() {
        let drifted = vs("drifted", &["a"]);
        let store = StoreSnapshot::from_configs([stored(&vs("drifted", &["b"]))]).unwrap();
        let conv = emits(vec![drifted, vs("absent", &["a"])]);

        let err = modify_config(&store, &conv, &intent(), &cluster()).unwrap_err();
        match err {
            ReconcileError::UnknownTarget { intent: i, target } => {
                assert_eq!(i, intent().key());
                assert_eq!(target.name, "absent");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn delete_redacts_and_skips_unprovenanced() {
        let ours = vs("ours", &["a"]);
        let theirs = vs("theirs", &["a"]);
        let store = StoreSnapshot::from_configs([
            stored(&ours).with_annotation(PROVENANCE_ANNOTATION_KEY, "x"),
            stored(&theirs),
        ])
        .unwrap();
        let conv = emits(vec![ours.clone(), theirs]);

        let out = delete_config(&store, &conv, &intent(), &cluster()).unwrap();
        assert_eq!(out.deletions.len(), 1);
        assert_eq!(out.deletions[0].key, ours.key);
        assert_eq!(out.deletions[0].spec, None::<ConfigSpec>);
        assert!(out.missing.is_none());
    }
}
