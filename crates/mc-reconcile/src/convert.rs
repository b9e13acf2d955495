use std::collections::BTreeMap;

use crate::{ClusterInfo, ConvertError, IntentKey, IntentObject, LowLevelConfig};

/// Translates intent objects into the low-level configs that realize them.
///
/// Must be deterministic for a given (intents, cluster) pair, otherwise the
/// reconciliation loop never converges.
pub trait Converter {
    fn convert(
        &self,
        intents: &[IntentObject],
        cluster: &ClusterInfo,
    ) -> Result<Vec<LowLevelConfig>, ConvertError>;
}

impl<F> Converter for F
where
    F: Fn(&[IntentObject], &ClusterInfo) -> Result<Vec<LowLevelConfig>, ConvertError>,
{
    fn convert(
        &self,
        intents: &[IntentObject],
        cluster: &ClusterInfo,
    ) -> Result<Vec<LowLevelConfig>, ConvertError> {
        self(intents, cluster)
    }
}

/// Converter backed by targets rendered ahead of time, keyed by intent
/// identity. Used for offline planning where the real translation ran
/// elsewhere.
#[derive(Clone, Debug, Default)]
pub struct Prerendered {
    targets: BTreeMap<IntentKey, Vec<LowLevelConfig>>,
}

impl Prerendered {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the output for `intent`, replacing anything registered before.
    pub fn insert(&mut self, intent: IntentKey, configs: Vec<LowLevelConfig>) {
        self.targets.insert(intent, configs);
    }

    pub fn with(mut self, intent: IntentKey, configs: Vec<LowLevelConfig>) -> Self {
        self.insert(intent, configs);
        self
    }

    pub fn contains(&self, intent: &IntentKey) -> bool {
        self.targets.contains_key(intent)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Converter for Prerendered {
    fn convert(
        &self,
        intents: &[IntentObject],
        _cluster: &ClusterInfo,
    ) -> Result<Vec<LowLevelConfig>, ConvertError> {
        let mut out = Vec::new();
        for intent in intents {
            let key = intent.key();
            match self.targets.get(&key) {
                Some(configs) => out.extend(configs.iter().cloned()),
                None => {
                    return Err(ConvertError::for_intent(key, "no rendered targets"));
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{DestinationRuleSpec, VirtualServiceSpec};
    use crate::RemoteServiceBindingSpec;

    fn cluster() -> ClusterInfo {
        ClusterInfo::new("c1", "10.0.0.1", 15443)
    }

    #[test]
    fn prerendered_concatenates_in_intent_order() {
        let a = IntentObject::binding("a", "ns1", RemoteServiceBindingSpec::default());
        let b = IntentObject::binding("b", "ns1", RemoteServiceBindingSpec::default());
        let conv = Prerendered::new()
            .with(
                a.key(),
                vec![LowLevelConfig::new("a-vs", "ns1", VirtualServiceSpec::default())],
            )
            .with(
                b.key(),
                vec![LowLevelConfig::new(
                    "b-dr",
                    "ns1",
                    DestinationRuleSpec {
                        host: "b".into(),
                        ..Default::default()
                    },
                )],
            );

        let out = conv.convert(&[b, a], &cluster()).unwrap();
        let names: Vec<_> = out.iter().map(|c| c.key.name.as_str()).collect();
        assert_eq!(names, ["b-dr", "a-vs"]);
    }

    #[test]
    fn prerendered_fails_for_unknown_intent() {
        let a = IntentObject::binding("a", "ns1", RemoteServiceBindingSpec::default());
        let err = Prerendered::new().convert(&[a.clone()], &cluster()).unwrap_err();
        assert_eq!(err.intent, Some(a.key()));
    }

    #[test]
    fn closures_are_converters() {
        type Out = Result<Vec<LowLevelConfig>, ConvertError>;
        let conv = |_: &[IntentObject], _: &ClusterInfo| -> Out { Err(ConvertError::new("boom")) };
        assert!(conv.convert(&[], &cluster()).is_err());
    }
}
