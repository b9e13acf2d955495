use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use mc_reconcile::{
    stamp_provenance, ClusterInfo, ConvertError, Converter, IntentKey, IntentObject,
    LowLevelConfig,
};

/// Table-driven converter for tests.
///
/// Output is stamped with provenance for the intent that produced it, the way
/// a real converter marks what it owns. Failure can be injected per intent.
#[derive(Default)]
pub struct FakeConverter {
    outputs: BTreeMap<IntentKey, Vec<LowLevelConfig>>,
    failures: BTreeMap<IntentKey, String>,
    calls: AtomicUsize,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renders(mut self, intent: &IntentObject, configs: Vec<LowLevelConfig>) -> Self {
        let stamped = configs
            .into_iter()
            .map(|c| stamp_provenance(c, intent))
            .collect();
        self.outputs.insert(intent.key(), stamped);
        self
    }

    pub fn fails(mut self, intent: &IntentObject, reason: impl Into<String>) -> Self {
        self.failures.insert(intent.key(), reason.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Converter for FakeConverter {
    fn convert(
        &self,
        intents: &[IntentObject],
        _cluster: &ClusterInfo,
    ) -> Result<Vec<LowLevelConfig>, ConvertError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut out = Vec::new();
        for intent in intents {
            let key = intent.key();
            if let Some(reason) = self.failures.get(&key) {
                return Err(ConvertError::for_intent(key, reason.clone()));
            }
            // Unknown intents realize nothing.
            if let Some(configs) = self.outputs.get(&key) {
                out.extend(configs.iter().cloned());
            }
        }
        Ok(out)
    }
}
