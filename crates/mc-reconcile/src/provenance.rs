use std::collections::BTreeMap;

use crate::{IntentObject, LowLevelConfig};

/// Annotation marking a stored config as created by this system. Only configs
/// carrying it are ever proposed for deletion.
pub const PROVENANCE_ANNOTATION_KEY: &str = "multicluster.istio.io/provenance";

pub fn has_provenance(annotations: &BTreeMap<String, String>) -> bool {
    annotations.contains_key(PROVENANCE_ANNOTATION_KEY)
}

/// Mark `config` as realized by `intent`. Converters call this on everything
/// they emit so the delete path may later remove it.
pub fn stamp_provenance(config: LowLevelConfig, intent: &IntentObject) -> LowLevelConfig {
    config.with_annotation(PROVENANCE_ANNOTATION_KEY, intent.key().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::VirtualServiceSpec;
    use crate::ServiceExpositionPolicySpec;

    #[test]
    fn stamped_config_carries_intent_identity() {
        let intent =
            IntentObject::exposure("expose", "ns1", ServiceExpositionPolicySpec::default());
        let c = stamp_provenance(
            LowLevelConfig::new("svc-a", "ns1", VirtualServiceSpec::default()),
            &intent,
        );
        assert!(has_provenance(&c.annotations));
        assert_eq!(
            c.annotations.get(PROVENANCE_ANNOTATION_KEY).map(String::as_str),
            Some("ServiceExpositionPolicy expose.ns1")
        );
    }

    #[test]
    fn value_is_irrelevant_only_presence_counts() {
        let mut ann = BTreeMap::new();
        assert!(!has_provenance(&ann));
        ann.insert(PROVENANCE_ANNOTATION_KEY.to_string(), String::new());
        assert!(has_provenance(&ann));
    }
}
