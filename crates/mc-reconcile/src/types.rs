use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::spec::ConfigSpec;

// ---------------------------------------------------------------------------
// Low-level config identity
// ---------------------------------------------------------------------------

/// Kinds of low-level mesh config the engine knows how to compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigKind {
    VirtualService,
    DestinationRule,
    ServiceEntry,
    Gateway,
}

impl ConfigKind {
    pub const ALL: [ConfigKind; 4] = [
        ConfigKind::VirtualService,
        ConfigKind::DestinationRule,
        ConfigKind::ServiceEntry,
        ConfigKind::Gateway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKind::VirtualService => "VirtualService",
            ConfigKind::DestinationRule => "DestinationRule",
            ConfigKind::ServiceEntry => "ServiceEntry",
            ConfigKind::Gateway => "Gateway",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown config kind '{s}'"))
    }
}

/// (kind, name, namespace): the only identity a config has.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey {
    pub kind: ConfigKind,
    pub name: String,
    pub namespace: String,
}

impl ConfigKey {
    pub fn new(kind: ConfigKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.kind, self.name, self.namespace)
    }
}

// ---------------------------------------------------------------------------
// Low-level configs
// ---------------------------------------------------------------------------

/// A config produced by the converter for one reconciliation call.
///
/// `spec` is always `Some` when produced. The delete path hands configs back
/// with `spec == None` so callers can only act on the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LowLevelConfig {
    pub key: ConfigKey,
    pub spec: Option<ConfigSpec>,
    pub annotations: BTreeMap<String, String>,
}

impl LowLevelConfig {
    /// Build a config whose kind is taken from the payload, so the two can
    /// never disagree.
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        spec: impl Into<ConfigSpec>,
    ) -> Self {
        let spec = spec.into();
        Self {
            key: ConfigKey::new(spec.kind(), name, namespace),
            spec: Some(spec),
            annotations: BTreeMap::new(),
        }
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> ConfigKind {
        self.key.kind
    }

    /// Drop the payload, keeping identity and annotations.
    pub fn redacted(mut self) -> Self {
        self.spec = None;
        self
    }

    pub fn is_redacted(&self) -> bool {
        self.spec.is_none()
    }
}

/// The store's copy of a config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredConfig {
    pub key: ConfigKey,
    pub spec: ConfigSpec,
    pub annotations: BTreeMap<String, String>,
}

impl StoredConfig {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        spec: impl Into<ConfigSpec>,
    ) -> Self {
        let spec = spec.into();
        Self {
            key: ConfigKey::new(spec.kind(), name, namespace),
            spec,
            annotations: BTreeMap::new(),
        }
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

impl LowLevelConfig {
    /// What the store holds once this config is applied. Redacted configs
    /// have no stored form.
    pub fn into_stored(self) -> Option<StoredConfig> {
        let spec = self.spec?;
        Some(StoredConfig {
            key: self.key,
            spec,
            annotations: self.annotations,
        })
    }
}

// ---------------------------------------------------------------------------
// Cluster metadata
// ---------------------------------------------------------------------------

/// Local cluster identity and the coordinates remote clusters use to reach
/// its ingress gateway. Passed through to the converter untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub name: String,
    pub gateway_ip: String,
    pub gateway_port: u16,
}

impl ClusterInfo {
    pub fn new(name: impl Into<String>, gateway_ip: impl Into<String>, gateway_port: u16) -> Self {
        Self {
            name: name.into(),
            gateway_ip: gateway_ip.into(),
            gateway_port,
        }
    }
}

// ---------------------------------------------------------------------------
// Intent objects
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    RemoteServiceBinding,
    ServiceExpositionPolicy,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::RemoteServiceBinding => "RemoteServiceBinding",
            IntentKind::ServiceExpositionPolicy => "ServiceExpositionPolicy",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an intent object, used in diagnostics and provenance values.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntentKey {
    pub kind: IntentKind,
    pub name: String,
    pub namespace: String,
}

impl IntentKey {
    pub fn new(kind: IntentKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for IntentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.kind, self.name, self.namespace)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentSpec {
    RemoteServiceBinding(RemoteServiceBindingSpec),
    ServiceExpositionPolicy(ServiceExpositionPolicySpec),
}

impl IntentSpec {
    pub fn kind(&self) -> IntentKind {
        match self {
            IntentSpec::RemoteServiceBinding(_) => IntentKind::RemoteServiceBinding,
            IntentSpec::ServiceExpositionPolicy(_) => IntentKind::ServiceExpositionPolicy,
        }
    }
}

/// Consume services published by remote clusters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteServiceBindingSpec {
    #[serde(default)]
    pub remote: Vec<RemoteCluster>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteCluster {
    pub cluster: String,
    #[serde(default)]
    pub services: Vec<RemoteService>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteService {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
}

/// Expose local services to named remote clusters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceExpositionPolicySpec {
    #[serde(default)]
    pub exposed: Vec<ExposedService>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExposedService {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    #[serde(default)]
    pub clusters: Vec<String>,
}

/// A high-level desired-state record. Owned by the caller; the engine only
/// reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentObject {
    pub name: String,
    pub namespace: String,
    pub spec: IntentSpec,
}

impl IntentObject {
    pub fn binding(
        name: impl Into<String>,
        namespace: impl Into<String>,
        spec: RemoteServiceBindingSpec,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            spec: IntentSpec::RemoteServiceBinding(spec),
        }
    }

    pub fn exposure(
        name: impl Into<String>,
        namespace: impl Into<String>,
        spec: ServiceExpositionPolicySpec,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            spec: IntentSpec::ServiceExpositionPolicy(spec),
        }
    }

    pub fn kind(&self) -> IntentKind {
        self.spec.kind()
    }

    pub fn key(&self) -> IntentKey {
        IntentKey::new(self.kind(), self.name.clone(), self.namespace.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::VirtualServiceSpec;

    #[test]
    fn config_key_display_is_kind_then_dotted_name() {
        let k = ConfigKey::new(ConfigKind::VirtualService, "svc-a", "ns1");
        assert_eq!(k.to_string(), "VirtualService svc-a.ns1");
    }

    #[test]
    fn config_kind_round_trips_through_str() {
        for k in ConfigKind::ALL {
            assert_eq!(k.as_str().parse::<ConfigKind>().unwrap(), k);
        }
        assert!("EnvoyFilter".parse::<ConfigKind>().is_err());
    }

    #[test]
    fn kind_is_derived_from_payload() {
        let c = LowLevelConfig::new("svc-a", "ns1", VirtualServiceSpec::default());
        assert_eq!(c.kind(), ConfigKind::VirtualService);
    }

    #[test]
    fn redaction_keeps_identity_and_annotations() {
        let c = LowLevelConfig::new("svc-a", "ns1", VirtualServiceSpec::default())
            .with_annotation("a", "b");
        let r = c.clone().redacted();
        assert!(r.is_redacted());
        assert_eq!(r.key, c.key);
        assert_eq!(r.annotations, c.annotations);

        assert!(r.into_stored().is_none());
    }

    #[test]
    fn intent_key_names_kind_and_identity() {
        let i = IntentObject::binding("bind", "ns1", RemoteServiceBindingSpec::default());
        assert_eq!(i.key().to_string(), "RemoteServiceBinding bind.ns1");
    }
}
