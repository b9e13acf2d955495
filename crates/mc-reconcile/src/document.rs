//! Document adapter: the Kubernetes-style wire shape of configs and intents,
//! and its normalization into the typed model.
//!
//! # Purpose
//! Snapshots, intents and pre-rendered converter output arrive as
//! `{kind, metadata: {name, namespace, annotations}, spec}` documents. This
//! module owns that raw shape and converts it to and from [`LowLevelConfig`],
//! [`StoredConfig`] and [`IntentObject`].
//!
//! # Design constraints
//! - Pure conversion, no IO. Callers pick the encoding (YAML, JSON).
//! - The spec payload is decoded against the closed schema for its kind;
//!   anything outside the schema is a [`DocumentError`], never silently kept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::ConfigSpec;
use crate::{
    ConfigKey, ConfigKind, IntentKey, IntentKind, IntentObject, IntentSpec, LowLevelConfig,
    Prerendered, StoredConfig,
};

pub const ISTIO_NETWORKING_API_VERSION: &str = "networking.istio.io/v1alpha3";
pub const MULTICLUSTER_API_VERSION: &str = "multicluster.istio.io/v1alpha1";

fn default_namespace() -> String {
    "default".to_string()
}

// ---------------------------------------------------------------------------
// Raw shapes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub kind: String,
    pub metadata: Metadata,
    /// `null` on redacted output.
    #[serde(default)]
    pub spec: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Identity of an intent as written in a rendered-targets file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentRef {
    pub kind: String,
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

/// Converter output recorded for one intent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderedEntry {
    pub intent: IntentRef,
    #[serde(default)]
    pub targets: Vec<Document>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentError {
    UnknownConfigKind { raw: String },
    UnknownIntentKind { raw: String },
    EmptyName { kind: String },
    MissingSpec { kind: String, name: String },
    InvalidSpec { kind: String, name: String, reason: String },
    Render { key: ConfigKey, reason: String },
    DuplicateIntent { intent: IntentKey },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownConfigKind { raw } => write!(f, "unsupported config kind '{raw}'"),
            Self::UnknownIntentKind { raw } => write!(f, "unsupported intent kind '{raw}'"),
            Self::EmptyName { kind } => write!(f, "{kind} document has an empty metadata.name"),
            Self::MissingSpec { kind, name } => write!(f, "{kind} '{name}' has no spec"),
            Self::InvalidSpec { kind, name, reason } => {
                write!(f, "{kind} '{name}' has an invalid spec: {reason}")
            }
            Self::Render { key, reason } => write!(f, "cannot render {key}: {reason}"),
            Self::DuplicateIntent { intent } => {
                write!(f, "rendered targets for {intent} are recorded more than once")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn checked_name(doc: &Document) -> Result<(), DocumentError> {
    if doc.metadata.name.trim().is_empty() {
        return Err(DocumentError::EmptyName {
            kind: doc.kind.clone(),
        });
    }
    Ok(())
}

type DecodedConfig = (ConfigKey, ConfigSpec, BTreeMap<String, String>);

fn decode_config(doc: Document) -> Result<DecodedConfig, DocumentError> {
    checked_name(&doc)?;
    let kind: ConfigKind = doc
        .kind
        .parse()
        .map_err(|_| DocumentError::UnknownConfigKind {
            raw: doc.kind.clone(),
        })?;
    if doc.spec.is_null() {
        return Err(DocumentError::MissingSpec {
            kind: doc.kind,
            name: doc.metadata.name,
        });
    }
    let spec = ConfigSpec::from_value(kind, doc.spec).map_err(|e| DocumentError::InvalidSpec {
        kind: doc.kind.clone(),
        name: doc.metadata.name.clone(),
        reason: e.to_string(),
    })?;
    let key = ConfigKey::new(kind, doc.metadata.name, doc.metadata.namespace);
    Ok((key, spec, doc.metadata.annotations))
}

pub fn to_low_level(doc: Document) -> Result<LowLevelConfig, DocumentError> {
    let (key, spec, annotations) = decode_config(doc)?;
    Ok(LowLevelConfig {
        key,
        spec: Some(spec),
        annotations,
    })
}

pub fn to_stored(doc: Document) -> Result<StoredConfig, DocumentError> {
    let (key, spec, annotations) = decode_config(doc)?;
    Ok(StoredConfig {
        key,
        spec,
        annotations,
    })
}

fn parse_intent_kind(raw: &str) -> Result<IntentKind, DocumentError> {
    match raw {
        "RemoteServiceBinding" => Ok(IntentKind::RemoteServiceBinding),
        "ServiceExpositionPolicy" => Ok(IntentKind::ServiceExpositionPolicy),
        other => Err(DocumentError::UnknownIntentKind {
            raw: other.to_string(),
        }),
    }
}

pub fn to_intent(doc: Document) -> Result<IntentObject, DocumentError> {
    checked_name(&doc)?;
    let kind = parse_intent_kind(&doc.kind)?;
    let invalid = |e: serde_json::Error| DocumentError::InvalidSpec {
        kind: doc.kind.clone(),
        name: doc.metadata.name.clone(),
        reason: e.to_string(),
    };
    // An intent without a spec is an empty binding/policy.
    let raw = if doc.spec.is_null() {
        Value::Object(Default::default())
    } else {
        doc.spec.clone()
    };
    let spec = match kind {
        IntentKind::RemoteServiceBinding => {
            IntentSpec::RemoteServiceBinding(serde_json::from_value(raw).map_err(invalid)?)
        }
        IntentKind::ServiceExpositionPolicy => {
            IntentSpec::ServiceExpositionPolicy(serde_json::from_value(raw).map_err(invalid)?)
        }
    };
    Ok(IntentObject {
        name: doc.metadata.name,
        namespace: doc.metadata.namespace,
        spec,
    })
}

pub fn to_intent_key(r: &IntentRef) -> Result<IntentKey, DocumentError> {
    Ok(IntentKey::new(
        parse_intent_kind(&r.kind)?,
        r.name.clone(),
        r.namespace.clone(),
    ))
}

/// Build a [`Prerendered`] converter from recorded converter output. An
/// intent may be recorded once.
pub fn to_prerendered(entries: Vec<RenderedEntry>) -> Result<Prerendered, DocumentError> {
    let mut conv = Prerendered::new();
    for entry in entries {
        let key = to_intent_key(&entry.intent)?;
        if conv.contains(&key) {
            return Err(DocumentError::DuplicateIntent { intent: key });
        }
        let targets = entry
            .targets
            .into_iter()
            .map(to_low_level)
            .collect::<Result<Vec<_>, _>>()?;
        conv.insert(key, targets);
    }
    Ok(conv)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a config back to its document form. Redacted configs render with a
/// `null` spec.
pub fn from_low_level(c: &LowLevelConfig) -> Result<Document, DocumentError> {
    let spec = match &c.spec {
        Some(spec) => spec.to_value().map_err(|e| DocumentError::Render {
            key: c.key.clone(),
            reason: e.to_string(),
        })?,
        None => Value::Null,
    };
    Ok(Document {
        api_version: Some(ISTIO_NETWORKING_API_VERSION.to_string()),
        kind: c.key.kind.to_string(),
        metadata: Metadata {
            name: c.key.name.clone(),
            namespace: c.key.namespace.clone(),
            annotations: c.annotations.clone(),
        },
        spec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::VirtualServiceSpec;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn virtual_service_document_normalizes() {
        let c = to_low_level(doc(json!({
            "kind": "VirtualService",
            "metadata": {"name": "svc-a", "namespace": "ns1"},
            "spec": {"hosts": ["a"]}
        })))
        .unwrap();

        assert_eq!(c.key, ConfigKey::new(ConfigKind::VirtualService, "svc-a", "ns1"));
        assert_eq!(
            c.spec,
            Some(ConfigSpec::VirtualService(VirtualServiceSpec {
                hosts: vec!["a".into()],
                ..Default::default()
            }))
        );
    }

    #[test]
    fn namespace_defaults_to_default() {
        let s = to_stored(doc(json!({
            "kind": "Gateway",
            "metadata": {"name": "gw"},
            "spec": {}
        })))
        .unwrap();
        assert_eq!(s.key.namespace, "default");
    }

    #[test]
    fn unknown_kind_and_fields_are_rejected() {
        let err = to_low_level(doc(json!({
            "kind": "EnvoyFilter",
            "metadata": {"name": "f"},
            "spec": {}
        })))
        .unwrap_err();
        assert_eq!(
            err,
            DocumentError::UnknownConfigKind {
                raw: "EnvoyFilter".into()
            }
        );

        let err = to_low_level(doc(json!({
            "kind": "VirtualService",
            "metadata": {"name": "v"},
            "spec": {"hostz": ["a"]}
        })))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidSpec { .. }), "{err}");
    }

    #[test]
    fn missing_spec_is_rejected_for_configs() {
        let err = to_stored(doc(json!({
            "kind": "ServiceEntry",
            "metadata": {"name": "se"}
        })))
        .unwrap_err();
        assert!(matches!(err, DocumentError::MissingSpec { .. }));
    }

    #[test]
    fn intent_document_normalizes() {
        let i = to_intent(doc(json!({
            "apiVersion": MULTICLUSTER_API_VERSION,
            "kind": "RemoteServiceBinding",
            "metadata": {"name": "bind", "namespace": "ns1"},
            "spec": {"remote": [{"cluster": "c2", "services": [{"name": "reviews", "port": 9080}]}]}
        })))
        .unwrap();
        assert_eq!(i.kind(), IntentKind::RemoteServiceBinding);
        match i.spec {
            IntentSpec::RemoteServiceBinding(s) => {
                assert_eq!(s.remote[0].cluster, "c2");
                assert_eq!(s.remote[0].services[0].port, Some(9080));
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn redacted_config_renders_null_spec() {
        let c = LowLevelConfig::new("svc-a", "ns1", VirtualServiceSpec::default()).redacted();
        let d = from_low_level(&c).unwrap();
        assert!(d.spec.is_null());
        assert_eq!(d.kind, "VirtualService");
    }

    #[test]
    fn rendered_entries_become_converter() {
        let entries: Vec<RenderedEntry> = serde_json::from_value(json!([{
            "intent": {"kind": "ServiceExpositionPolicy", "name": "expose", "namespace": "ns1"},
            "targets": [{
                "kind": "Gateway",
                "metadata": {"name": "gw", "namespace": "ns1"},
                "spec": {"selector": {"istio": "ingressgateway"}}
            }]
        }]))
        .unwrap();
        let conv = to_prerendered(entries).unwrap();
        assert_eq!(conv.len(), 1);
    }

    #[test]
    fn repeated_intent_in_rendered_entries_is_rejected() {
        let entries: Vec<RenderedEntry> = serde_json::from_value(json!([
            {
                "intent": {"kind": "RemoteServiceBinding", "name": "bind", "namespace": "ns1"},
                "targets": [{"kind": "Gateway", "metadata": {"name": "gw-1"}, "spec": {}}]
            },
            {
                "intent": {"kind": "RemoteServiceBinding", "name": "bind", "namespace": "ns1"},
                "targets": []
            }
        ]))
        .unwrap();

        let err = to_prerendered(entries).unwrap_err();
        assert_eq!(
            err,
            DocumentError::DuplicateIntent {
                intent: IntentKey::new(IntentKind::RemoteServiceBinding, "bind", "ns1")
            }
        );
    }
}
