//! Document adapter against YAML input, the format operators hand to the CLI.
//!
//! GREEN when:
//! - a YAML store snapshot normalizes into typed stored configs
//! - a YAML intent and its rendered targets drive a full add plan

use mc_reconcile::document::{self, Document, RenderedEntry};
use mc_reconcile::*;

const STORE_YAML: &str = r#"
- apiVersion: networking.istio.io/v1alpha3
  kind: VirtualService
  metadata:
    name: svc-a
    namespace: ns1
    annotations:
      multicluster.istio.io/provenance: "RemoteServiceBinding bind.ns1"
  spec:
    hosts: ["a"]
    http:
    - route:
      - destination:
          host: a.ns1.global
          port:
            number: 9080
"#;

const INTENT_YAML: &str = r#"
apiVersion: multicluster.istio.io/v1alpha1
kind: RemoteServiceBinding
metadata:
  name: bind
  namespace: ns1
spec:
  remote:
  - cluster: cluster-b
    services:
    - name: a
      port: 9080
"#;

const RENDERED_YAML: &str = r#"
- intent:
    kind: RemoteServiceBinding
    name: bind
    namespace: ns1
  targets:
  - kind: VirtualService
    metadata:
      name: svc-a
      namespace: ns1
    spec:
      hosts: ["a"]
      http:
      - route:
        - destination:
            host: a.ns1.global
            port:
              number: 9080
  - kind: ServiceEntry
    metadata:
      name: a-cluster-b
      namespace: ns1
    spec:
      hosts: ["a.ns1.global"]
      location: MESH_INTERNAL
      resolution: STATIC
      ports:
      - number: 9080
        name: http
        protocol: HTTP
      endpoints:
      - address: 192.168.1.20
        ports:
          http: 15443
"#;

#[test]
fn yaml_inputs_drive_an_add_plan() {
    let docs: Vec<Document> = serde_yaml::from_str(STORE_YAML).unwrap();
    let stored = docs
        .into_iter()
        .map(document::to_stored)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert!(has_provenance(&stored[0].annotations));
    let store = StoreSnapshot::from_configs(stored).unwrap();

    let intent = document::to_intent(serde_yaml::from_str(INTENT_YAML).unwrap()).unwrap();
    let entries: Vec<RenderedEntry> = serde_yaml::from_str(RENDERED_YAML).unwrap();
    let conv = document::to_prerendered(entries).unwrap();
    let cluster = ClusterInfo::new("cluster-a", "192.168.1.10", 15443);

    let out = add_config(&store, &conv, &intent, &cluster).unwrap();

    // VirtualService is already in sync, only the ServiceEntry is new.
    assert!(out.modifications.is_empty());
    assert_eq!(out.additions.len(), 1);
    assert_eq!(
        out.additions[0].key,
        ConfigKey::new(ConfigKind::ServiceEntry, "a-cluster-b", "ns1")
    );

    let rendered = document::from_low_level(&out.additions[0]).unwrap();
    assert_eq!(rendered.spec["location"], "MESH_INTERNAL");
    assert_eq!(rendered.spec["endpoints"][0]["ports"]["http"], 15443);
}
