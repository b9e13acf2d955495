use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

const CONFIG: &str = r#"
cluster:
  name: "cluster-east"
  gateway_ip: "10.0.0.1"
  gateway_port: 15443
reconcile:
  missing_realization: "warn"
"#;

const INTENT: &str = r#"
apiVersion: multicluster.istio.io/v1alpha1
kind: RemoteServiceBinding
metadata:
  name: bind
  namespace: ns1
spec:
  remote:
    - cluster: cluster-west
      services:
        - name: reviews
          port: 9080
"#;

const RENDERED: &str = r#"
- intent:
    kind: RemoteServiceBinding
    name: bind
    namespace: ns1
  targets:
    - kind: VirtualService
      metadata:
        name: reviews-bind
        namespace: ns1
        annotations:
          multicluster.istio.io/provenance: "RemoteServiceBinding bind.ns1"
      spec:
        hosts: ["reviews.ns1.svc.cluster.local"]
"#;

const STORE_PROVENANCED: &str = r#"
kind: VirtualService
metadata:
  name: reviews-bind
  namespace: ns1
  annotations:
    multicluster.istio.io/provenance: "RemoteServiceBinding bind.ns1"
spec:
  hosts: ["reviews.ns1.svc.cluster.local"]
"#;

fn write(dir: &Path, name: &str, body: &str) -> String {
    let p = dir.join(name);
    fs::write(&p, body).unwrap();
    p.to_string_lossy().to_string()
}

fn plan(dir: &Path, store: &str, event: &str) -> Command {
    let config = write(dir, "config.yaml", CONFIG);
    let store = write(dir, "store.yaml", store);
    let rendered = write(dir, "rendered.yaml", RENDERED);
    let intent = write(dir, "intent.yaml", INTENT);

    let mut cmd = Command::cargo_bin("mc").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .args(["plan", "--config", &config])
        .args(["--store", &store])
        .args(["--rendered", &rendered])
        .args(["--intent", &intent])
        .args(["--event", event]);
    cmd
}

fn stdout_json(out: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout must be JSON")
}

#[test]
fn add_against_empty_store_reports_addition() {
    let dir = tempfile::tempdir().unwrap();
    let out = plan(dir.path(), "", "add").output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let v = stdout_json(&out);
    assert_eq!(v["event"], "added");
    assert_eq!(v["intent"], "RemoteServiceBinding bind.ns1");
    assert_eq!(v["cluster"], "cluster-east");
    assert_eq!(v["additions"][0]["metadata"]["name"], "reviews-bind");
    assert_eq!(v["modifications"].as_array().unwrap().len(), 0);
    assert_eq!(v["config_hash"].as_str().unwrap().len(), 64);
}

#[test]
fn add_when_in_sync_reports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = plan(dir.path(), STORE_PROVENANCED, "add").output().unwrap();
    assert!(out.status.success());

    let v = stdout_json(&out);
    assert!(v["additions"].as_array().unwrap().is_empty());
    assert!(v["modifications"].as_array().unwrap().is_empty());
}

#[test]
fn delete_emits_identity_only_documents() {
    let dir = tempfile::tempdir().unwrap();
    let out = plan(dir.path(), STORE_PROVENANCED, "delete").output().unwrap();
    assert!(out.status.success());

    let v = stdout_json(&out);
    let del = &v["deletions"][0];
    assert_eq!(del["kind"], "VirtualService");
    assert_eq!(del["metadata"]["name"], "reviews-bind");
    assert!(del["spec"].is_null());
    assert!(v["missing"].as_array().unwrap().is_empty());
}

#[test]
fn modify_with_unknown_target_fails() {
    let dir = tempfile::tempdir().unwrap();
    plan(dir.path(), "", "modify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("makes unknown config"));
}

#[test]
fn invalid_event_is_rejected_by_parser() {
    let dir = tempfile::tempdir().unwrap();
    plan(dir.path(), "", "upsert").assert().failure();
}
