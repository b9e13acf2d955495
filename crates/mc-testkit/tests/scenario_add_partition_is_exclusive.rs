//! Every target of an add plan is classified exactly once: addition XOR
//! modification XOR nothing, with converter order kept inside each list.

use mc_reconcile::add_config;
use mc_testkit::builders::*;
use mc_testkit::{FakeConverter, FakeStore};

#[test]
fn each_target_appears_at_most_once() {
    let intent = binding("bind", "ns1", "cluster-b", "svc");
    let targets = vec![
        virtual_service("v0", "ns1", &["h0"]),
        virtual_service("v1", "ns1", &["h1"]),
        virtual_service("v2", "ns1", &["h2"]),
        virtual_service("v3", "ns1", &["h3"]),
        virtual_service("v4", "ns1", &["h4"]),
        virtual_service("v5", "ns1", &["h5"]),
    ];
    let conv = FakeConverter::new().renders(&intent, targets);

    // v1, v4 in sync; v2, v5 drifted; v0, v3 absent.
    let store = FakeStore::with(
        [
            virtual_service("v1", "ns1", &["h1"]),
            virtual_service("v4", "ns1", &["h4"]),
            virtual_service("v2", "ns1", &["stale"]),
            virtual_service("v5", "ns1", &["stale"]),
        ]
        .into_iter()
        .filter_map(|c| c.into_stored()),
    );

    let out = add_config(&store, &conv, &intent, &cluster()).unwrap();

    let added: Vec<_> = out.additions.iter().map(|c| c.key.name.as_str()).collect();
    let modified: Vec<_> = out
        .modifications
        .iter()
        .map(|c| c.key.name.as_str())
        .collect();
    assert_eq!(added, ["v0", "v3"]);
    assert_eq!(modified, ["v2", "v5"]);

    for a in &out.additions {
        assert!(!out.modifications.iter().any(|m| m.key == a.key));
    }
}
