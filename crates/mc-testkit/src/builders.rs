//! Shorthand constructors for the configs and intents scenario tests use.

use mc_reconcile::spec::{
    ClientTls, ClientTlsMode, Destination, DestinationRuleSpec, HttpRoute, Location, PortSelector,
    Resolution, RouteDestination, ServiceEntrySpec, ServicePort, TrafficPolicy,
    VirtualServiceSpec, WorkloadEntry,
};
use mc_reconcile::{
    ClusterInfo, ExposedService, IntentObject, LowLevelConfig, RemoteCluster, RemoteService,
    RemoteServiceBindingSpec, ServiceExpositionPolicySpec,
};

pub fn cluster() -> ClusterInfo {
    ClusterInfo::new("cluster-a", "192.168.1.10", 15443)
}

pub fn virtual_service(name: &str, namespace: &str, hosts: &[&str]) -> LowLevelConfig {
    LowLevelConfig::new(
        name,
        namespace,
        VirtualServiceSpec {
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        },
    )
}

/// VirtualService routing `host` to `dest:port`.
pub fn routed_virtual_service(
    name: &str,
    namespace: &str,
    host: &str,
    dest: &str,
    port: u32,
) -> LowLevelConfig {
    LowLevelConfig::new(
        name,
        namespace,
        VirtualServiceSpec {
            hosts: vec![host.to_string()],
            http: vec![HttpRoute {
                route: vec![RouteDestination {
                    destination: Destination {
                        host: dest.to_string(),
                        subset: None,
                        port: Some(PortSelector { number: port }),
                    },
                    weight: None,
                }],
                ..Default::default()
            }],
            ..Default::default()
        },
    )
}

pub fn destination_rule(name: &str, namespace: &str, host: &str) -> LowLevelConfig {
    LowLevelConfig::new(
        name,
        namespace,
        DestinationRuleSpec {
            host: host.to_string(),
            traffic_policy: Some(TrafficPolicy {
                tls: Some(ClientTls {
                    mode: ClientTlsMode::IstioMutual,
                    ..Default::default()
                }),
            }),
            ..Default::default()
        },
    )
}

/// ServiceEntry for `host` reachable through a remote gateway.
pub fn service_entry(
    name: &str,
    namespace: &str,
    host: &str,
    gateway_ip: &str,
    port: u32,
) -> LowLevelConfig {
    LowLevelConfig::new(
        name,
        namespace,
        ServiceEntrySpec {
            hosts: vec![host.to_string()],
            ports: vec![ServicePort {
                number: port,
                name: "http".to_string(),
                protocol: "HTTP".to_string(),
            }],
            location: Location::MeshInternal,
            resolution: Resolution::Static,
            endpoints: vec![WorkloadEntry {
                address: gateway_ip.to_string(),
                ports: [("http".to_string(), 15443)].into_iter().collect(),
                ..Default::default()
            }],
            ..Default::default()
        },
    )
}

pub fn binding(name: &str, namespace: &str, remote_cluster: &str, service: &str) -> IntentObject {
    IntentObject::binding(
        name,
        namespace,
        RemoteServiceBindingSpec {
            remote: vec![RemoteCluster {
                cluster: remote_cluster.to_string(),
                services: vec![RemoteService {
                    name: service.to_string(),
                    ..Default::default()
                }],
            }],
        },
    )
}

pub fn exposure(name: &str, namespace: &str, service: &str, clusters: &[&str]) -> IntentObject {
    IntentObject::exposure(
        name,
        namespace,
        ServiceExpositionPolicySpec {
            exposed: vec![ExposedService {
                name: service.to_string(),
                clusters: clusters.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            }],
        },
    )
}
