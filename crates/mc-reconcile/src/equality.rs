//! Equality oracle for specification payloads.
//!
//! Written out field by field instead of leaning on `PartialEq` so the
//! comparison rules stay visible:
//! - sequences are order-significant (route precedence, port lists, endpoints)
//! - fields documented as name sets (`hosts`, `gateways`, `exportTo`,
//!   `addresses`, `subjectAltNames`) ignore order; repeated entries still
//!   count
//! - maps compare by key set and per-key value
//! - a different config kind is never equal

use std::collections::BTreeMap;

use crate::spec::*;

/// Recursive structural equality over the closed spec schema.
pub trait SpecEq {
    fn spec_eq(&self, other: &Self) -> bool;
}

/// Returns `true` when the two payloads describe the same desired state.
pub fn specs_equal(a: &ConfigSpec, b: &ConfigSpec) -> bool {
    a.spec_eq(b)
}

fn seq_eq<T: SpecEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.spec_eq(y))
}

/// Multiset comparison: order is ignored, multiplicity is not.
fn set_eq(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

fn opt_eq<T: SpecEq>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x.spec_eq(y),
        _ => false,
    }
}

fn map_eq<V: SpecEq>(a: &BTreeMap<String, V>, b: &BTreeMap<String, V>) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(k, va)| b.get(k).map(|vb| va.spec_eq(vb)).unwrap_or(false))
}

macro_rules! leaf_spec_eq {
    ($($t:ty),* $(,)?) => {
        $(
            impl SpecEq for $t {
                fn spec_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

leaf_spec_eq!(
    String,
    u32,
    StringMatch,
    ClientTlsMode,
    Location,
    Resolution,
    ServerTlsMode,
);

impl SpecEq for ConfigSpec {
    fn spec_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigSpec::VirtualService(a), ConfigSpec::VirtualService(b)) => a.spec_eq(b),
            (ConfigSpec::DestinationRule(a), ConfigSpec::DestinationRule(b)) => a.spec_eq(b),
            (ConfigSpec::ServiceEntry(a), ConfigSpec::ServiceEntry(b)) => a.spec_eq(b),
            (ConfigSpec::Gateway(a), ConfigSpec::Gateway(b)) => a.spec_eq(b),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// VirtualService
// ---------------------------------------------------------------------------

impl SpecEq for VirtualServiceSpec {
    fn spec_eq(&self, other: &Self) -> bool {
        set_eq(&self.hosts, &other.hosts)
            && set_eq(&self.gateways, &other.gateways)
            && seq_eq(&self.http, &other.http)
            && seq_eq(&self.tcp, &other.tcp)
            && set_eq(&self.export_to, &other.export_to)
    }
}

impl SpecEq for HttpRoute {
    fn spec_eq(&self, other: &Self) -> bool {
        opt_eq(&self.name, &other.name)
            && seq_eq(&self.matches, &other.matches)
            && seq_eq(&self.route, &other.route)
            && opt_eq(&self.rewrite, &other.rewrite)
    }
}

impl SpecEq for HttpMatch {
    fn spec_eq(&self, other: &Self) -> bool {
        opt_eq(&self.uri, &other.uri)
            && opt_eq(&self.authority, &other.authority)
            && opt_eq(&self.port, &other.port)
            && set_eq(&self.gateways, &other.gateways)
    }
}

impl SpecEq for HttpRewrite {
    fn spec_eq(&self, other: &Self) -> bool {
        opt_eq(&self.uri, &other.uri) && opt_eq(&self.authority, &other.authority)
    }
}

impl SpecEq for TcpRoute {
    fn spec_eq(&self, other: &Self) -> bool {
        seq_eq(&self.matches, &other.matches) && seq_eq(&self.route, &other.route)
    }
}

impl SpecEq for L4Match {
    fn spec_eq(&self, other: &Self) -> bool {
        opt_eq(&self.port, &other.port) && set_eq(&self.gateways, &other.gateways)
    }
}

impl SpecEq for RouteDestination {
    fn spec_eq(&self, other: &Self) -> bool {
        self.destination.spec_eq(&other.destination) && opt_eq(&self.weight, &other.weight)
    }
}

impl SpecEq for Destination {
    fn spec_eq(&self, other: &Self) -> bool {
        self.host == other.host
            && opt_eq(&self.subset, &other.subset)
            && opt_eq(&self.port, &other.port)
    }
}

impl SpecEq for PortSelector {
    fn spec_eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

// ---------------------------------------------------------------------------
// DestinationRule
// ---------------------------------------------------------------------------

impl SpecEq for DestinationRuleSpec {
    fn spec_eq(&self, other: &Self) -> bool {
        self.host == other.host
            && opt_eq(&self.traffic_policy, &other.traffic_policy)
            && seq_eq(&self.subsets, &other.subsets)
            && set_eq(&self.export_to, &other.export_to)
    }
}

impl SpecEq for TrafficPolicy {
    fn spec_eq(&self, other: &Self) -> bool {
        opt_eq(&self.tls, &other.tls)
    }
}

impl SpecEq for ClientTls {
    fn spec_eq(&self, other: &Self) -> bool {
        self.mode.spec_eq(&other.mode)
            && opt_eq(&self.sni, &other.sni)
            && set_eq(&self.subject_alt_names, &other.subject_alt_names)
    }
}

impl SpecEq for Subset {
    fn spec_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && map_eq(&self.labels, &other.labels)
            && opt_eq(&self.traffic_policy, &other.traffic_policy)
    }
}

// ---------------------------------------------------------------------------
// ServiceEntry
// ---------------------------------------------------------------------------

impl SpecEq for ServiceEntrySpec {
    fn spec_eq(&self, other: &Self) -> bool {
        set_eq(&self.hosts, &other.hosts)
            && set_eq(&self.addresses, &other.addresses)
            && seq_eq(&self.ports, &other.ports)
            && self.location.spec_eq(&other.location)
            && self.resolution.spec_eq(&other.resolution)
            && seq_eq(&self.endpoints, &other.endpoints)
            && set_eq(&self.export_to, &other.export_to)
    }
}

impl SpecEq for ServicePort {
    fn spec_eq(&self, other: &Self) -> bool {
        self.number == other.number && self.name == other.name && self.protocol == other.protocol
    }
}

impl SpecEq for WorkloadEntry {
    fn spec_eq(&self, other: &Self) -> bool {
        self.address == other.address
            && map_eq(&self.ports, &other.ports)
            && map_eq(&self.labels, &other.labels)
            && opt_eq(&self.network, &other.network)
            && opt_eq(&self.locality, &other.locality)
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

impl SpecEq for GatewaySpec {
    fn spec_eq(&self, other: &Self) -> bool {
        map_eq(&self.selector, &other.selector) && seq_eq(&self.servers, &other.servers)
    }
}

impl SpecEq for Server {
    fn spec_eq(&self, other: &Self) -> bool {
        self.port.spec_eq(&other.port)
            && set_eq(&self.hosts, &other.hosts)
            && opt_eq(&self.tls, &other.tls)
    }
}

impl SpecEq for ServerTls {
    fn spec_eq(&self, other: &Self) -> bool {
        self.mode.spec_eq(&other.mode)
    }
}
