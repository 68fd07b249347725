//! Shared fixtures: in-memory collaborators and machine builders.

#![allow(dead_code, clippy::unwrap_used)]

use mesh_mapper::error::BoxError;
use mesh_mapper::model::{AclPolicy, HostInfo, Machine, Machines, User};
use mesh_mapper::ports::{AclEngine, NodeStore};
use mesh_mapper::protocol::{self, DnsConfig, FilterRule, NetPortRange, Node, PortRange, SshPolicy};
use mesh_mapper::transport::{NoiseEncoding, ResponseEncoding};
use mesh_mapper::{Mapper, MapperSettings};
use std::sync::Arc;

/// Persistence fake holding every machine of the tailnet
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub machines: Machines,
    pub fail_node: bool,
    pub fail_peers: bool,
    pub fail_peer_nodes: bool,
}

impl MemoryStore {
    pub fn new(machines: Machines) -> Self {
        Self {
            machines,
            ..Default::default()
        }
    }
}

impl NodeStore for MemoryStore {
    fn resolve_node(
        &self,
        machine: &Machine,
        _policy: Option<&AclPolicy>,
        _dns: Option<&DnsConfig>,
    ) -> Result<Node, BoxError> {
        if self.fail_node {
            return Err("node record is corrupt".into());
        }
        Ok(node_from(machine))
    }

    fn list_peers(&self, machine: &Machine) -> Result<Machines, BoxError> {
        if self.fail_peers {
            return Err("database is locked".into());
        }
        Ok(self
            .machines
            .iter()
            .filter(|m| m.id != machine.id)
            .cloned()
            .collect())
    }

    fn resolve_peers(
        &self,
        peers: &[Machine],
        _policy: Option<&AclPolicy>,
        _dns: Option<&DnsConfig>,
    ) -> Result<Vec<Node>, BoxError> {
        if self.fail_peer_nodes {
            return Err("peer record is corrupt".into());
        }
        Ok(peers.iter().map(node_from).collect())
    }
}

/// Policy fake returning a fixed rule set
#[derive(Debug, Default, Clone)]
pub struct StaticAcl {
    pub rules: Vec<FilterRule>,
    pub ssh: Option<SshPolicy>,
    pub fail: bool,
}

impl StaticAcl {
    pub fn allow_all() -> Self {
        Self::with_rules(vec![rule(&["*"], &["*"])])
    }

    pub fn with_rules(rules: Vec<FilterRule>) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }
}

impl AclEngine for StaticAcl {
    fn generate_filter_rules(
        &self,
        _policy: Option<&AclPolicy>,
        _peers: &[Machine],
        _strip_email_domain: bool,
    ) -> Result<(Vec<FilterRule>, Option<SshPolicy>), BoxError> {
        if self.fail {
            return Err("unknown group: group:missing".into());
        }
        Ok((self.rules.clone(), self.ssh.clone()))
    }
}

pub fn node_from(machine: &Machine) -> Node {
    let addresses: Vec<String> = machine
        .ip_addresses
        .iter()
        .map(|ip| format!("{ip}/32"))
        .collect();

    Node {
        id: machine.id,
        stable_id: machine.id.to_string(),
        name: format!("{}.{}", machine.given_name, machine.user.name),
        user: machine.user.id,
        key: machine.node_key.clone(),
        machine: machine.machine_key.clone(),
        allowed_ips: addresses.clone(),
        addresses,
        hostinfo: protocol::HostInfo {
            hostname: machine.hostname.clone(),
            os: machine.host_info.os.clone(),
            ..Default::default()
        },
        machine_authorized: true,
        ..Default::default()
    }
}

pub fn machine(id: u64, user: &User, hostname: &str, ip: &str) -> Machine {
    Machine {
        id,
        machine_key: format!("mkey:{}", "00".repeat(32)),
        node_key: format!("nodekey:{id:064x}"),
        disco_key: String::new(),
        hostname: hostname.to_string(),
        given_name: hostname.to_string(),
        user: user.clone(),
        ip_addresses: vec![ip.parse().unwrap()],
        host_info: HostInfo {
            hostname: hostname.to_string(),
            os: "linux".to_string(),
            ..Default::default()
        },
        forced_tags: Vec::new(),
    }
}

pub fn rule(src: &[&str], dst: &[&str]) -> FilterRule {
    FilterRule {
        src_ips: src.iter().map(|s| s.to_string()).collect(),
        dst_ports: dst
            .iter()
            .map(|d| NetPortRange {
                ip: d.to_string(),
                ports: PortRange::ANY,
            })
            .collect(),
        ip_proto: Vec::new(),
    }
}

/// alice's laptop, alice's phone, bob's desktop, carol's server
pub fn tailnet() -> Machines {
    let alice = User::new(1, "alice");
    let bob = User::new(2, "bob");
    let carol = User::new(3, "carol");

    vec![
        machine(1, &alice, "laptop", "100.64.0.1"),
        machine(2, &alice, "phone", "100.64.0.2"),
        machine(3, &bob, "desktop", "100.64.0.3"),
        machine(4, &carol, "server", "100.64.0.4"),
    ]
}

pub fn noise_mapper(store: MemoryStore, acl: StaticAcl, settings: MapperSettings) -> Mapper {
    mapper_with(store, acl, Arc::new(NoiseEncoding), settings)
}

pub fn mapper_with(
    store: MemoryStore,
    acl: StaticAcl,
    encoding: Arc<dyn ResponseEncoding>,
    settings: MapperSettings,
) -> Mapper {
    Mapper::new(Arc::new(store), Arc::new(acl), encoding, settings)
}
