//! Per-client DNS configuration.
//!
//! Every client gets its own copy of the server's DNS template. With MagicDNS
//! on, the copy gains a search domain for the client's user and a route for
//! each visible user; NextDNS resolvers are tagged with device details either
//! way.

use crate::config::NEXTDNS_DOH_PREFIX;
use crate::model::Machine;
use crate::protocol::{DnsConfig, Resolver};
use std::collections::BTreeSet;
use std::iter;
use url::form_urlencoded;

const DEVICE_NAME: &str = "device_name";
const DEVICE_MODEL: &str = "device_model";
const DEVICE_IP: &str = "device_ip";

/// DNS configuration for `machine`, derived from `base`.
///
/// `base` is never modified. Returns `None` when there is no template.
pub fn generate_dns_config(
    base: Option<&DnsConfig>,
    base_domain: &str,
    machine: &Machine,
    peers: &[Machine],
) -> Option<DnsConfig> {
    let mut config = base?.clone();

    if config.magic_dns() {
        config
            .domains
            .push(format!("{}.{base_domain}", machine.user.name));

        let users: BTreeSet<&str> = iter::once(machine)
            .chain(peers)
            .map(|m| m.user.name.as_str())
            .collect();

        for user in users {
            config.routes.insert(format!("{user}.{base_domain}"), None);
        }
    }

    add_nextdns_metadata(&mut config.resolvers, machine);

    Some(config)
}

/// Append device details to every NextDNS resolver address.
///
/// Parameters are sorted by key and form-encoded. Resolvers that already carry
/// a `device_name` parameter are left alone.
pub fn add_nextdns_metadata(resolvers: &mut [Resolver], machine: &Machine) {
    for resolver in resolvers
        .iter_mut()
        .filter(|r| r.addr.starts_with(NEXTDNS_DOH_PREFIX))
    {
        if already_tagged(&resolver.addr) {
            continue;
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(ip) = machine.ip_addresses.first() {
            query.append_pair(DEVICE_IP, &ip.to_string());
        }
        query.append_pair(DEVICE_MODEL, &machine.host_info.os);
        query.append_pair(DEVICE_NAME, &machine.hostname);

        resolver.addr = format!("{}?{}", resolver.addr, query.finish());
    }
}

fn already_tagged(addr: &str) -> bool {
    addr.split_once('?').is_some_and(|(_, query)| {
        form_urlencoded::parse(query.as_bytes()).any(|(key, _)| key == DEVICE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HostInfo, User};

    fn machine(id: u64, user: &str, hostname: &str, ip: Option<&str>) -> Machine {
        Machine {
            id,
            machine_key: String::new(),
            node_key: String::new(),
            disco_key: String::new(),
            hostname: hostname.to_string(),
            given_name: hostname.to_string(),
            user: User::new(id, user),
            ip_addresses: ip.into_iter().filter_map(|ip| ip.parse().ok()).collect(),
            host_info: HostInfo {
                hostname: hostname.to_string(),
                os: "linux".to_string(),
                ..Default::default()
            },
            forced_tags: Vec::new(),
        }
    }

    #[test]
    fn test_no_template_no_config() {
        let me = machine(1, "alice", "laptop", None);
        assert!(generate_dns_config(None, "example.com", &me, &[]).is_none());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_magic_dns_adds_domains_and_routes() {
        let base = DnsConfig {
            proxied: true,
            ..Default::default()
        };
        let me = machine(1, "alice", "laptop", Some("100.64.0.1"));
        let peers = vec![
            machine(2, "bob", "desktop", Some("100.64.0.2")),
            machine(3, "bob", "server", Some("100.64.0.3")),
        ];

        let config = generate_dns_config(Some(&base), "example.com", &me, &peers).unwrap();

        assert_eq!(config.domains, vec!["alice.example.com".to_string()]);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes.get("alice.example.com"), Some(&None));
        assert_eq!(config.routes.get("bob.example.com"), Some(&None));
        assert!(base.domains.is_empty());
        assert!(base.routes.is_empty());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_disabled_magic_dns_copies_template() {
        let base = DnsConfig {
            resolvers: vec![Resolver::new("1.1.1.1")],
            domains: vec!["corp.internal".to_string()],
            ..Default::default()
        };
        let me = machine(1, "alice", "laptop", Some("100.64.0.1"));
        let peers = vec![machine(2, "bob", "desktop", None)];

        let config = generate_dns_config(Some(&base), "example.com", &me, &peers).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn test_nextdns_metadata() {
        let me = machine(1, "alice", "laptop", Some("100.64.0.5"));
        let mut resolvers = vec![
            Resolver::new("https://dns.nextdns.io/abc123"),
            Resolver::new("1.1.1.1"),
        ];

        add_nextdns_metadata(&mut resolvers, &me);

        assert_eq!(
            resolvers[0].addr,
            "https://dns.nextdns.io/abc123?device_ip=100.64.0.5&device_model=linux&device_name=laptop"
        );
        assert_eq!(resolvers[1].addr, "1.1.1.1");
    }

    #[test]
    fn test_nextdns_metadata_without_address() {
        let me = machine(1, "alice", "my laptop", None);
        let mut resolvers = vec![Resolver::new("https://dns.nextdns.io/abc123")];

        add_nextdns_metadata(&mut resolvers, &me);

        assert_eq!(
            resolvers[0].addr,
            "https://dns.nextdns.io/abc123?device_model=linux&device_name=my+laptop"
        );
    }

    #[test]
    fn test_nextdns_metadata_is_idempotent() {
        let me = machine(1, "alice", "laptop", Some("100.64.0.5"));
        let mut resolvers = vec![Resolver::new("https://dns.nextdns.io/abc123")];

        add_nextdns_metadata(&mut resolvers, &me);
        let once = resolvers[0].addr.clone();
        add_nextdns_metadata(&mut resolvers, &me);

        assert_eq!(resolvers[0].addr, once);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_template_resolvers_stay_untagged() {
        let base = DnsConfig {
            resolvers: vec![Resolver::new("https://dns.nextdns.io/abc123")],
            ..Default::default()
        };
        let me = machine(1, "alice", "laptop", Some("100.64.0.5"));

        let config = generate_dns_config(Some(&base), "", &me, &[]).unwrap();

        assert!(config.resolvers[0].addr.contains("device_name=laptop"));
        assert_eq!(base.resolvers[0].addr, "https://dns.nextdns.io/abc123");
    }
}
