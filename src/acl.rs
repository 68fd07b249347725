//! Packet-filter matching between machines.
//!
//! A peer is visible to a machine when either side may reach the other under at
//! least one compiled [`FilterRule`]: some source entry covers one of the
//! origin's addresses and some destination entry covers one of the target's.
//! Entries are `*`, a bare IP, or a CIDR prefix; anything else never matches.

use crate::model::Machine;
use crate::protocol::FilterRule;
use ipnetwork::IpNetwork;
use std::net::IpAddr;

const WILDCARD: &str = "*";

fn entry_contains(entry: &str, ip: IpAddr) -> bool {
    if entry == WILDCARD {
        return true;
    }

    if entry.contains('/') {
        return entry
            .parse::<IpNetwork>()
            .map(|net| net.contains(ip))
            .unwrap_or(false);
    }

    entry
        .parse::<IpAddr>()
        .map(|addr| addr == ip)
        .unwrap_or(false)
}

fn any_contains<'a>(entries: impl IntoIterator<Item = &'a str> + Clone, ips: &[IpAddr]) -> bool {
    ips.iter()
        .any(|ip| entries.clone().into_iter().any(|entry| entry_contains(entry, *ip)))
}

/// Whether a single rule lets `from` reach `to`
pub fn rule_allows(rule: &FilterRule, from: &Machine, to: &Machine) -> bool {
    let sources = rule.src_ips.iter().map(String::as_str);
    if !any_contains(sources, &from.ip_addresses) {
        return false;
    }

    let destinations = rule.dst_ports.iter().map(|d| d.ip.as_str());
    any_contains(destinations, &to.ip_addresses)
}

/// Whether any rule lets `from` reach `to`
pub fn can_access(rules: &[FilterRule], from: &Machine, to: &Machine) -> bool {
    rules.iter().any(|rule| rule_allows(rule, from, to))
}

/// Keep the peers that `machine` may talk to, or that may talk to it.
///
/// The machine itself is never part of its own peer list.
pub fn filter_machines_by_acl(
    machine: &Machine,
    peers: Vec<Machine>,
    rules: &[FilterRule],
) -> Vec<Machine> {
    peers
        .into_iter()
        .filter(|peer| peer.id != machine.id)
        .filter(|peer| can_access(rules, machine, peer) || can_access(rules, peer, machine))
        .collect()
}
