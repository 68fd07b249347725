use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// A DNS resolver: a plain nameserver address or a DoH/DoT URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolver {
    #[serde(rename = "Addr")]
    pub addr: String,

    /// Addresses used to resolve `addr` itself when it is a hostname
    #[serde(
        rename = "BootstrapResolution",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub bootstrap_resolution: Vec<IpAddr>,
}

impl Resolver {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            bootstrap_resolution: Vec::new(),
        }
    }
}

/// DNS configuration pushed to a client.
///
/// `proxied` is the MagicDNS switch. A route mapped to `None` reserves the
/// suffix for the mesh without naming an upstream resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    #[serde(rename = "Resolvers", skip_serializing_if = "Vec::is_empty")]
    pub resolvers: Vec<Resolver>,

    #[serde(rename = "Routes", skip_serializing_if = "BTreeMap::is_empty")]
    pub routes: BTreeMap<String, Option<Vec<Resolver>>>,

    #[serde(rename = "FallbackResolvers", skip_serializing_if = "Vec::is_empty")]
    pub fallback_resolvers: Vec<Resolver>,

    #[serde(rename = "Domains", skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,

    #[serde(rename = "Proxied", skip_serializing_if = "std::ops::Not::not")]
    pub proxied: bool,

    #[serde(rename = "Nameservers", skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<IpAddr>,

    #[serde(rename = "CertDomains", skip_serializing_if = "Vec::is_empty")]
    pub cert_domains: Vec<String>,
}

impl DnsConfig {
    /// Whether MagicDNS is switched on for this configuration
    pub fn magic_dns(&self) -> bool {
        self.proxied
    }
}
