use super::message::HostInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node as presented to itself and to its peers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "ID")]
    pub id: u64,

    #[serde(rename = "StableID")]
    pub stable_id: String,

    /// Fully qualified MagicDNS name
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "User")]
    pub user: u64,

    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "KeyExpiry", skip_serializing_if = "Option::is_none")]
    pub key_expiry: Option<DateTime<Utc>>,

    #[serde(rename = "Machine")]
    pub machine: String,

    #[serde(rename = "DiscoKey", skip_serializing_if = "String::is_empty")]
    pub disco_key: String,

    #[serde(rename = "Addresses")]
    pub addresses: Vec<String>,

    #[serde(rename = "AllowedIPs")]
    pub allowed_ips: Vec<String>,

    #[serde(rename = "Endpoints", skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<String>,

    #[serde(rename = "DERP", skip_serializing_if = "String::is_empty")]
    pub derp: String,

    #[serde(rename = "Hostinfo")]
    pub hostinfo: HostInfo,

    #[serde(rename = "Created", skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(rename = "Tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(rename = "PrimaryRoutes", skip_serializing_if = "Vec::is_empty")]
    pub primary_routes: Vec<String>,

    #[serde(rename = "Online", skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,

    #[serde(rename = "MachineAuthorized")]
    pub machine_authorized: bool,
}

/// Inclusive port range; `0..=65535` means any port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    #[serde(rename = "First")]
    pub first: u16,
    #[serde(rename = "Last")]
    pub last: u16,
}

impl PortRange {
    pub const ANY: PortRange = PortRange {
        first: 0,
        last: 65535,
    };
}

/// Destination of a filter rule: an IP, CIDR or `*`, plus ports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPortRange {
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "Ports")]
    pub ports: PortRange,
}

/// One packet filter rule as compiled from the ACL policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRule {
    #[serde(rename = "SrcIPs")]
    pub src_ips: Vec<String>,

    #[serde(rename = "DstPorts")]
    pub dst_ports: Vec<NetPortRange>,

    #[serde(rename = "IPProto", skip_serializing_if = "Vec::is_empty")]
    pub ip_proto: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshPrincipal {
    #[serde(rename = "NodeIP", skip_serializing_if = "String::is_empty")]
    pub node_ip: String,
    #[serde(rename = "UserLogin", skip_serializing_if = "String::is_empty")]
    pub user_login: String,
    #[serde(rename = "Any", skip_serializing_if = "std::ops::Not::not")]
    pub any: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshAction {
    #[serde(rename = "Message", skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(rename = "Reject", skip_serializing_if = "std::ops::Not::not")]
    pub reject: bool,
    #[serde(rename = "Accept", skip_serializing_if = "std::ops::Not::not")]
    pub accept: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshRule {
    #[serde(rename = "Principals")]
    pub principals: Vec<SshPrincipal>,
    #[serde(rename = "SSHUsers")]
    pub ssh_users: BTreeMap<String, String>,
    #[serde(rename = "Action", skip_serializing_if = "Option::is_none")]
    pub action: Option<SshAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshPolicy {
    #[serde(rename = "Rules")]
    pub rules: Vec<SshRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerpNode {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "RegionID")]
    pub region_id: i32,
    #[serde(rename = "HostName")]
    pub host_name: String,
    #[serde(rename = "IPv4", skip_serializing_if = "String::is_empty")]
    pub ipv4: String,
    #[serde(rename = "IPv6", skip_serializing_if = "String::is_empty")]
    pub ipv6: String,
    #[serde(rename = "STUNPort")]
    pub stun_port: i32,
    #[serde(rename = "DERPPort")]
    pub derp_port: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerpRegion {
    #[serde(rename = "RegionID")]
    pub region_id: i32,
    #[serde(rename = "RegionCode")]
    pub region_code: String,
    #[serde(rename = "RegionName")]
    pub region_name: String,
    #[serde(rename = "Nodes")]
    pub nodes: Vec<DerpNode>,
}

/// Relay directory; passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerpMap {
    #[serde(rename = "Regions")]
    pub regions: BTreeMap<i32, DerpRegion>,
    #[serde(rename = "OmitDefaultRegions", skip_serializing_if = "std::ops::Not::not")]
    pub omit_default_regions: bool,
}
