use super::dns::DnsConfig;
use super::node::{DerpMap, FilterRule, Node, SshPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Host details as sent by the client agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostInfo {
    #[serde(rename = "Hostname")]
    pub hostname: String,

    #[serde(rename = "OS", skip_serializing_if = "String::is_empty")]
    pub os: String,

    #[serde(rename = "OSVersion", skip_serializing_if = "String::is_empty")]
    pub os_version: String,

    #[serde(rename = "RoutableIPs", skip_serializing_if = "Vec::is_empty")]
    pub routable_ips: Vec<String>,

    #[serde(rename = "RequestTags", skip_serializing_if = "Vec::is_empty")]
    pub request_tags: Vec<String>,
}

/// A client poll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapRequest {
    #[serde(rename = "Version")]
    pub version: i32,

    /// Negotiated compression (`"zstd"` or empty)
    #[serde(rename = "Compress", skip_serializing_if = "String::is_empty")]
    pub compress: String,

    #[serde(rename = "KeepAlive")]
    pub keep_alive: bool,

    #[serde(rename = "NodeKey")]
    pub node_key: String,

    #[serde(rename = "DiscoKey", skip_serializing_if = "String::is_empty")]
    pub disco_key: String,

    #[serde(rename = "Hostinfo", skip_serializing_if = "Option::is_none")]
    pub hostinfo: Option<HostInfo>,

    #[serde(rename = "Endpoints", skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<String>,

    #[serde(rename = "Stream")]
    pub stream: bool,

    #[serde(rename = "OmitPeers")]
    pub omit_peers: bool,

    #[serde(rename = "ReadOnly")]
    pub read_only: bool,
}

impl MapRequest {
    /// Hostname reported by the agent, or empty when the request carried none
    pub fn hostname(&self) -> &str {
        self.hostinfo
            .as_ref()
            .map(|h| h.hostname.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(rename = "ID")]
    pub id: u64,

    #[serde(rename = "LoginName")]
    pub login_name: String,

    #[serde(rename = "DisplayName")]
    pub display_name: String,

    #[serde(rename = "ProfilePicURL", skip_serializing_if = "String::is_empty")]
    pub profile_pic_url: String,
}

/// Client-side debug switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    #[serde(rename = "DisableLogTail")]
    pub disable_log_tail: bool,

    #[serde(rename = "RandomizeClientPort")]
    pub randomize_client_port: bool,
}

/// Snapshot of the network as seen by one client.
///
/// A keepalive response is `MapResponse { keep_alive: true, ..Default::default() }`
/// and serializes to `{"KeepAlive":true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapResponse {
    #[serde(rename = "KeepAlive", skip_serializing_if = "std::ops::Not::not")]
    pub keep_alive: bool,

    #[serde(rename = "Node", skip_serializing_if = "Option::is_none")]
    pub node: Option<Node>,

    #[serde(rename = "DERPMap", skip_serializing_if = "Option::is_none")]
    pub derp_map: Option<Arc<DerpMap>>,

    #[serde(rename = "Peers", skip_serializing_if = "Vec::is_empty")]
    pub peers: Vec<Node>,

    #[serde(rename = "DNSConfig", skip_serializing_if = "Option::is_none")]
    pub dns_config: Option<DnsConfig>,

    #[serde(rename = "Domain", skip_serializing_if = "String::is_empty")]
    pub domain: String,

    #[serde(rename = "CollectServices", skip_serializing_if = "Option::is_none")]
    pub collect_services: Option<bool>,

    #[serde(rename = "PacketFilter", skip_serializing_if = "Vec::is_empty")]
    pub packet_filter: Vec<FilterRule>,

    #[serde(rename = "UserProfiles", skip_serializing_if = "Vec::is_empty")]
    pub user_profiles: Vec<UserProfile>,

    #[serde(rename = "SSHPolicy", skip_serializing_if = "Option::is_none")]
    pub ssh_policy: Option<SshPolicy>,

    #[serde(rename = "ControlTime", skip_serializing_if = "Option::is_none")]
    pub control_time: Option<DateTime<Utc>>,

    #[serde(rename = "Debug", skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugFlags>,
}

impl MapResponse {
    /// The minimal response used to keep a long poll open
    pub fn keep_alive() -> Self {
        Self {
            keep_alive: true,
            ..Default::default()
        }
    }

    /// Compact one-line description for trace logs
    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }
}

/// Display adapter returned by [`MapResponse::summary`]
pub struct Summary<'a>(&'a MapResponse);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resp = self.0;
        let node_key = resp.node.as_ref().map(|n| n.key.as_str()).unwrap_or("-");
        let regions = resp.derp_map.as_ref().map_or(0, |d| d.regions.len());
        let peers: Vec<&str> = resp.peers.iter().map(|p| p.name.as_str()).collect();

        write!(
            f,
            "{{ NodeKey: {node_key}, DERPMap: {regions}, Peers: [{}] }}",
            peers.join(", ")
        )
    }
}
