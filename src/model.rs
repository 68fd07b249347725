//! Server-side records handed to the mapper by the persistence layer.
//!
//! These are the coordination server's view of the world, not what goes on the
//! wire; the persistence collaborator turns them into [`crate::protocol::Node`]s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// A user (namespace) that owns machines
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Host details last reported by the client agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub os: String,
    #[serde(default)]
    pub os_version: String,
    #[serde(default)]
    pub routable_ips: Vec<String>,
    #[serde(default)]
    pub request_tags: Vec<String>,
}

/// A persisted machine record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: u64,
    /// Client-declared machine key, with or without the `mkey:` prefix
    pub machine_key: String,
    pub node_key: String,
    #[serde(default)]
    pub disco_key: String,
    pub hostname: String,
    #[serde(default)]
    pub given_name: String,
    pub user: User,
    #[serde(default)]
    pub ip_addresses: Vec<IpAddr>,
    #[serde(default)]
    pub host_info: HostInfo,
    #[serde(default)]
    pub forced_tags: Vec<String>,
}

pub type Machines = Vec<Machine>;

/// Action of an ACL entry; only `accept` exists today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    #[default]
    Accept,
}

/// One `acls` entry of the policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    #[serde(default)]
    pub action: AclAction,
    #[serde(rename = "src")]
    pub sources: Vec<String>,
    #[serde(rename = "dst")]
    pub destinations: Vec<String>,
}

/// One `ssh` entry of the policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshEntry {
    pub action: String,
    #[serde(rename = "src")]
    pub sources: Vec<String>,
    #[serde(rename = "dst")]
    pub destinations: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
}

/// The ACL policy document.
///
/// The mapper never interprets it; it is passed to the persistence and ACL
/// collaborators as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclPolicy {
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub hosts: BTreeMap<String, String>,
    #[serde(default)]
    pub tag_owners: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub acls: Vec<AclEntry>,
    #[serde(default)]
    pub ssh: Vec<SshEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_policy_document_parses() {
        let doc = r#"{
            "groups": { "group:admins": ["alice"] },
            "tagOwners": { "tag:server": ["group:admins"] },
            "acls": [
                { "action": "accept", "src": ["group:admins"], "dst": ["*:*"] }
            ]
        }"#;

        let policy: AclPolicy = serde_json::from_str(doc).unwrap();
        assert_eq!(policy.acls.len(), 1);
        assert_eq!(policy.acls[0].action, AclAction::Accept);
        assert_eq!(policy.groups["group:admins"], vec!["alice".to_string()]);
        assert!(policy.ssh.is_empty());
    }
}
