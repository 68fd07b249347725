//! Collaborator interfaces consumed by the mapper.
//!
//! Persistence and ACL policy compilation live outside this crate. The mapper
//! only sees them through these two traits; errors come back boxed and are
//! wrapped into the matching [`crate::error::MapperError`] variant.

use crate::acl;
use crate::error::BoxError;
use crate::model::{AclPolicy, Machine, Machines};
use crate::protocol::{DnsConfig, FilterRule, Node, SshPolicy};

/// Materializes machine records and their protocol representation
pub trait NodeStore: Send + Sync {
    /// Convert the requesting machine into its protocol node
    fn resolve_node(
        &self,
        machine: &Machine,
        policy: Option<&AclPolicy>,
        dns: Option<&DnsConfig>,
    ) -> Result<Node, BoxError>;

    /// Candidate peers of `machine`, before any ACL filtering
    fn list_peers(&self, machine: &Machine) -> Result<Machines, BoxError>;

    /// Convert peers into protocol nodes, preserving order
    fn resolve_peers(
        &self,
        peers: &[Machine],
        policy: Option<&AclPolicy>,
        dns: Option<&DnsConfig>,
    ) -> Result<Vec<Node>, BoxError>;
}

/// Compiles the policy document into packet filter rules
pub trait AclEngine: Send + Sync {
    /// Rules and SSH policy for the given candidate peer set
    fn generate_filter_rules(
        &self,
        policy: Option<&AclPolicy>,
        peers: &[Machine],
        strip_email_domain: bool,
    ) -> Result<(Vec<FilterRule>, Option<SshPolicy>), BoxError>;

    /// Drop the peers `machine` may not see under `rules`
    fn filter_by_acl(&self, machine: &Machine, peers: Machines, rules: &[FilterRule]) -> Machines {
        acl::filter_machines_by_acl(machine, peers, rules)
    }
}
