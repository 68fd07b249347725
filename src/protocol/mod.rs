//! # Wire Protocol Types
//!
//! The logical objects exchanged with client agents on every poll.
//!
//! All types serialize to JSON with the PascalCase field names the client agent
//! expects. Empty optional fields are omitted so a keepalive response carries
//! nothing but its flag.
//!
//! ## Components
//! - **Message**: `MapRequest`, `MapResponse`, user profiles and debug flags
//! - **Node**: protocol node representation, packet filter rules, SSH policy,
//!   DERP relay map
//! - **DNS**: per-client DNS configuration and resolvers

pub mod dns;
pub mod message;
pub mod node;

pub use dns::{DnsConfig, Resolver};
pub use message::{DebugFlags, HostInfo, MapRequest, MapResponse, UserProfile};
pub use node::{
    DerpMap, DerpNode, DerpRegion, FilterRule, NetPortRange, Node, PortRange, SshAction,
    SshPolicy, SshPrincipal, SshRule,
};
