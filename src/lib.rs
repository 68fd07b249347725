//! # Mesh Mapper
//!
//! Map-response generation and framing for a mesh-VPN coordination server.
//!
//! On every poll a client agent expects one payload describing its own node,
//! the peers it may reach, DNS settings, packet filter rules, and relay
//! servers. This crate builds that payload from the server's records, encodes
//! it the way the client negotiated, and frames it for the wire.
//!
//! ## Features
//! - Full and keepalive map responses
//! - ACL-based peer filtering through a pluggable policy engine
//! - MagicDNS search domains and routes, NextDNS device tagging
//! - zstd compression with a bounded compressor pool
//! - Legacy (sealed to the client key) and Noise (passthrough) transports
//! - 4-byte little-endian length framing, with a Tokio codec for readers
//!
//! ## Architecture
//! ```text
//! ┌────────────────────────┐
//! │     Poll Handler        │  (outside this crate)
//! ├────────────────────────┤
//! │     mapper::Mapper      │  builder, DNS, profiles
//! ├────────────────────────┤
//! │ ports: NodeStore, Acl   │  persistence and policy collaborators
//! ├────────────────────────┤
//! │ JSON -> zstd -> seal    │  core::serialization, utils, transport
//! ├────────────────────────┤
//! │     core::frame         │  [Length(4)] [Payload]
//! └────────────────────────┘
//! ```
//!
//! ## Quick Start
//! ```rust,no_run
//! use mesh_mapper::config::Config;
//! use mesh_mapper::mapper::Mapper;
//! use mesh_mapper::utils::logging::init_logging;
//! # use mesh_mapper::ports::{AclEngine, NodeStore};
//! # use std::sync::Arc;
//! # fn run(store: Arc<dyn NodeStore>, acl: Arc<dyn AclEngine>) -> mesh_mapper::Result<()> {
//!
//! let config = Config::from_file("mapper.toml")?;
//! init_logging(&config.logging)?;
//!
//! let mapper = Mapper::from_config(&config, store, acl)?;
//! # let _ = mapper;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod acl;
pub mod config;
pub mod core;
pub mod error;
pub mod key;
pub mod mapper;
pub mod model;
pub mod ports;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use config::Config;
pub use error::{MapperError, Result};
pub use key::{MachinePrivate, MachinePublic};
pub use mapper::{Mapper, MapperSettings};
pub use model::{AclPolicy, Machine, User};
pub use ports::{AclEngine, NodeStore};
pub use protocol::{MapRequest, MapResponse};
pub use transport::{LegacyEncoding, NoiseEncoding, ResponseEncoding};
