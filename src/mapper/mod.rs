//! # Mapper
//!
//! Turns the server's view of a client's network into the bytes written back
//! on each poll.
//!
//! ## Pipeline
//! ```text
//! NodeStore + AclEngine -> MapResponse -> JSON -> [zstd] -> seal -> [Length(4)] [Payload]
//! ```
//!
//! A [`Mapper`] is built once per server and shared by every poll handler. It
//! holds no per-request state: the only shared mutable pieces are the
//! compressor pool and the metric counters, both internally synchronized.
//!
//! ## Example
//! ```rust,no_run
//! use mesh_mapper::config::Config;
//! use mesh_mapper::mapper::Mapper;
//! # use mesh_mapper::ports::{AclEngine, NodeStore};
//! # use std::sync::Arc;
//! # fn run(store: Arc<dyn NodeStore>, acl: Arc<dyn AclEngine>,
//! #        request: mesh_mapper::protocol::MapRequest,
//! #        machine: mesh_mapper::model::Machine) -> mesh_mapper::error::Result<()> {
//! let config = Config::from_file("mapper.toml")?;
//! let mapper = Mapper::from_config(&config, store, acl)?;
//!
//! let frame = mapper.create_map_response(&request, &machine, None)?;
//! # let _ = frame;
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod decode;
pub mod dns;
mod marshal;
pub mod profiles;

use crate::config::Config;
use crate::error::Result;
use crate::model::{AclPolicy, Machine};
use crate::ports::{AclEngine, NodeStore};
use crate::protocol::{DerpMap, DnsConfig, MapRequest, MapResponse};
use crate::transport::{encoding_for, ResponseEncoding};
use crate::utils::metrics::{Metrics, Timer};
use crate::utils::EncoderPool;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub use decode::decode_map_response;
pub use marshal::marshal_response;

/// Per-server response settings
#[derive(Debug, Clone)]
pub struct MapperSettings {
    /// Relay map shared into every response
    pub derp_map: Option<Arc<DerpMap>>,
    pub base_domain: String,
    /// Template cloned for each client; `None` means no DNS configuration
    pub dns_config: Option<DnsConfig>,
    pub logtail: bool,
    pub random_client_port: bool,
    pub strip_email_domain: bool,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            derp_map: None,
            base_domain: String::new(),
            dns_config: None,
            logtail: false,
            random_client_port: false,
            strip_email_domain: true,
        }
    }
}

impl MapperSettings {
    /// Settings described by `config`, reading the DERP map file if one is set
    pub fn from_config(config: &Config) -> Result<Self> {
        let derp_map = config.mapper.load_derp_map()?.map(Arc::new);

        Ok(Self {
            derp_map,
            base_domain: config.mapper.base_domain.clone(),
            dns_config: config.dns_template(),
            logtail: config.mapper.logtail,
            random_client_port: config.mapper.random_client_port,
            strip_email_domain: config.mapper.strip_email_domain,
        })
    }
}

/// Builds and frames map responses for one server
pub struct Mapper {
    store: Arc<dyn NodeStore>,
    acl: Arc<dyn AclEngine>,
    encoding: Arc<dyn ResponseEncoding>,
    pool: Arc<EncoderPool>,
    metrics: Arc<Metrics>,
    settings: MapperSettings,
}

impl Mapper {
    pub fn new(
        store: Arc<dyn NodeStore>,
        acl: Arc<dyn AclEngine>,
        encoding: Arc<dyn ResponseEncoding>,
        settings: MapperSettings,
    ) -> Self {
        Self {
            store,
            acl,
            encoding,
            pool: Arc::new(EncoderPool::default()),
            metrics: Arc::new(Metrics::new()),
            settings,
        }
    }

    /// Use `pool` for compression instead of a private one
    pub fn with_encoder_pool(mut self, pool: Arc<EncoderPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Build a mapper from configuration.
    ///
    /// # Errors
    /// - `MapperError::ConfigError` if validation fails, a referenced file cannot
    ///   be read, or legacy mode has no private key
    /// - `MapperError::KeyParse` if the private key file is malformed
    pub fn from_config(
        config: &Config,
        store: Arc<dyn NodeStore>,
        acl: Arc<dyn AclEngine>,
    ) -> Result<Self> {
        config.validate_strict()?;

        let private_key = config.mapper.load_private_key()?;
        let encoding = encoding_for(config.mapper.transport, private_key)?;
        let settings = MapperSettings::from_config(config)?;
        let pool = EncoderPool::new(
            config.compression.encoder_pool_size,
            config.compression.level,
        );

        info!(
            transport = encoding.name(),
            base_domain = %settings.base_domain,
            magic_dns = settings.dns_config.as_ref().is_some_and(DnsConfig::magic_dns),
            "Mapper configured"
        );

        Ok(Self::new(store, acl, encoding, settings).with_encoder_pool(Arc::new(pool)))
    }

    pub fn settings(&self) -> &MapperSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn encoder_pool(&self) -> &Arc<EncoderPool> {
        &self.pool
    }

    /// Name of the active transport encoding
    pub fn transport(&self) -> &'static str {
        self.encoding.name()
    }

    /// Build, encode, and frame the full map response for `machine`.
    ///
    /// # Errors
    /// Any collaborator, key, serialization, compression, or sealing error;
    /// nothing is returned on failure
    #[instrument(skip_all, fields(machine = %machine.hostname, transport = self.encoding.name()))]
    pub fn create_map_response(
        &self,
        request: &MapRequest,
        machine: &Machine,
        policy: Option<&AclPolicy>,
    ) -> Result<Vec<u8>> {
        let _timer = Timer::start("create_map_response");

        let result = self
            .full_map_response(machine, policy)
            .and_then(|response| self.marshal_map_response(&response, machine, &request.compress));

        match &result {
            Ok(frame) => self.metrics.map_response(frame.len() as u64),
            Err(e) => {
                self.metrics.build_failure();
                error!(error = %e, "Cannot create map response");
            }
        }

        result
    }

    /// Frame a keepalive response for `machine`
    #[instrument(skip_all, fields(machine = %machine.hostname, transport = self.encoding.name()))]
    pub fn create_keep_alive_response(
        &self,
        request: &MapRequest,
        machine: &Machine,
    ) -> Result<Vec<u8>> {
        let result =
            self.marshal_map_response(&MapResponse::keep_alive(), machine, &request.compress);

        match &result {
            Ok(frame) => self.metrics.keep_alive_response(frame.len() as u64),
            Err(e) => {
                self.metrics.build_failure();
                error!(error = %e, "Cannot create keepalive response");
            }
        }

        result
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("transport", &self.encoding.name())
            .field("pool", &self.pool)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
