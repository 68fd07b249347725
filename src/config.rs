//! # Configuration Management
//!
//! Centralized configuration for the mapper.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`
//!
//! ## Example
//! ```toml
//! [mapper]
//! base_domain = "example.com"
//! transport = "legacy"
//! private_key_path = "/var/lib/mesh/private.key"
//!
//! [compression]
//! encoder_pool_size = 16
//! level = 1
//!
//! [dns]
//! magic_dns = true
//! nameservers = ["1.1.1.1", "https://dns.nextdns.io/abc123"]
//! ```

use crate::error::{constants, MapperError, Result};
use crate::key::MachinePrivate;
use crate::protocol::{DerpMap, DnsConfig, Resolver};
use crate::utils::encoder_pool::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_POOL_CAPACITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::net::IpAddr;
use std::path::Path;
use tracing::Level;

/// Max allowed payload size of a single frame (e.g. 16 MB)
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Size of the little-endian length header in front of every response
pub const RESPONSE_HEADER_SIZE: usize = 4;

/// Address prefix of NextDNS DNS-over-HTTPS resolvers
pub const NEXTDNS_DOH_PREFIX: &str = "https://dns.nextdns.io";

/// `Compress` value a client sends to ask for zstd
pub const ZSTD_COMPRESSION: &str = "zstd";

/// Which wire encoding this server speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Payloads are sealed to the client's machine key by this crate
    Legacy,
    /// Payloads travel inside an already authenticated tunnel
    #[default]
    Noise,
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mapper: MapperConfig,

    #[serde(default)]
    pub compression: CompressionConfig,

    /// DNS template; omitted means clients get no DNS configuration
    #[serde(default)]
    pub dns: Option<DnsSettings>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| MapperError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| MapperError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| MapperError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Override fields from `MESH_MAPPER_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(domain) = std::env::var("MESH_MAPPER_BASE_DOMAIN") {
            self.mapper.base_domain = domain;
        }

        if let Ok(mode) = std::env::var("MESH_MAPPER_TRANSPORT") {
            match mode.to_ascii_lowercase().as_str() {
                "legacy" => self.mapper.transport = TransportMode::Legacy,
                "noise" => self.mapper.transport = TransportMode::Noise,
                _ => {}
            }
        }

        if let Ok(path) = std::env::var("MESH_MAPPER_PRIVATE_KEY_PATH") {
            self.mapper.private_key_path = Some(path);
        }

        if let Ok(path) = std::env::var("MESH_MAPPER_DERP_MAP_PATH") {
            self.mapper.derp_map_path = Some(path);
        }

        if let Ok(flag) = std::env::var("MESH_MAPPER_LOGTAIL") {
            if let Ok(val) = flag.parse::<bool>() {
                self.mapper.logtail = val;
            }
        }

        if let Ok(flag) = std::env::var("MESH_MAPPER_RANDOM_CLIENT_PORT") {
            if let Ok(val) = flag.parse::<bool>() {
                self.mapper.random_client_port = val;
            }
        }

        if let Ok(size) = std::env::var("MESH_MAPPER_ENCODER_POOL_SIZE") {
            if let Ok(val) = size.parse::<usize>() {
                self.compression.encoder_pool_size = val;
            }
        }
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.mapper.validate());
        errors.extend(self.compression.validate());

        if let Some(dns) = &self.dns {
            errors.extend(dns.validate());
            if dns.magic_dns && self.mapper.base_domain.is_empty() {
                errors.push("MagicDNS requires mapper.base_domain to be set".to_string());
            }
        }

        errors.extend(self.logging.validate());

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(MapperError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }

    /// Build the DNS template handed to every response build
    pub fn dns_template(&self) -> Option<DnsConfig> {
        self.dns.as_ref().map(DnsSettings::to_dns_config)
    }
}

/// Mapper behaviour and identity
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Suffix for MagicDNS names and user display names; may be empty
    pub base_domain: String,

    /// Leave client log upload enabled
    pub logtail: bool,

    /// Ask clients to pick a random WireGuard listen port
    pub random_client_port: bool,

    /// Strip the `@domain` part of email user names when compiling ACLs
    pub strip_email_domain: bool,

    pub transport: TransportMode,

    /// File holding the server's `privkey:<hex>` machine key
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// JSON file holding the DERP relay map
    #[serde(default)]
    pub derp_map_path: Option<String>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            base_domain: String::new(),
            logtail: false,
            random_client_port: false,
            strip_email_domain: true,
            transport: TransportMode::Noise,
            private_key_path: None,
            derp_map_path: None,
        }
    }
}

impl MapperConfig {
    /// Validate mapper configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.base_domain.starts_with('.') || self.base_domain.ends_with('.') {
            errors.push(format!(
                "Base domain must not start or end with a dot: '{}'",
                self.base_domain
            ));
        }

        if self.transport == TransportMode::Legacy && self.private_key_path.is_none() {
            errors.push(constants::ERR_LEGACY_WITHOUT_KEY.to_string());
        }

        errors
    }

    /// Read the server private key, if one is configured
    pub fn load_private_key(&self) -> Result<Option<MachinePrivate>> {
        let Some(path) = &self.private_key_path else {
            return Ok(None);
        };

        let text = std::fs::read_to_string(path).map_err(|e| {
            MapperError::ConfigError(format!("Failed to read private key {path}: {e}"))
        })?;

        text.parse().map(Some)
    }

    /// Read the DERP map, if one is configured
    pub fn load_derp_map(&self) -> Result<Option<DerpMap>> {
        let Some(path) = &self.derp_map_path else {
            return Ok(None);
        };

        let text = std::fs::read_to_string(path).map_err(|e| {
            MapperError::ConfigError(format!("Failed to read DERP map {path}: {e}"))
        })?;

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| MapperError::ConfigError(format!("Failed to parse DERP map: {e}")))
    }
}

/// Compressor pool settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Idle zstd encoders kept for reuse
    pub encoder_pool_size: usize,

    /// zstd level
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            encoder_pool_size: DEFAULT_POOL_CAPACITY,
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl CompressionConfig {
    /// Validate compression configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.encoder_pool_size == 0 {
            errors.push("Encoder pool size must be greater than 0".to_string());
        } else if self.encoder_pool_size > 1024 {
            errors.push(format!(
                "Encoder pool size very high: {} (each idle encoder holds its working memory)",
                self.encoder_pool_size
            ));
        }

        if self.level < 1 || self.level > 22 {
            errors.push(format!(
                "Invalid compression level: {} (valid range: 1-22)",
                self.level
            ));
        }

        errors
    }
}

/// DNS template settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DnsSettings {
    /// Enable MagicDNS name injection
    #[serde(default)]
    pub magic_dns: bool,

    /// Global resolvers: IP addresses or DoH URLs
    #[serde(default)]
    pub nameservers: Vec<String>,

    /// Split DNS: domain to resolvers
    #[serde(default)]
    pub restricted_nameservers: BTreeMap<String, Vec<String>>,

    /// Search domains
    #[serde(default)]
    pub domains: Vec<String>,
}

impl DnsSettings {
    fn valid_nameserver(ns: &str) -> bool {
        ns.parse::<IpAddr>().is_ok() || url::Url::parse(ns).is_ok_and(|u| u.scheme() == "https")
    }

    /// Validate DNS configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let all = self
            .nameservers
            .iter()
            .chain(self.restricted_nameservers.values().flatten());

        for ns in all {
            if !Self::valid_nameserver(ns) {
                errors.push(format!(
                    "Invalid nameserver: '{ns}' (expected an IP address or https:// URL)"
                ));
            }
        }

        errors
    }

    /// Build the protocol DNS configuration template
    pub fn to_dns_config(&self) -> DnsConfig {
        let resolvers = self
            .nameservers
            .iter()
            .map(|ns| Resolver::new(ns.as_str()))
            .collect();

        let routes = self
            .restricted_nameservers
            .iter()
            .map(|(domain, servers)| {
                let resolvers = servers.iter().map(|ns| Resolver::new(ns.as_str())).collect();
                (domain.clone(), Some(resolvers))
            })
            .collect();

        DnsConfig {
            resolvers,
            routes,
            domains: self.domains.clone(),
            proxied: self.magic_dns,
            ..Default::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("mesh-mapper"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_dns_template_from_settings() {
        let settings = DnsSettings {
            magic_dns: true,
            nameservers: vec!["1.1.1.1".to_string()],
            restricted_nameservers: BTreeMap::from([(
                "corp.internal".to_string(),
                vec!["10.0.0.53".to_string()],
            )]),
            domains: vec!["corp.internal".to_string()],
        };

        let dns = settings.to_dns_config();
        assert!(dns.proxied);
        assert_eq!(dns.resolvers, vec![Resolver::new("1.1.1.1")]);
        assert_eq!(
            dns.routes.get("corp.internal").unwrap().as_deref(),
            Some([Resolver::new("10.0.0.53")].as_slice())
        );
        assert_eq!(dns.domains, vec!["corp.internal".to_string()]);
    }

    #[test]
    fn test_example_config_roundtrips() {
        let text = Config::example_config();
        let parsed = Config::from_toml(&text);
        assert!(parsed.is_ok(), "example config should parse: {text}");
    }
}
