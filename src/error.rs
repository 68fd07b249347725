//! # Error Types
//!
//! Error handling for map-response generation and framing.
//!
//! Every failure is terminal to the response build it occurred in: the caller
//! gets the error, maps it to a transport-level failure, and the client simply
//! polls again. Nothing in this crate retries.
//!
//! ## Error Categories
//! - **Collaborator Errors**: node conversion, peer fetch, ACL rule generation
//! - **Key Errors**: a client machine key that cannot be parsed
//! - **Encoding Errors**: JSON serialization, compression, sealing
//! - **Framing Errors**: malformed or oversized length-prefixed frames
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! ## Example Usage
//! ```rust
//! use mesh_mapper::error::{MapperError, Result};
//! use mesh_mapper::key::MachinePublic;
//! use tracing::error;
//!
//! fn parse(text: &str) -> Result<MachinePublic> {
//!     text.parse()
//! }
//!
//! match parse("mkey:not-hex") {
//!     Ok(_) => unreachable!(),
//!     Err(e @ MapperError::KeyParse(_)) => error!(error = %e, "rejected client key"),
//!     Err(e) => error!(error = %e, "unexpected error"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error type returned by the persistence and ACL collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Framing errors
    pub const ERR_SHORT_FRAME: &str = "Frame shorter than its length header";
    pub const ERR_TRUNCATED_FRAME: &str = "Frame payload shorter than declared length";

    /// Key errors
    pub const ERR_KEY_PREFIX: &str = "Key is missing its type prefix";
    pub const ERR_KEY_LENGTH: &str = "Key must be 32 bytes of hex";

    /// Sealed box errors
    pub const ERR_SEALED_TOO_SHORT: &str = "Sealed payload shorter than nonce";

    /// Configuration errors
    pub const ERR_LEGACY_WITHOUT_KEY: &str =
        "Legacy transport requires a server private key (mapper.private_key_path)";
}

/// MapperError is the primary error type for all mapper operations
#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Cannot convert machine to node: {0}")]
    NodeConversion(#[source] BoxError),

    #[error("Cannot fetch peers: {0}")]
    PeerFetch(#[source] BoxError),

    #[error("Cannot generate ACL filter rules: {0}")]
    AclRuleGeneration(#[source] BoxError),

    #[error("Cannot parse machine key: {0}")]
    KeyParse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Compression failed")]
    CompressionFailure,

    #[error("Decompression failed")]
    DecompressionFailure,

    #[error("Encryption failed")]
    EncryptionFailure,

    #[error("Decryption failed")]
    DecryptionFailure,

    #[error("Invalid frame: {0}")]
    InvalidFrame(&'static str),

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using MapperError
pub type Result<T> = std::result::Result<T, MapperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_keeps_source() {
        let err = MapperError::PeerFetch("database is locked".into());
        assert_eq!(err.to_string(), "Cannot fetch peers: database is locked");

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("database is locked"));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_serde_error_converts() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: MapperError = parse.unwrap_err().into();
        assert!(matches!(err, MapperError::Serialization(_)));
    }
}
