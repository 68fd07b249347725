//! # Transport Encodings
//!
//! How a serialized (and possibly compressed) map response is protected before
//! it is framed.
//!
//! ## Encodings
//! - **Legacy**: sealed to the client's machine key with the server's
//!   long-term key
//! - **Noise**: passed through; the tunnel already authenticates and encrypts
//!
//! The encoding is chosen once when a [`crate::mapper::Mapper`] is built and
//! never changes for that instance.

pub mod legacy;
pub mod noise;

use crate::config::TransportMode;
use crate::error::{constants, MapperError, Result};
use crate::key::MachinePrivate;
use crate::model::Machine;
use std::sync::Arc;

pub use legacy::LegacyEncoding;
pub use noise::NoiseEncoding;

/// Final protection step applied to every response payload
pub trait ResponseEncoding: Send + Sync {
    /// Protect `payload` for delivery to `machine`
    fn seal(&self, payload: Vec<u8>, machine: &Machine) -> Result<Vec<u8>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether [`ResponseEncoding::seal`] encrypts the payload
    fn encrypts(&self) -> bool {
        false
    }
}

/// Select the encoding for `mode`
///
/// # Errors
/// Returns `MapperError::ConfigError` for legacy mode without a private key
pub fn encoding_for(
    mode: TransportMode,
    private_key: Option<MachinePrivate>,
) -> Result<Arc<dyn ResponseEncoding>> {
    match mode {
        TransportMode::Legacy => {
            let key = private_key.ok_or_else(|| {
                MapperError::ConfigError(constants::ERR_LEGACY_WITHOUT_KEY.to_string())
            })?;
            Ok(Arc::new(LegacyEncoding::new(key)))
        }
        TransportMode::Noise => Ok(Arc::new(NoiseEncoding)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_encoding_selection() {
        let noise = encoding_for(TransportMode::Noise, None).unwrap();
        assert_eq!(noise.name(), "noise");
        assert!(!noise.encrypts());

        let legacy = encoding_for(TransportMode::Legacy, Some(MachinePrivate::generate())).unwrap();
        assert_eq!(legacy.name(), "legacy");
        assert!(legacy.encrypts());
    }

    #[test]
    fn test_legacy_requires_key() {
        let result = encoding_for(TransportMode::Legacy, None);
        assert!(matches!(result, Err(MapperError::ConfigError(_))));
    }
}
