use super::Mapper;
use crate::core::frame::encode_frame;
use crate::core::serialization::WireFormat;
use crate::error::Result;
use crate::key::{MachinePrivate, MachinePublic};
use crate::model::Machine;
use crate::protocol::MapResponse;
use crate::utils::compression::{maybe_compress, CompressionKind};
use serde::Serialize;
use tracing::{debug, error};

impl Mapper {
    /// Serialize, compress if negotiated, seal, and frame `response`
    pub(crate) fn marshal_map_response(
        &self,
        response: &MapResponse,
        machine: &Machine,
        compression: &str,
    ) -> Result<Vec<u8>> {
        let json = response.to_wire().map_err(|e| {
            error!(error = %e, "Cannot marshal map response");
            e
        })?;

        let kind = CompressionKind::from_negotiated(compression);
        let raw_len = json.len();
        let payload = maybe_compress(json, kind, &self.pool)?;

        if let Some(kind) = kind {
            debug!(
                algorithm = kind.name(),
                raw = raw_len,
                compressed = payload.len(),
                "Compressed map response"
            );
            self.metrics
                .compressed(raw_len as u64, payload.len() as u64);
        }

        let payload = self.encoding.seal(payload, machine)?;
        if self.encoding.encrypts() {
            self.metrics.sealed();
        }

        encode_frame(&payload)
    }
}

/// Encode a response body for handlers outside the map poll.
///
/// The value is serialized as JSON and, when `private_key` is given, sealed to
/// `machine_key`. No compression and no length header.
///
/// # Errors
/// - `MapperError::Serialization` if the value cannot be serialized
/// - `MapperError::EncryptionFailure` if sealing fails
pub fn marshal_response<T: Serialize>(
    value: &T,
    private_key: Option<&MachinePrivate>,
    machine_key: &MachinePublic,
) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(value).map_err(|e| {
        error!(error = %e, "Cannot marshal response");
        e
    })?;

    match private_key {
        Some(key) => key.seal_to(machine_key, &json),
        None => Ok(json),
    }
}
