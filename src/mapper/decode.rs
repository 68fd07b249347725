//! Client-side decoding of framed map responses.
//!
//! The inverse of the server pipeline: unframe, open, decompress, parse. Used
//! by tooling and tests that need to look inside a response.

use crate::core::frame::decode_frame;
use crate::core::serialization::WireFormat;
use crate::error::Result;
use crate::key::{MachinePrivate, MachinePublic};
use crate::protocol::MapResponse;
use crate::utils::compression::{maybe_decompress, CompressionKind};

/// Decode the first frame in `frame`.
///
/// `opener` is the client's private key and the server's public key, needed
/// only for the legacy encoding. Bytes after the first frame are ignored.
///
/// # Errors
/// - `MapperError::InvalidFrame` / `MapperError::OversizedFrame` for a bad header
/// - `MapperError::DecryptionFailure` if the payload cannot be opened
/// - `MapperError::DecompressionFailure` if the payload is not valid zstd
/// - `MapperError::Serialization` if the JSON does not parse
pub fn decode_map_response(
    frame: &[u8],
    compression: Option<CompressionKind>,
    opener: Option<(&MachinePrivate, &MachinePublic)>,
) -> Result<MapResponse> {
    let (payload, _) = decode_frame(frame)?;

    let opened = match opener {
        Some((client, server)) => client.open_from(server, payload)?,
        None => payload.to_vec(),
    };

    let json = maybe_decompress(opened, compression)?;
    MapResponse::from_wire(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::encode_frame;
    use crate::error::MapperError;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_decode_plain_keep_alive() {
        let frame = encode_frame(br#"{"KeepAlive":true}"#).unwrap();
        let response = decode_map_response(&frame, None, None).unwrap();
        assert!(response.keep_alive);
        assert!(response.node.is_none());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_decode_wrong_key_fails() {
        let server = MachinePrivate::generate();
        let client = MachinePrivate::generate();
        let other = MachinePrivate::generate();

        let sealed = server
            .seal_to(&client.public(), br#"{"KeepAlive":true}"#)
            .unwrap();
        let frame = encode_frame(&sealed).unwrap();

        let result = decode_map_response(&frame, None, Some((&other, &server.public())));
        assert!(matches!(result, Err(MapperError::DecryptionFailure)));
    }
}
