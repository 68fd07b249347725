use crate::config::{MAX_PAYLOAD_SIZE, RESPONSE_HEADER_SIZE};
use crate::error::{constants, MapperError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Prefix `payload` with its little-endian `u32` length
///
/// # Errors
/// Returns `MapperError::OversizedFrame` if the payload does not fit a `u32` length
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let len =
        u32::try_from(payload.len()).map_err(|_| MapperError::OversizedFrame(payload.len()))?;

    let mut data = Vec::with_capacity(RESPONSE_HEADER_SIZE + payload.len());
    data.extend_from_slice(&len.to_le_bytes());
    data.extend_from_slice(payload);
    Ok(data)
}

/// Split one frame off the front of `data`, returning `(payload, rest)`
///
/// # Errors
/// - `MapperError::InvalidFrame` if the header or payload is truncated
/// - `MapperError::OversizedFrame` if the declared length exceeds MAX_PAYLOAD_SIZE
pub fn decode_frame(data: &[u8]) -> Result<(&[u8], &[u8])> {
    if data.len() < RESPONSE_HEADER_SIZE {
        return Err(MapperError::InvalidFrame(constants::ERR_SHORT_FRAME));
    }

    let (header, body) = data.split_at(RESPONSE_HEADER_SIZE);
    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;

    if len > MAX_PAYLOAD_SIZE {
        return Err(MapperError::OversizedFrame(len));
    }

    if body.len() < len {
        return Err(MapperError::InvalidFrame(constants::ERR_TRUNCATED_FRAME));
    }

    Ok(body.split_at(len))
}

/// Stream codec for length-prefixed map responses
#[derive(Debug, Clone, Copy)]
pub struct MapFrameCodec {
    max_payload: usize,
}

impl MapFrameCodec {
    pub fn new() -> Self {
        Self {
            max_payload: MAX_PAYLOAD_SIZE,
        }
    }

    /// Codec that rejects frames above `max_payload` bytes
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl Default for MapFrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MapFrameCodec {
    type Item = BytesMut;
    type Error = MapperError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < RESPONSE_HEADER_SIZE {
            return Ok(None);
        }

        let len = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if len > self.max_payload {
            return Err(MapperError::OversizedFrame(len));
        }

        if src.len() < RESPONSE_HEADER_SIZE + len {
            src.reserve(RESPONSE_HEADER_SIZE + len - src.len());
            return Ok(None);
        }

        src.advance(RESPONSE_HEADER_SIZE);
        Ok(Some(src.split_to(len)))
    }
}

impl Encoder<Bytes> for MapFrameCodec {
    type Error = MapperError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<()> {
        let len =
            u32::try_from(payload.len()).map_err(|_| MapperError::OversizedFrame(payload.len()))?;

        dst.reserve(RESPONSE_HEADER_SIZE + payload.len());
        dst.put_u32_le(len);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}
