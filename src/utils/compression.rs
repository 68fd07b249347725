use crate::config::{MAX_PAYLOAD_SIZE, ZSTD_COMPRESSION};
use crate::error::{MapperError, Result};
use crate::utils::encoder_pool::EncoderPool;
use std::io::Read;

/// Compression negotiated by a client for its map responses
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressionKind {
    Zstd,
}

impl CompressionKind {
    /// Map the request's `Compress` field to a kind; unknown or empty means none
    pub fn from_negotiated(mode: &str) -> Option<Self> {
        match mode {
            ZSTD_COMPRESSION => Some(CompressionKind::Zstd),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CompressionKind::Zstd => ZSTD_COMPRESSION,
        }
    }
}

/// Maximum output size for decompression (align with MAX_PAYLOAD_SIZE to prevent DoS)
const MAX_DECOMPRESSION_SIZE: usize = MAX_PAYLOAD_SIZE;

/// Compresses data with an encoder borrowed from `pool`
///
/// # Errors
/// Returns `MapperError::CompressionFailure` if compression fails
pub fn compress(data: &[u8], kind: CompressionKind, pool: &EncoderPool) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::Zstd => pool.acquire()?.compress(data),
    }
}

/// Compress when a kind was negotiated, otherwise hand the bytes back untouched
pub fn maybe_compress(
    data: Vec<u8>,
    kind: Option<CompressionKind>,
    pool: &EncoderPool,
) -> Result<Vec<u8>> {
    match kind {
        Some(kind) => compress(&data, kind, pool),
        None => Ok(data),
    }
}

/// Decompresses data that was compressed with the specified algorithm
///
/// Enforces a maximum output size limit to prevent decompression bombs.
///
/// # Errors
/// Returns `MapperError::DecompressionFailure` if:
/// - Decompression fails
/// - Output size exceeds MAX_DECOMPRESSION_SIZE
pub fn decompress(data: &[u8], kind: CompressionKind) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::Zstd => {
            let mut out = Vec::new();
            let mut reader =
                zstd::stream::Decoder::new(data).map_err(|_| MapperError::DecompressionFailure)?;

            // Read in chunks to enforce size limit
            let mut buffer = [0u8; 8192];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => {
                        out.extend_from_slice(&buffer[..n]);
                        if out.len() > MAX_DECOMPRESSION_SIZE {
                            return Err(MapperError::DecompressionFailure);
                        }
                    }
                    Err(_) => return Err(MapperError::DecompressionFailure),
                }
            }
            Ok(out)
        }
    }
}

/// Decompress only when a kind was negotiated; otherwise return as-is.
pub fn maybe_decompress(data: Vec<u8>, kind: Option<CompressionKind>) -> Result<Vec<u8>> {
    match kind {
        Some(kind) => decompress(&data, kind),
        None => Ok(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_zstd_compression_roundtrip() {
        let pool = EncoderPool::new(1, 1);
        let original = b"Hello, World! This is a test of Zstd compression.";
        let compressed = compress(original, CompressionKind::Zstd, &pool).unwrap();
        let decompressed = decompress(&compressed, CompressionKind::Zstd).unwrap();
        assert_eq!(original.as_slice(), decompressed.as_slice());
    }

    #[test]
    fn test_negotiated_modes() {
        assert_eq!(
            CompressionKind::from_negotiated("zstd"),
            Some(CompressionKind::Zstd)
        );
        assert_eq!(CompressionKind::from_negotiated(""), None);
        assert_eq!(CompressionKind::from_negotiated("gzip"), None);
        assert_eq!(CompressionKind::Zstd.name(), "zstd");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_maybe_compress_passthrough() {
        let pool = EncoderPool::new(1, 1);
        let data = b"{\"KeepAlive\":true}".to_vec();
        let out = maybe_compress(data.clone(), None, &pool).unwrap();
        assert_eq!(out, data);
        // no encoder was touched
        assert_eq!(pool.available(), 0);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_maybe_compress_uses_pool() {
        let pool = EncoderPool::new(1, 1);
        let data = vec![7u8; 2048];
        let out = maybe_compress(data.clone(), Some(CompressionKind::Zstd), &pool).unwrap();
        assert!(out.len() < data.len());
        assert_eq!(pool.available(), 1);

        let back = maybe_decompress(out, Some(CompressionKind::Zstd)).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_malformed_compressed_data() {
        let malformed = vec![0x28, 0xB5, 0x2F, 0xFD, 0xff, 0xff, 0xff];
        let result = decompress(&malformed, CompressionKind::Zstd);
        assert!(result.is_err(), "Should reject malformed compressed data");
    }

    #[test]
    fn test_decompression_bomb_rejected() {
        let pool = EncoderPool::new(1, 1);
        let huge = vec![0u8; MAX_DECOMPRESSION_SIZE + 1];
        let compressed = pool
            .acquire()
            .and_then(|mut encoder| encoder.compress(&huge))
            .unwrap_or_default();
        assert!(!compressed.is_empty());

        let result = decompress(&compressed, CompressionKind::Zstd);
        assert!(matches!(result, Err(MapperError::DecompressionFailure)));
    }
}
