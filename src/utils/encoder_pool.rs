//! # Encoder Pool
//!
//! Bounded pool of reusable zstd compressors.
//!
//! Creating a compressor allocates its full working context, which costs more
//! than compressing a typical map response. Every compression step acquires a
//! compressor for the duration of one call and hands it back when the guard is
//! dropped, on success and error paths alike.
//!
//! ## Guarantees
//! - The pool only ever holds `zstd::bulk::Compressor`s; there is no way to get
//!   back a value of the wrong type
//! - A guard borrows the pool, so an encoder cannot outlive the call that
//!   acquired it
//! - At most `capacity` idle encoders are retained; extra ones are dropped
//!
//! ## Usage
//! ```rust,no_run
//! use mesh_mapper::utils::encoder_pool::EncoderPool;
//!
//! let pool = EncoderPool::new(4, 1);
//! let mut encoder = pool.acquire()?;
//! let compressed = encoder.compress(b"{\"KeepAlive\":true}")?;
//! # Ok::<(), mesh_mapper::error::MapperError>(())
//! ```

use crate::error::{MapperError, Result};
use std::sync::Mutex;
use tracing::debug;
use zstd::bulk::Compressor;

/// Default number of idle encoders retained
pub const DEFAULT_POOL_CAPACITY: usize = 16;

/// Fastest zstd level; map responses are latency-bound, not size-bound
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 1;

/// A compressor borrowed from an [`EncoderPool`]; returned on drop
pub struct PooledEncoder<'a> {
    encoder: Option<Compressor<'static>>,
    pool: &'a EncoderPool,
}

impl PooledEncoder<'_> {
    /// Compress `data` into a single zstd frame
    ///
    /// # Errors
    /// Returns `MapperError::CompressionFailure` if zstd rejects the input
    pub fn compress(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or(MapperError::CompressionFailure)?;

        encoder
            .compress(data)
            .map_err(|_| MapperError::CompressionFailure)
    }
}

impl Drop for PooledEncoder<'_> {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.pool.release(encoder);
        }
    }
}

/// Thread-safe pool of zstd compressors at a fixed level
pub struct EncoderPool {
    idle: Mutex<Vec<Compressor<'static>>>,
    capacity: usize,
    level: i32,
}

impl EncoderPool {
    /// Create an empty pool that retains up to `capacity` idle encoders
    pub fn new(capacity: usize, level: i32) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            level,
        }
    }

    /// Take an idle encoder, or build a new one if none is available
    ///
    /// # Errors
    /// Returns `MapperError::CompressionFailure` if a new encoder cannot be created
    pub fn acquire(&self) -> Result<PooledEncoder<'_>> {
        let reused = self.idle.lock().ok().and_then(|mut idle| idle.pop());

        let encoder = match reused {
            Some(encoder) => encoder,
            None => {
                debug!(level = self.level, "Creating zstd encoder");
                Compressor::new(self.level).map_err(|_| MapperError::CompressionFailure)?
            }
        };

        Ok(PooledEncoder {
            encoder: Some(encoder),
            pool: self,
        })
    }

    fn release(&self, encoder: Compressor<'static>) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.capacity {
                idle.push(encoder);
            }
        }
    }

    /// Number of idle encoders currently held
    pub fn available(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for EncoderPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY, DEFAULT_COMPRESSION_LEVEL)
    }
}

impl std::fmt::Debug for EncoderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderPool")
            .field("available", &self.available())
            .field("capacity", &self.capacity)
            .field("level", &self.level)
            .finish()
    }
}
