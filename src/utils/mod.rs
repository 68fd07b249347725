//! # Utility Modules
//!
//! Supporting utilities for compression, pooling, logging, and metrics.
//!
//! ## Components
//! - **Compression**: zstd with a decompression size limit
//! - **Encoder Pool**: bounded pool of reusable zstd compressors
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Thread-safe observability counters
//!
//! ## Security
//! - Decompression bomb protection (16MB limit)

pub mod compression;
pub mod encoder_pool;
pub mod logging;
pub mod metrics;

pub use encoder_pool::{EncoderPool, PooledEncoder};
